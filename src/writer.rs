use crate::constants::{
    APP_PROPS_PART, CONTENT_TYPES_NAMESPACE, CONTENT_TYPES_PART, CORE_PROPS_PART, DC_NAMESPACE, FIRST_SLIDE_ID,
    P14_NAMESPACE, PACKAGE_RELS_NAMESPACE, P_NAMESPACE, RELS_NAMESPACE, SLIDE_CONTENT_TYPE, SLIDE_LAYOUT_REL,
    SLIDE_REL,
};
use crate::container::TemplatePackage;
use crate::parse_rels::{parse_rels, relative_target, rels_path_for};
use crate::slide::escape_xml;
use crate::types::Relationship;
use crate::{Error, Result, Slide};
use roxmltree::{Document, Node};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::io::{Seek, Write};
use std::ops::Range;
use zip::write::SimpleFileOptions;

/// Writes `slides` as a complete pptx package derived from `template`.
///
/// The template's own slides, their notes and comments are left out. Everything else (masters,
/// layouts, theme, media, properties) is copied, with the presentation part, its relationships,
/// the content types and the document properties rewritten to describe the new slides.
pub fn write_package<W: Write + Seek>(
    template: &TemplatePackage,
    slides: &[Slide],
    title: Option<&str>,
    writer: W,
) -> Result<W> {
    let presentation_path = template.presentation_path();
    let presentation_rels_path = rels_path_for(presentation_path);
    let ppt_dir = presentation_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

    let in_ppt_dir = |name: String| if ppt_dir.is_empty() { name } else { format!("{}/{}", ppt_dir, name) };

    let slide_parts: Vec<String> = (1..=slides.len()).map(|n| in_ppt_dir(format!("slides/slide{}.xml", n))).collect();

    // template slides and the parts that only make sense next to them
    let dropped_dirs: Vec<String> = ["slides/", "notesSlides/", "comments/"]
        .iter()
        .map(|dir| in_ppt_dir(dir.to_string()))
        .collect();
    let is_dropped = |name: &str| dropped_dirs.iter().any(|dir| name.starts_with(dir.as_str()));

    let mut rewritten: HashMap<String, String> = HashMap::new();

    let presentation_rels = match template.part(&presentation_rels_path) {
        Some(data) => parse_rels(data)?,
        None => Vec::new(),
    };
    let (presentation_rels, slide_rel_ids) = rewrite_presentation_rels(presentation_rels, presentation_path, &slide_parts);
    rewritten.insert(presentation_rels_path.clone(), rels_xml(&presentation_rels));

    let presentation_xml = std::str::from_utf8(template.require_part(presentation_path)?)?;
    rewritten.insert(presentation_path.to_string(), rewrite_presentation(presentation_xml, &slide_rel_ids)?);

    let content_types = std::str::from_utf8(template.require_part(CONTENT_TYPES_PART)?)?;
    rewritten.insert(CONTENT_TYPES_PART.to_string(), rewrite_content_types(content_types, &is_dropped, &slide_parts)?);

    if let Some(title) = title.filter(|title| !title.is_empty()) {
        if let Some(core) = template.part(CORE_PROPS_PART) {
            rewritten.insert(CORE_PROPS_PART.to_string(), set_core_title(std::str::from_utf8(core)?, title)?);
        } else {
            log::debug!("Template has no core properties, deck title not stored");
        }
    }

    if let Some(app) = template.part(APP_PROPS_PART) {
        rewritten.insert(APP_PROPS_PART.to_string(), set_app_counts(std::str::from_utf8(app)?, slides.len())?);
    }

    let mut package = zip::ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    // [Content_Types].xml goes first
    package.start_file(CONTENT_TYPES_PART, options)?;
    package.write_all(rewritten[CONTENT_TYPES_PART].as_bytes())?;

    let mut written: HashSet<&str> = HashSet::new();
    written.insert(CONTENT_TYPES_PART);

    for (name, data) in template.parts() {
        if written.contains(name) || is_dropped(name) {
            continue;
        }
        package.start_file(name, options)?;
        match rewritten.get(name) {
            Some(xml) => package.write_all(xml.as_bytes())?,
            None => package.write_all(data)?,
        }
        written.insert(name);
    }

    // a template without presentation relationships still needs them now
    if !written.contains(presentation_rels_path.as_str()) {
        package.start_file(presentation_rels_path.as_str(), options)?;
        package.write_all(rewritten[&presentation_rels_path].as_bytes())?;
    }

    for (slide, part_name) in slides.iter().zip(&slide_parts) {
        package.start_file(part_name.as_str(), options)?;
        package.write_all(slide.to_xml().as_bytes())?;

        let layout_path = slide.layout_path.as_deref().unwrap_or(template.blank_layout_path());
        let slide_rels = vec![Relationship {
            id: "rId1".to_string(),
            rel_type: SLIDE_LAYOUT_REL.to_string(),
            target: relative_target(part_name, layout_path),
            external: false,
        }];
        package.start_file(rels_path_for(part_name), options)?;
        package.write_all(rels_xml(&slide_rels).as_bytes())?;
    }

    log::debug!("Wrote package with {} slides", slides.len());
    Ok(package.finish()?)
}

/// Drops the template's slide relationships and adds one per new slide.
///
/// Returns the new relationship list and the ids of the slide relationships in slide order.
fn rewrite_presentation_rels(
    rels: Vec<Relationship>,
    presentation_path: &str,
    slide_parts: &[String],
) -> (Vec<Relationship>, Vec<String>) {
    let mut kept: Vec<Relationship> = rels.into_iter().filter(|rel| rel.rel_type != SLIDE_REL).collect();
    let taken: HashSet<String> = kept.iter().map(|rel| rel.id.clone()).collect();

    let mut next = kept
        .iter()
        .filter_map(|rel| rel.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
        .max()
        .unwrap_or(0)
        + 1;

    let mut slide_ids = Vec::with_capacity(slide_parts.len());
    for part in slide_parts {
        let mut id = format!("rId{}", next);
        while taken.contains(&id) {
            next += 1;
            id = format!("rId{}", next);
        }
        next += 1;

        kept.push(Relationship {
            id: id.clone(),
            rel_type: SLIDE_REL.to_string(),
            target: relative_target(presentation_path, part),
            external: false,
        });
        slide_ids.push(id);
    }

    (kept, slide_ids)
}

fn rels_xml(rels: &[Relationship]) -> String {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(xml, r#"<Relationships xmlns="{}">"#, PACKAGE_RELS_NAMESPACE);
    for rel in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}""#,
            escape_xml(&rel.id),
            escape_xml(&rel.rel_type),
            escape_xml(&rel.target)
        );
        if rel.external {
            xml.push_str(r#" TargetMode="External""#);
        }
        xml.push_str("/>");
    }
    xml.push_str("</Relationships>");
    xml
}

/// Replaces the slide list of the presentation part and removes custom shows and slide
/// sections, which would point at slides that no longer exist.
fn rewrite_presentation(source: &str, slide_rel_ids: &[String]) -> Result<String> {
    let doc = Document::parse(source)?;
    let root = doc.root_element();

    let mut slide_list = String::new();
    if !slide_rel_ids.is_empty() {
        let _ = write!(slide_list, r#"<p:sldIdLst xmlns:p="{}" xmlns:r="{}">"#, P_NAMESPACE, RELS_NAMESPACE);
        for (slide_id, rel_id) in (FIRST_SLIDE_ID..).zip(slide_rel_ids) {
            let _ = write!(slide_list, r#"<p:sldId id="{}" r:id="{}"/>"#, slide_id, rel_id);
        }
        slide_list.push_str("</p:sldIdLst>");
    }

    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    if let Some(existing) = p_child(&root, "sldIdLst") {
        edits.push((existing.range(), slide_list));
    } else {
        let position = ["sldSz", "notesSz"]
            .iter()
            .find_map(|name| p_child(&root, name).map(|n| n.range().start))
            .or_else(|| {
                ["handoutMasterIdLst", "notesMasterIdLst", "sldMasterIdLst"]
                    .iter()
                    .find_map(|name| p_child(&root, name).map(|n| n.range().end))
            })
            .ok_or(Error::Malformed("presentation part has no slide size or master list"))?;
        edits.push((position..position, slide_list));
    }

    if let Some(custom_shows) = p_child(&root, "custShowLst") {
        edits.push((custom_shows.range(), String::new()));
    }

    if let Some(ext_list) = p_child(&root, "extLst") {
        for ext in ext_list.children().filter(|n| n.is_element()) {
            let has_sections = ext
                .children()
                .any(|n| n.is_element() && n.tag_name().name() == "sectionLst" && n.tag_name().namespace() == Some(P14_NAMESPACE));
            if has_sections {
                edits.push((ext.range(), String::new()));
            }
        }
    }

    Ok(splice(source, edits))
}

fn rewrite_content_types(source: &str, is_dropped: &dyn Fn(&str) -> bool, slide_parts: &[String]) -> Result<String> {
    let doc = Document::parse(source)?;
    let root = doc.root_element();

    let mut xml = String::with_capacity(source.len() + slide_parts.len() * 128);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(xml, r#"<Types xmlns="{}">"#, CONTENT_TYPES_NAMESPACE);

    for node in root.children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "Default" => {
                let (Some(extension), Some(content_type)) = (node.attribute("Extension"), node.attribute("ContentType"))
                else {
                    continue;
                };
                let _ = write!(
                    xml,
                    r#"<Default Extension="{}" ContentType="{}"/>"#,
                    escape_xml(extension),
                    escape_xml(content_type)
                );
            },
            "Override" => {
                let (Some(part_name), Some(content_type)) = (node.attribute("PartName"), node.attribute("ContentType"))
                else {
                    continue;
                };
                if is_dropped(part_name.trim_start_matches('/')) {
                    continue;
                }
                let _ = write!(
                    xml,
                    r#"<Override PartName="{}" ContentType="{}"/>"#,
                    escape_xml(part_name),
                    escape_xml(content_type)
                );
            },
            _ => {},
        }
    }

    for part in slide_parts {
        let _ = write!(xml, r#"<Override PartName="/{}" ContentType="{}"/>"#, escape_xml(part), SLIDE_CONTENT_TYPE);
    }

    xml.push_str("</Types>");
    Ok(xml)
}

/// Sets `dc:title` in the core properties part.
fn set_core_title(source: &str, title: &str) -> Result<String> {
    let doc = Document::parse(source)?;
    let root = doc.root_element();

    let element = format!(r#"<dc:title xmlns:dc="{}">{}</dc:title>"#, DC_NAMESPACE, escape_xml(title));

    let existing = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "title" && n.tag_name().namespace() == Some(DC_NAMESPACE));

    let edit = match existing {
        Some(node) => (node.range(), element),
        None => match closing_tag_start(source, &root) {
            Some(position) => (position..position, element),
            None => expand_empty_element(source, &root, &element)
                .ok_or(Error::Malformed("core properties root is not an element"))?,
        },
    };

    Ok(splice(source, vec![edit]))
}

/// Updates `<Slides>` in the extended properties part and zeroes `<Notes>`, since notes slides
/// are not carried over.
fn set_app_counts(source: &str, slide_count: usize) -> Result<String> {
    let doc = Document::parse(source)?;
    let root = doc.root_element();

    let edits = root
        .children()
        .filter(|n| n.is_element())
        .filter_map(|n| match n.tag_name().name() {
            "Slides" => Some((n.range(), format!("<Slides>{}</Slides>", slide_count))),
            "Notes" => Some((n.range(), "<Notes>0</Notes>".to_string())),
            _ => None,
        })
        .collect();

    Ok(splice(source, edits))
}

fn closing_tag_start(source: &str, element: &Node) -> Option<usize> {
    let range = element.range();
    let start = source[range.clone()].rfind("</")?;
    Some(range.start + start)
}

/// Edit turning `<name .../>` into `<name ...>content</name>`.
fn expand_empty_element(source: &str, element: &Node, content: &str) -> Option<(Range<usize>, String)> {
    let range = element.range();
    let tag = &source[range.clone()];
    if !tag.ends_with("/>") {
        return None;
    }
    let name_end = tag[1..].find(|c: char| c.is_whitespace() || c == '/' || c == '>')? + 1;
    let qualified_name = &tag[1..name_end];

    Some((range.end - 2..range.end, format!(">{}</{}>", content, qualified_name)))
}

/// Applies non-overlapping replacements to `source`.
fn splice(source: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

    let mut result = source.to_string();
    for (range, replacement) in edits {
        result.replace_range(range, &replacement);
    }
    result
}

fn p_child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(P_NAMESPACE))
}
