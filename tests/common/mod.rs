//! Shared test infrastructure: builds small template decks on disk.
//!
//! Every template has one slide master with a title and a body placeholder, a `title` layout
//! (slideLayout1) whose subtitle inherits its position from the master, and a `blank` layout
//! (slideLayout2). Slide 1 carries a notes slide so tests can check that it is dropped.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::io::{Cursor, Read, Write};
use std::path::PathBuf;

use pptx_deck_renderer::{Geometry, TemplatePackage};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

// ============================================================================
// TEMPLATE GEOMETRY
// ============================================================================

pub const LAYOUT_TITLE: Geometry = Geometry { left: 1524000, top: 1122363, width: 9144000, height: 2387600 };
pub const MASTER_TITLE: Geometry = Geometry { left: 838200, top: 365125, width: 10515600, height: 1325563 };
pub const MASTER_BODY: Geometry = Geometry { left: 838200, top: 1825625, width: 10515600, height: 4351338 };

pub const TITLE_BOX: Geometry = Geometry { left: 457200, top: 274638, width: 8229600, height: 1143000 };
pub const BODY_BOX: Geometry = Geometry { left: 457200, top: 1600200, width: 8229600, height: 4525963 };

const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// ============================================================================
// TEMPLATE DESCRIPTION
// ============================================================================

/// A shape on a template slide.
pub enum TemplateShape {
    TextBox { name: &'static str, geometry: Geometry, paragraphs: Vec<&'static str> },
    Placeholder { kind: &'static str, idx: Option<u32>, paragraphs: Vec<&'static str> },
    Picture,
}

pub fn text_box(name: &'static str, geometry: Geometry, paragraphs: &[&'static str]) -> TemplateShape {
    TemplateShape::TextBox { name, geometry, paragraphs: paragraphs.to_vec() }
}

pub fn placeholder(kind: &'static str, idx: Option<u32>, paragraphs: &[&'static str]) -> TemplateShape {
    TemplateShape::Placeholder { kind, idx, paragraphs: paragraphs.to_vec() }
}

/// A template written to a temporary directory. The directory lives as long as this value.
pub struct Template {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Template {
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

pub fn standard_slides() -> Vec<Vec<TemplateShape>> {
    vec![
        vec![text_box("Hero Title", TITLE_BOX, &["Template hero"]), text_box("Hero Subtitle", BODY_BOX, &["Template subtitle"])],
        vec![text_box("Title", TITLE_BOX, &["Template title"]), TemplateShape::Picture, text_box("Body", BODY_BOX, &["Template body"])],
        vec![placeholder("ctrTitle", None, &["Placeholder title"]), placeholder("subTitle", Some(1), &["Placeholder subtitle"])],
    ]
}

/// Three slides: a hero slide (title + subtitle), a title slide with a picture, and a
/// placeholder slide whose shapes inherit their positions.
pub fn standard_template() -> Template {
    write_template(&standard_slides())
}

// ============================================================================
// PACKAGE WRITING
// ============================================================================

/// Writes a template with one slide per entry of `slides`.
pub fn write_template(slides: &[Vec<TemplateShape>]) -> Template {
    write_template_with(slides, |_| {})
}

/// Writes a template after letting `edit` remove or replace parts, e.g. to break the package.
pub fn write_template_with<F>(slides: &[Vec<TemplateShape>], edit: F) -> Template
where
    F: FnOnce(&mut Vec<(String, String)>),
{
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("template.pptx");

    let mut parts = template_parts(slides);
    edit(&mut parts);
    std::fs::write(&path, zip_parts(parts)).expect("Failed to write template");

    Template { dir, path }
}

fn template_parts(slides: &[Vec<TemplateShape>]) -> Vec<(String, String)> {
    let mut parts: Vec<(String, String)> = Vec::new();

    parts.push(("[Content_Types].xml".into(), content_types(slides.len())));
    parts.push((
        "_rels/.rels".into(),
        rels(&[
            ("rId1", "officeDocument", "ppt/presentation.xml"),
            ("rId2", "metadata/core-properties", "docProps/core.xml"),
            ("rId3", "extended-properties", "docProps/app.xml"),
        ]),
    ));
    parts.push(("ppt/presentation.xml".into(), presentation(slides.len())));

    let mut presentation_rels = vec![("rId1".to_string(), "slideMaster", "slideMasters/slideMaster1.xml".to_string())];
    for n in 1..=slides.len() {
        presentation_rels.push((format!("rId{}", n + 1), "slide", format!("slides/slide{}.xml", n)));
    }
    let presentation_rels: Vec<(&str, &str, &str)> =
        presentation_rels.iter().map(|(id, kind, target)| (id.as_str(), *kind, target.as_str())).collect();
    parts.push(("ppt/_rels/presentation.xml.rels".into(), rels(&presentation_rels)));

    parts.push(("ppt/slideMasters/slideMaster1.xml".into(), master()));
    parts.push((
        "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
        rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"), ("rId2", "slideLayout", "../slideLayouts/slideLayout2.xml")]),
    ));
    parts.push(("ppt/slideLayouts/slideLayout1.xml".into(), title_layout()));
    parts.push(("ppt/slideLayouts/slideLayout2.xml".into(), blank_layout()));
    for n in 1..=2 {
        parts.push((
            format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ));
    }

    for (i, shapes) in slides.iter().enumerate() {
        let n = i + 1;
        parts.push((format!("ppt/slides/slide{}.xml", n), slide(shapes)));
        let mut slide_rels = vec![("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")];
        if n == 1 {
            slide_rels.push(("rId2", "notesSlide", "../notesSlides/notesSlide1.xml"));
        }
        parts.push((format!("ppt/slides/_rels/slide{}.xml.rels", n), rels(&slide_rels)));
    }
    if !slides.is_empty() {
        parts.push(("ppt/notesSlides/notesSlide1.xml".into(), notes()));
    }

    parts.push(("docProps/core.xml".into(), core()));
    parts.push(("docProps/app.xml".into(), app(slides.len())));
    parts
}

fn zip_parts(parts: Vec<(String, String)>) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, xml) in parts {
        writer.start_file(name, options).expect("start zip entry");
        writer.write_all(xml.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

fn content_types(slide_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    );
    for n in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        );
    }
    if slide_count > 0 {
        xml.push_str(r#"<Override PartName="/ppt/notesSlides/notesSlide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"/>"#);
    }
    xml.push_str("</Types>");
    xml
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in entries {
        let rel_type = if kind.starts_with("metadata/") {
            format!("http://schemas.openxmlformats.org/package/2006/relationships/{}", kind)
        } else {
            format!("{}/{}", REL_TYPE, kind)
        };
        let _ = write!(xml, r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#, id, rel_type, target);
    }
    xml.push_str("</Relationships>");
    xml
}

fn presentation(slide_count: usize) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
        A_NS, R_NS, P_NS
    );
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for n in 1..=slide_count {
            let _ = write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1);
        }
        xml.push_str("</p:sldIdLst>");
    }
    xml.push_str(r#"<p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#);
    xml
}

fn shape_tree(body: &str) -> String {
    format!(
        r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld>"#,
        body
    )
}

fn xfrm(geometry: Geometry) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        geometry.left, geometry.top, geometry.width, geometry.height
    )
}

fn ph_shape(id: u32, name: &str, ph: &str, geometry: Option<Geometry>, paragraphs: &[&str]) -> String {
    let sp_pr = geometry.map(xfrm).unwrap_or_default();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr/><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
        id,
        name,
        ph,
        sp_pr,
        text_paragraphs(paragraphs)
    )
}

fn text_paragraphs(paragraphs: &[&str]) -> String {
    paragraphs
        .iter()
        .map(|text| format!(r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p>"#, text))
        .collect()
}

fn master() -> String {
    let body = [
        ph_shape(2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, Some(MASTER_TITLE), &["Click to edit Master title style"]),
        ph_shape(3, "Text Placeholder 2", r#"<p:ph type="body" idx="1"/>"#, Some(MASTER_BODY), &["Click to edit Master text styles"]),
    ]
    .concat();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">{}<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst></p:sldMaster>"#,
        A_NS,
        R_NS,
        P_NS,
        shape_tree(&body)
    )
}

fn title_layout() -> String {
    let body = [
        ph_shape(2, "Title 1", r#"<p:ph type="ctrTitle"/>"#, Some(LAYOUT_TITLE), &["Click to edit Master title style"]),
        ph_shape(3, "Subtitle 2", r#"<p:ph type="subTitle" idx="1"/>"#, None, &["Click to edit Master subtitle style"]),
    ]
    .concat();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="title" preserve="1">{}</p:sldLayout>"#,
        A_NS,
        R_NS,
        P_NS,
        shape_tree(&body)
    )
}

fn blank_layout() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1">{}</p:sldLayout>"#,
        A_NS,
        R_NS,
        P_NS,
        shape_tree("")
    )
}

fn slide(shapes: &[TemplateShape]) -> String {
    let mut body = String::new();
    for (shape_id, shape) in (2u32..).zip(shapes) {
        match shape {
            TemplateShape::TextBox { name, geometry, paragraphs } => {
                let _ = write!(
                    body,
                    r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
                    shape_id,
                    name,
                    xfrm(*geometry),
                    text_paragraphs(paragraphs)
                );
            },
            TemplateShape::Placeholder { kind, idx, paragraphs } => {
                let ph = match idx {
                    Some(idx) => format!(r#"<p:ph type="{}" idx="{}"/>"#, kind, idx),
                    None => format!(r#"<p:ph type="{}"/>"#, kind),
                };
                body.push_str(&ph_shape(shape_id, kind, &ph, None, paragraphs));
            },
            TemplateShape::Picture => {
                let _ = write!(
                    body,
                    r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/></p:blipFill><p:spPr>{}</p:spPr></p:pic>"#,
                    shape_id,
                    xfrm(BODY_BOX)
                );
            },
        }
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">{}</p:sld>"#,
        A_NS,
        R_NS,
        P_NS,
        shape_tree(&body)
    )
}

fn notes() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">{}</p:notes>"#,
        A_NS,
        R_NS,
        P_NS,
        shape_tree("")
    )
}

fn core() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Template</dc:title><dc:creator>Tests</dc:creator></cp:coreProperties>"#
        .to_string()
}

fn app(slide_count: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>Microsoft Office PowerPoint</Application><Slides>{}</Slides><Notes>1</Notes></Properties>"#,
        slide_count
    )
}

// ============================================================================
// OUTPUT INSPECTION
// ============================================================================

pub fn open_output(bytes: &[u8]) -> TemplatePackage {
    TemplatePackage::from_reader(Cursor::new(bytes.to_vec())).expect("rendered package should reopen")
}

pub fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("rendered output is a zip");
    archive.file_names().map(str::to_string).collect()
}

pub fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("rendered output is a zip");
    let mut file = archive.by_name(name).expect("part should exist");
    let mut content = String::new();
    file.read_to_string(&mut content).expect("part should be UTF-8");
    content
}
