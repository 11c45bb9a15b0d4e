use crate::constants::{
    APP_PROPS_PART, CONTENT_TYPES_PART, CORE_PROPS_PART, DEFAULT_PRESENTATION_PART, OFFICE_DOCUMENT_REL, P_NAMESPACE,
    RELS_NAMESPACE, ROOT_RELS_PART, SLIDE_LAYOUT_REL, SLIDE_MASTER_REL, SLIDE_REL,
};
use crate::parse_rels::{parse_rels, rels_path_for, resolve_target};
use crate::parse_xml::{parse_layout_type, parse_shape_tree};
use crate::types::{Geometry, PlaceholderRef, Relationship, Shape, TextShape};
use crate::{Error, Result, Slide};
use roxmltree::Document;
use std::{
    collections::HashMap,
    io::{Read, Seek},
    path::Path,
};

/// Holds the in-memory representation of a template PowerPoint (pptx) package.
///
/// `TemplatePackage` reads every part of the archive once and parses all slides up front, so
/// that any number of clone operations within a request can share the same read-only data.
/// Placeholder shapes that inherit their position are resolved against their slide layout and
/// slide master while loading.
#[derive(Debug)]
pub struct TemplatePackage {
    parts: Vec<(String, Vec<u8>)>,
    index: HashMap<String, usize>,
    presentation_path: String,
    slide_paths: Vec<String>,
    slides: Vec<Slide>,
    blank_layout_path: String,
}

impl TemplatePackage {
    /// Opens a PowerPoint pptx file and loads it into a `TemplatePackage`.
    ///
    /// # Errors
    ///
    /// Errors are returned on file access problems, failures while unzipping, malformed XML in
    /// the presentation, slide, layout or master parts, or when the package has no slide layout.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Loads a template package from any seekable source, e.g. an in-memory buffer.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            parts.push((name, content));
        }

        let index = parts
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        let mut package = Self {
            parts,
            index,
            presentation_path: String::new(),
            slide_paths: Vec::new(),
            slides: Vec::new(),
            blank_layout_path: String::new(),
        };

        package.check_package_parts()?;
        package.presentation_path = package.find_presentation_path()?;
        package.slide_paths = package.find_slide_paths()?;
        package.blank_layout_path = package.find_blank_layout()?;
        package.slides = package.load_slides()?;

        Ok(package)
    }

    pub fn presentation_path(&self) -> &str {
        &self.presentation_path
    }

    /// Slide part names in presentation order.
    pub fn slide_paths(&self) -> &[String] {
        &self.slide_paths
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// The layout new slides are based on.
    pub fn blank_layout_path(&self) -> &str {
        &self.blank_layout_path
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.index.get(name).map(|&i| self.parts[i].1.as_slice())
    }

    /// Reads a part that must exist in the package.
    pub fn require_part(&self, name: &str) -> Result<&[u8]> {
        self.part(name).ok_or_else(|| Error::PartNotFound(name.to_string()))
    }

    /// All parts in archive order.
    pub fn parts(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.parts.iter().map(|(name, data)| (name.as_str(), data.as_slice()))
    }

    /// Relationships of a part, or an empty list when it has no `.rels` part.
    pub fn relationships(&self, part_path: &str) -> Result<Vec<Relationship>> {
        match self.part(&rels_path_for(part_path)) {
            Some(data) => parse_rels(data),
            None => Ok(Vec::new()),
        }
    }

    /// Resolved part name of the first relationship of the given type.
    fn related_part(&self, part_path: &str, rel_type: &str) -> Result<Option<String>> {
        Ok(self
            .relationships(part_path)?
            .into_iter()
            .find(|rel| rel.rel_type == rel_type && !rel.external)
            .map(|rel| resolve_target(part_path, &rel.target)))
    }

    /// The content types and document properties are rewritten on output, so they must parse.
    fn check_package_parts(&self) -> Result<()> {
        Document::parse(std::str::from_utf8(self.require_part(CONTENT_TYPES_PART)?)?)?;

        for name in [CORE_PROPS_PART, APP_PROPS_PART] {
            if let Some(data) = self.part(name) {
                Document::parse(std::str::from_utf8(data)?)?;
            }
        }

        Ok(())
    }

    fn find_presentation_path(&self) -> Result<String> {
        let root_rels = match self.part(ROOT_RELS_PART) {
            Some(data) => parse_rels(data)?,
            None => Vec::new(),
        };

        let path = root_rels
            .iter()
            .find(|rel| rel.rel_type == OFFICE_DOCUMENT_REL)
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_PRESENTATION_PART.to_string());

        self.require_part(&path)?;
        Ok(path)
    }

    /// Orders slides by `<p:sldIdLst>`, falling back to the slide file numbers when the
    /// presentation part lists none.
    fn find_slide_paths(&self) -> Result<Vec<String>> {
        let xml_str = std::str::from_utf8(self.require_part(&self.presentation_path)?)?;
        let doc = Document::parse(xml_str)?;
        let rels = self.relationships(&self.presentation_path)?;

        let slide_ids = doc
            .root_element()
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "sldIdLst" && n.tag_name().namespace() == Some(P_NAMESPACE));

        let mut slide_paths = Vec::new();
        if let Some(slide_ids) = slide_ids {
            for sld_id in slide_ids.children().filter(|n| n.is_element() && n.tag_name().name() == "sldId") {
                let Some(r_id) = sld_id.attribute((RELS_NAMESPACE, "id")) else {
                    continue;
                };
                let target = rels
                    .iter()
                    .find(|rel| rel.id == r_id && rel.rel_type == SLIDE_REL)
                    .map(|rel| resolve_target(&self.presentation_path, &rel.target));

                match target {
                    Some(path) if self.part(&path).is_some() => slide_paths.push(path),
                    _ => log::debug!("Skipping slide id {} without a slide part", r_id),
                }
            }
        }

        if slide_paths.is_empty() {
            slide_paths = self.numbered_parts("slides/", "slide");
        }

        Ok(slide_paths)
    }

    /// Picks the layout new slides are created from: the first layout declaring
    /// `type="blank"`, otherwise the first layout of the package.
    fn find_blank_layout(&self) -> Result<String> {
        let layouts = self.numbered_parts("slideLayouts/", "slideLayout");

        for layout in &layouts {
            if parse_layout_type(self.require_part(layout)?)?.as_deref() == Some("blank") {
                return Ok(layout.clone());
            }
        }

        layouts
            .into_iter()
            .next()
            .ok_or(Error::Malformed("template has no slide layouts"))
    }

    /// Part names `<ppt dir>/<dir><prefix><n>.xml`, ordered by `n`.
    fn numbered_parts(&self, dir: &str, prefix: &str) -> Vec<String> {
        let ppt_dir = self.presentation_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        let full_dir = if ppt_dir.is_empty() { dir.to_string() } else { format!("{}/{}", ppt_dir, dir) };

        let mut numbered: Vec<(u32, String)> = self
            .parts
            .iter()
            .filter_map(|(name, _)| {
                let file = name.strip_prefix(&full_dir)?;
                let number = extract_part_number(file, prefix)?;
                Some((number, name.clone()))
            })
            .collect();

        numbered.sort();
        numbered.into_iter().map(|(_, name)| name).collect()
    }

    fn load_slides(&self) -> Result<Vec<Slide>> {
        let mut cache: HashMap<String, Vec<Shape>> = HashMap::new();
        let mut slides = Vec::with_capacity(self.slide_paths.len());

        for slide_path in &self.slide_paths {
            slides.push(self.load_slide(slide_path, &mut cache)?);
        }

        Ok(slides)
    }

    /// Parses a slide and resolves the geometry of placeholders that inherit their position.
    fn load_slide(&self, slide_path: &str, cache: &mut HashMap<String, Vec<Shape>>) -> Result<Slide> {
        let mut shapes = parse_shape_tree(self.require_part(slide_path)?)?;
        let layout_path = self.related_part(slide_path, SLIDE_LAYOUT_REL)?;

        for shape in shapes.iter_mut().filter_map(Shape::as_text_mut) {
            if shape.geometry.is_some() {
                continue;
            }
            let Some(placeholder) = shape.placeholder.clone() else {
                continue;
            };
            shape.geometry = match &layout_path {
                Some(layout_path) => self.inherited_geometry(layout_path, &placeholder, cache)?,
                None => None,
            };
            if shape.geometry.is_none() {
                log::debug!("No inherited position for placeholder '{}' on {}", shape.name, slide_path);
            }
        }

        Ok(Slide::new(layout_path, shapes))
    }

    fn inherited_geometry(
        &self,
        layout_path: &str,
        placeholder: &PlaceholderRef,
        cache: &mut HashMap<String, Vec<Shape>>,
    ) -> Result<Option<Geometry>> {
        let layout_match = self
            .shape_tree(layout_path, cache)?
            .and_then(|shapes| find_layout_placeholder(shapes, placeholder))
            .map(|shape| (shape.geometry, shape.placeholder.clone()));

        if let Some((Some(geometry), _)) = layout_match {
            return Ok(Some(geometry));
        }

        let Some(master_path) = self.related_part(layout_path, SLIDE_MASTER_REL)? else {
            return Ok(None);
        };
        // the layout placeholder, when present, decides which master placeholder applies
        let key = layout_match.and_then(|(_, ph)| ph).unwrap_or_else(|| placeholder.clone());

        Ok(self
            .shape_tree(&master_path, cache)?
            .and_then(|shapes| find_master_placeholder(shapes, &key))
            .and_then(|shape| shape.geometry))
    }

    fn shape_tree<'c>(
        &self,
        part_path: &str,
        cache: &'c mut HashMap<String, Vec<Shape>>,
    ) -> Result<Option<&'c Vec<Shape>>> {
        if !cache.contains_key(part_path) {
            let Some(data) = self.part(part_path) else {
                return Ok(None);
            };
            cache.insert(part_path.to_string(), parse_shape_tree(data)?);
        }
        Ok(cache.get(part_path))
    }
}

fn placeholders(shapes: &[Shape]) -> impl Iterator<Item = (&TextShape, &PlaceholderRef)> + Clone {
    shapes
        .iter()
        .filter_map(Shape::as_text)
        .filter_map(|shape| shape.placeholder.as_ref().map(|ph| (shape, ph)))
}

/// Layout placeholders match by `idx` first, then by type.
fn find_layout_placeholder<'s>(shapes: &'s [Shape], placeholder: &PlaceholderRef) -> Option<&'s TextShape> {
    let candidates = placeholders(shapes);

    if let Some(idx) = placeholder.idx {
        if let Some((shape, _)) = candidates.clone().find(|(_, ph)| ph.idx == Some(idx)) {
            return Some(shape);
        }
    }

    candidates
        .clone()
        .find(|(_, ph)| ph.kind == placeholder.kind)
        .or_else(|| candidates.clone().find(|(_, ph)| ph.master_kind() == placeholder.master_kind()))
        .map(|(shape, _)| shape)
}

/// Master placeholders only match by type.
fn find_master_placeholder<'s>(shapes: &'s [Shape], placeholder: &PlaceholderRef) -> Option<&'s TextShape> {
    placeholders(shapes)
        .find(|(_, ph)| ph.master_kind() == placeholder.master_kind())
        .map(|(shape, _)| shape)
}

/// Extracts `n` from a file name such as `slide12.xml` for the prefix `slide`.
fn extract_part_number(file_name: &str, prefix: &str) -> Option<u32> {
    file_name
        .strip_prefix(prefix)
        .and_then(|s| s.strip_suffix(".xml"))
        .and_then(|num_str| num_str.parse::<u32>().ok())
}
