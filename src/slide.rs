use crate::constants::{A_NAMESPACE, P_NAMESPACE, RELS_NAMESPACE};
use crate::types::{Geometry, Shape, TextFrame, TextShape, LINE_BREAK};
use std::fmt::Write as _;

/// A slide as a list of shapes plus the layout it is based on.
///
/// Template slides are read from the package with their original shape kinds; output slides
/// built by [`crate::Deck`] only ever contain text boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slide {
    pub layout_path: Option<String>,
    pub shapes: Vec<Shape>,
}

impl Slide {
    pub fn new(layout_path: Option<String>, shapes: Vec<Shape>) -> Self {
        Self { layout_path, shapes }
    }

    /// Text-bearing shapes in shape order.
    pub fn text_shapes(&self) -> Vec<&TextShape> {
        self.shapes.iter().filter_map(Shape::as_text).collect()
    }

    pub fn text_shapes_mut(&mut self) -> Vec<&mut TextShape> {
        self.shapes.iter_mut().filter_map(Shape::as_text_mut).collect()
    }

    /// Appends a text box at the given position.
    pub fn add_text_box(&mut self, geometry: Geometry, frame: TextFrame) {
        let number = self.shapes.len() + 1;
        self.shapes.push(Shape::TextBox(TextShape {
            name: format!("TextBox {}", number),
            geometry: Some(geometry),
            placeholder: None,
            frame,
        }));
    }

    /// Visible text of every text-bearing shape, in shape order.
    pub fn texts(&self) -> Vec<String> {
        self.text_shapes().iter().map(|shape| shape.frame.text()).collect()
    }

    /// Serializes the slide into a `<p:sld>` part. Only text boxes are written.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        let _ = write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            A_NAMESPACE, RELS_NAMESPACE, P_NAMESPACE
        );
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

        // id 1 belongs to the shape tree itself
        for (shape_id, shape) in (2u32..).zip(self.text_shapes()) {
            write_text_box(&mut xml, shape_id, shape);
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }
}

fn write_text_box(xml: &mut String, shape_id: u32, shape: &TextShape) {
    let geometry = shape.geometry.unwrap_or_default();

    xml.push_str("<p:sp><p:nvSpPr>");
    let _ = write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, shape_id, escape_xml(&shape.name));
    xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);

    xml.push_str("<p:spPr><a:xfrm>");
    let _ = write!(xml, r#"<a:off x="{}" y="{}"/>"#, geometry.left, geometry.top);
    let _ = write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, geometry.width, geometry.height);
    xml.push_str(r#"</a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);

    xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>"#);
    if shape.frame.paragraphs().is_empty() {
        // a text body needs at least one paragraph
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    for paragraph in shape.frame.paragraphs() {
        write_paragraph(xml, paragraph);
    }
    xml.push_str("</p:txBody></p:sp>");
}

/// Writes one `<a:p>`; line feeds and vertical tabs inside the text become `<a:br>`.
fn write_paragraph(xml: &mut String, text: &str) {
    xml.push_str("<a:p>");
    for (i, line) in text.split(['\n', LINE_BREAK]).enumerate() {
        if i > 0 {
            xml.push_str(r#"<a:br><a:rPr lang="en-US" dirty="0"/></a:br>"#);
        }
        if !line.is_empty() {
            let _ = write!(xml, r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#, escape_xml(line));
        }
    }
    xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
}

/// Escapes XML special characters and drops characters XML 1.0 cannot represent.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if c < ' ' || c == '\u{fffe}' || c == '\u{ffff}' => {},
            c => escaped.push(c),
        }
    }
    escaped
}
