use crate::constants::{A_NAMESPACE, CHART_URI, P_NAMESPACE, TABLE_URI};
use crate::types::{Geometry, PlaceholderRef, Shape, TextFrame, TextShape, LINE_BREAK};
use crate::{Error, Result};
use roxmltree::{Document, Node};

/// Parses the shape tree (`<p:cSld>/<p:spTree>`) of a slide, slide layout or slide master part.
///
/// Every element child of the shape tree yields exactly one [`Shape`], in document order. Only
/// `<p:sp>` elements carrying a `<p:txBody>` become [`Shape::TextBox`]; pictures, tables, charts,
/// groups and connectors are tagged by kind and carry no content.
///
/// # Errors
///
/// Parsing fails if:
/// - The provided XML data isn't valid UTF-8.
/// - The XML is malformed or has no `<p:cSld>`/`<p:spTree>`.
pub fn parse_shape_tree(xml_data: &[u8]) -> Result<Vec<Shape>> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = Document::parse(xml_str)?;
    let root = doc.root_element();

    let c_sld = p_child(&root, "cSld").ok_or(Error::Malformed("no <p:cSld> in shape part"))?;
    let sp_tree = p_child(&c_sld, "spTree").ok_or(Error::Malformed("no <p:spTree> in shape part"))?;

    let mut shapes = Vec::new();
    for child_node in sp_tree.children().filter(|n| n.is_element()) {
        let namespace = child_node.tag_name().namespace().unwrap_or("");
        if namespace != P_NAMESPACE {
            shapes.push(Shape::Other);
            continue;
        }

        match child_node.tag_name().name() {
            // properties of the tree itself, not shapes
            "nvGrpSpPr" | "grpSpPr" | "extLst" => {},
            "sp" => shapes.push(parse_sp(&child_node)),
            "pic" => shapes.push(Shape::Picture),
            "grpSp" => shapes.push(Shape::Group),
            "cxnSp" => shapes.push(Shape::Connector),
            "graphicFrame" => shapes.push(parse_graphic_frame(&child_node)),
            _ => shapes.push(Shape::Other),
        }
    }

    Ok(shapes)
}

/// Reads the `type` attribute of a `<p:sldLayout>` root element, e.g. `"blank"` or `"title"`.
pub fn parse_layout_type(xml_data: &[u8]) -> Result<Option<String>> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = Document::parse(xml_str)?;
    Ok(doc.root_element().attribute("type").map(str::to_string))
}

/// Parses a shape node (`<p:sp>`). Shapes without a text body are not text-bearing.
fn parse_sp(sp_node: &Node) -> Shape {
    let Some(tx_body_node) = p_child(sp_node, "txBody") else {
        return Shape::Other;
    };

    let nv_sp_pr = p_child(sp_node, "nvSpPr");
    let name = nv_sp_pr
        .and_then(|n| p_child(&n, "cNvPr"))
        .and_then(|n| n.attribute("name"))
        .unwrap_or_default()
        .to_string();
    let placeholder = nv_sp_pr
        .and_then(|n| p_child(&n, "nvPr"))
        .and_then(|n| p_child(&n, "ph"))
        .map(|ph| PlaceholderRef {
            kind: ph.attribute("type").map(str::to_string),
            idx: ph.attribute("idx").and_then(|idx| idx.parse::<u32>().ok()),
        });

    Shape::TextBox(TextShape {
        name,
        geometry: p_child(sp_node, "spPr").and_then(|sp_pr| parse_xfrm(&sp_pr)),
        placeholder,
        frame: parse_text_body(&tx_body_node),
    })
}

/// Classifies a `<p:graphicFrame>` by the uri of its `<a:graphicData>`.
fn parse_graphic_frame(node: &Node) -> Shape {
    let uri = node
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "graphicData" && n.tag_name().namespace() == Some(A_NAMESPACE))
        .and_then(|n| n.attribute("uri"));

    match uri {
        Some(TABLE_URI) => Shape::Table,
        Some(CHART_URI) => Shape::Chart,
        _ => Shape::Other,
    }
}

/// Reads `<a:xfrm>` offset and extent from a shape properties node (`<p:spPr>`).
///
/// Returns `None` when the shape has no transform of its own, which is the case for
/// placeholders inheriting their position from the layout.
fn parse_xfrm(sp_pr_node: &Node) -> Option<Geometry> {
    let xfrm = a_child(sp_pr_node, "xfrm")?;
    let off = a_child(&xfrm, "off")?;
    let ext = a_child(&xfrm, "ext")?;

    Some(Geometry {
        left: emu_attribute(&off, "x")?,
        top: emu_attribute(&off, "y")?,
        width: emu_attribute(&ext, "cx")?,
        height: emu_attribute(&ext, "cy")?,
    })
}

fn emu_attribute(node: &Node, name: &str) -> Option<i64> {
    node.attribute(name).and_then(|value| value.parse::<i64>().ok())
}

/// Parses the text body node (`<p:txBody>`) into one string per paragraph (`<a:p>`).
fn parse_text_body(tx_body_node: &Node) -> TextFrame {
    let paragraphs = tx_body_node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "p" && n.tag_name().namespace() == Some(A_NAMESPACE))
        .map(|p_node| parse_paragraph(&p_node))
        .collect();

    TextFrame::new(paragraphs)
}

/// Concatenates the text of all runs (`<a:r>`) and fields (`<a:fld>`) of a paragraph node.
///
/// # Notes
/// A soft line break (`<a:br>`) is kept as a vertical tab inside the paragraph.
fn parse_paragraph(p_node: &Node) -> String {
    let mut text = String::new();

    for child in p_node.children().filter(|n| n.is_element() && n.tag_name().namespace() == Some(A_NAMESPACE)) {
        match child.tag_name().name() {
            "r" | "fld" => {
                if let Some(t) = a_child(&child, "t").and_then(|t_node| t_node.text()) {
                    text.push_str(t);
                }
            },
            "br" => text.push(LINE_BREAK),
            _ => (),
        }
    }

    text
}

fn p_child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(P_NAMESPACE))
}

fn a_child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(A_NAMESPACE))
}
