/// Position and size of a shape in EMU, as stored in `<a:xfrm>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// Identifies a placeholder through its `<p:ph>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderRef {
    pub kind: Option<String>,
    pub idx: Option<u32>,
}

impl PlaceholderRef {
    /// The placeholder type with PowerPoint's implicit defaults applied.
    ///
    /// A `<p:ph>` without a `type` attribute is a body placeholder, and centered titles and
    /// subtitles inherit from the master's title and body placeholders respectively.
    pub fn master_kind(&self) -> &str {
        match self.kind.as_deref() {
            None | Some("body") | Some("subTitle") | Some("obj") => "body",
            Some("ctrTitle") | Some("title") => "title",
            Some(other) => other,
        }
    }
}

/// Ordered paragraphs of a text frame.
///
/// A line break inside a paragraph (`<a:br>`) is kept as a vertical tab, so `text()` can join
/// paragraphs with line feeds without losing the distinction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFrame {
    paragraphs: Vec<String>,
}

pub const LINE_BREAK: char = '\u{b}';

impl TextFrame {
    pub fn new(paragraphs: Vec<String>) -> Self {
        Self { paragraphs }
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Full visible text, paragraphs joined by `\n`.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    pub fn clear(&mut self) {
        self.paragraphs.clear();
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        self.paragraphs.push(text.into());
    }

    /// Replaces the frame content with a single paragraph.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.clear();
        self.add_paragraph(text);
    }

    /// Replaces the frame content with one paragraph per line.
    pub fn set_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clear();
        for line in lines {
            self.add_paragraph(line);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextShape {
    pub name: String,
    /// `None` when the shape inherits its position from a layout placeholder.
    pub geometry: Option<Geometry>,
    pub placeholder: Option<PlaceholderRef>,
    pub frame: TextFrame,
}

/// A child of a slide's shape tree.
///
/// Only [`Shape::TextBox`] takes part in cloning and content substitution; every other kind is
/// recorded so callers can see what was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    TextBox(TextShape),
    Picture,
    Table,
    Chart,
    Group,
    Connector,
    Other,
}

impl Shape {
    pub fn as_text(&self) -> Option<&TextShape> {
        match self {
            Shape::TextBox(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextShape> {
        match self {
            Shape::TextBox(text) => Some(text),
            _ => None,
        }
    }
}

/// An entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}
