use crate::container::TemplatePackage;
use crate::{writer, Result, Slide};
use std::io::{Cursor, Seek, Write};

/// The output presentation being built from a template.
///
/// A deck starts out without slides; none of the template's slides survive into it. Each
/// [`Deck::clone_slide`] call appends one slide that reproduces the text boxes of a template
/// slide on the template's blank layout.
#[derive(Debug)]
pub struct Deck<'t> {
    template: &'t TemplatePackage,
    title: Option<String>,
    slides: Vec<Slide>,
}

impl<'t> Deck<'t> {
    pub fn new(template: &'t TemplatePackage) -> Self {
        Self { template, title: None, slides: Vec::new() }
    }

    pub fn template(&self) -> &TemplatePackage {
        self.template
    }

    /// Sets the document title written to the core properties.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Appends a copy of template slide `source_index` and returns it.
    ///
    /// Every text-bearing shape of the source becomes a text box at the same position with the
    /// same text; pictures, tables, charts and groups are not copied. An index past the end of
    /// the template falls back to slide 0, and a template without slides yields an empty slide.
    pub fn clone_slide(&mut self, source_index: usize) -> &mut Slide {
        let source = self.template.slide(source_index).or_else(|| {
            log::debug!("Template slide {} does not exist, cloning slide 0", source_index);
            self.template.slide(0)
        });

        let mut slide = Slide::new(Some(self.template.blank_layout_path().to_string()), Vec::new());
        match source {
            Some(source) => {
                for shape in source.text_shapes() {
                    slide.add_text_box(shape.geometry.unwrap_or_default(), shape.frame.clone());
                }
                let skipped = source.shapes.len() - source.text_shapes().len();
                if skipped > 0 {
                    log::debug!("Skipped {} shapes without text frame", skipped);
                }
            },
            None => log::debug!("Template has no slides, adding an empty slide"),
        }

        self.slides.push(slide);
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    /// Writes the deck as a pptx package.
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<W> {
        writer::write_package(self.template, &self.slides, self.title.as_deref(), writer)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write(Cursor::new(Vec::new()))?.into_inner())
    }
}
