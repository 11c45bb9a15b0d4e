use crate::container::TemplatePackage;
use crate::content::apply_content;
use crate::deck::Deck;
use crate::layout::{resolve_layout, SlideLayoutEntry};
use crate::types::LINE_BREAK;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A deck to render: which template to copy from and what goes on each slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template_path: String,
    #[serde(default)]
    pub deck_title: Option<String>,
    pub slides: Vec<SlideSpec>,
    #[serde(default)]
    pub slide_layouts: Option<Vec<SlideLayoutEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideSpec {
    pub layout: String,
    #[serde(default)]
    pub content: Value,
}

/// Text and default layout mapping of a template, for callers building a `slideLayouts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub slide_count: usize,
    pub slides: Vec<SlideText>,
    pub slide_layouts: Vec<SlideLayoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideText {
    pub index: usize,
    pub text: String,
}

/// Renders a request into the bytes of a pptx package.
///
/// The template is parsed once; every requested slide is cloned from the template slide its
/// layout resolves to and then filled with its content. The output holds exactly one slide per
/// requested slide, in request order.
///
/// # Errors
///
/// [`Error::TemplateOpen`] when the template cannot be read or parsed. Any other error comes
/// from writing the package.
pub fn render_deck(request: &RenderRequest) -> Result<Vec<u8>> {
    let template = open_template(&request.template_path)?;
    let mapping = request.slide_layouts.as_deref().unwrap_or_default();

    let mut deck = Deck::new(&template);
    if let Some(title) = request.deck_title.as_deref().filter(|title| !title.is_empty()) {
        deck.set_title(title);
    }

    for spec in &request.slides {
        let source_index = resolve_layout(&spec.layout, mapping, template.slide_count());
        let slide = deck.clone_slide(source_index);
        apply_content(slide, &spec.layout, &spec.content);
    }

    let bytes = deck.to_bytes()?;
    log::info!(
        "Rendered {} slides from {} ({} bytes)",
        deck.slide_count(),
        request.template_path,
        bytes.len()
    );
    Ok(bytes)
}

/// Lists the text of every template slide together with the default layout mapping: slide 0
/// is the `hero` slide, every other slide a `title` slide.
pub fn inspect_template(template_path: &str) -> Result<TemplateSummary> {
    let template = open_template(template_path)?;

    let slides = template
        .slides()
        .iter()
        .enumerate()
        .map(|(index, slide)| {
            let text = slide
                .text_shapes()
                .iter()
                .flat_map(|shape| shape.frame.paragraphs())
                .flat_map(|paragraph| paragraph.split(LINE_BREAK))
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            SlideText { index, text }
        })
        .collect::<Vec<_>>();

    let slide_layouts = (0..slides.len())
        .map(|index| SlideLayoutEntry::new(index as i64, if index == 0 { "hero" } else { "title" }))
        .collect();

    Ok(TemplateSummary { slide_count: slides.len(), slides, slide_layouts })
}

fn open_template(template_path: &str) -> Result<TemplatePackage> {
    TemplatePackage::open(Path::new(template_path)).map_err(|e| {
        log::warn!("Cannot open template {}: {}", template_path, e);
        Error::TemplateOpen { path: template_path.to_string(), source: Box::new(e) }
    })
}
