mod constants;
mod container;
mod content;
mod deck;
mod layout;
mod parse_rels;
mod parse_xml;
mod render;
mod slide;
mod types;
mod writer;

pub mod config;
pub mod server;

pub use config::ServiceConfig;
pub use constants::PPTX_MEDIA_TYPE;
pub use container::TemplatePackage;
pub use content::apply_content;
pub use deck::Deck;
pub use layout::{normalize_layout, resolve_layout, SlideLayoutEntry};
pub use render::{inspect_template, render_deck, RenderRequest, SlideSpec, SlideText, TemplateSummary};
pub use slide::Slide;
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Part not found in package: {0}")]
    PartNotFound(String),

    #[error("Malformed package: {0}")]
    Malformed(&'static str),

    #[error("Cannot open template {path}: {source}")]
    TemplateOpen {
        path: String,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
