use serde::{Deserialize, Serialize};

/// One entry of a caller-supplied mapping: template slide `index` exemplifies layout `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideLayoutEntry {
    pub index: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl SlideLayoutEntry {
    pub fn new(index: i64, kind: impl Into<String>) -> Self {
        Self { index, kind: kind.into() }
    }
}

/// Normalizes a layout name: trimmed, lower-case, underscores replaced by hyphens.
pub fn normalize_layout(name: &str) -> String {
    name.trim().to_lowercase().replace('_', "-")
}

/// Picks the template slide that exemplifies `layout`.
///
/// The first mapping entry whose normalized type equals the normalized layout wins. Without a
/// match, or when the matched index is outside `0..slide_count`, slide 0 is used. This never
/// fails.
pub fn resolve_layout(layout: &str, mapping: &[SlideLayoutEntry], slide_count: usize) -> usize {
    let wanted = normalize_layout(layout);

    let Some(entry) = mapping.iter().find(|entry| normalize_layout(&entry.kind) == wanted) else {
        if !mapping.is_empty() {
            log::debug!("Layout '{}' has no template slide, using slide 0", wanted);
        }
        return 0;
    };

    match usize::try_from(entry.index) {
        Ok(index) if index < slide_count => index,
        _ => {
            log::debug!(
                "Template slide {} for layout '{}' is out of range ({} slides), using slide 0",
                entry.index,
                wanted,
                slide_count
            );
            0
        },
    }
}
