use crate::layout::normalize_layout;
use crate::types::TextShape;
use crate::Slide;
use serde_json::Value;

const STATS_FIELDS: [(&str, &str); 3] = [("stat1", "label1"), ("stat2", "label2"), ("stat3", "label3")];
const STATS_SEPARATOR: &str = "  |  ";

/// Writes the fields of `content` into the text-bearing shapes of `slide`.
///
/// The layout decides which field lands in which shape (shape 0 usually takes the title, shape 1
/// the secondary text). Content aimed at a shape the slide doesn't have is dropped, and a slide
/// without text-bearing shapes is left untouched. Absent or falsy fields are written as empty
/// text. Unknown layouts put `content.title` into the first shape.
pub fn apply_content(slide: &mut Slide, layout: &str, content: &Value) {
    let mut targets = slide.text_shapes_mut();
    if targets.is_empty() {
        log::debug!("Slide has no text-bearing shapes, dropping '{}' content", layout);
        return;
    }

    let layout = normalize_layout(layout);
    let field = |name: &str| field_text(content, name);

    match layout.as_str() {
        "hero" | "title" | "title-subtitle" => {
            set_text(&mut targets, 0, field("title"));
            if layout != "title" {
                set_text(&mut targets, 1, field("subtitle"));
            }
        },
        "bullet" => {
            set_text(&mut targets, 0, field("title"));
            set_lines(&mut targets, 1, bullet_items(content));
        },
        "timeline" => {
            set_text(&mut targets, 0, field("title"));
            set_lines(&mut targets, 1, timeline_events(content));
        },
        "stats-row" => {
            set_text(&mut targets, 0, stats_row(content));
        },
        "big-number" => {
            let number = field("number");
            set_text(&mut targets, 0, if number.is_empty() { "0".to_string() } else { number });
            set_text(&mut targets, 1, field("label"));
        },
        "quote" => {
            set_text(&mut targets, 0, field("text"));
            set_text(&mut targets, 1, field("author"));
        },
        "section" => set_text(&mut targets, 0, field("title")),
        "two-column" => {
            set_text(&mut targets, 0, field("left"));
            set_text(&mut targets, 1, field("right"));
        },
        "image-text" => {
            set_text(&mut targets, 0, field("title"));
            set_text(&mut targets, 1, field("body"));
        },
        _ => set_text(&mut targets, 0, field("title")),
    }
}

fn set_text(targets: &mut [&mut TextShape], index: usize, value: String) {
    if let Some(shape) = targets.get_mut(index) {
        shape.frame.set_text(value);
    }
}

fn set_lines(targets: &mut [&mut TextShape], index: usize, lines: Vec<String>) {
    let Some(shape) = targets.get_mut(index) else {
        return;
    };
    if lines.is_empty() {
        shape.frame.set_text(String::new());
    } else {
        shape.frame.set_lines(lines);
    }
}

/// Joins the non-empty stats and labels in field order. A label whose stat is empty is
/// dropped along with it.
fn stats_row(content: &Value) -> String {
    let mut values = Vec::new();
    for (stat_field, label_field) in STATS_FIELDS {
        let stat = field_text(content, stat_field);
        if stat.is_empty() {
            continue;
        }
        values.push(stat);

        let label = field_text(content, label_field);
        if !label.is_empty() {
            values.push(label);
        }
    }
    values.join(STATS_SEPARATOR)
}

/// Items are plain strings or objects with a `text` field; anything else is skipped.
fn bullet_items(content: &Value) -> Vec<String> {
    let Some(items) = content.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.clone()),
            Value::Object(_) => Some(field_text(item, "text")),
            other => {
                log::debug!("Skipping bullet item {}", other);
                None
            },
        })
        .collect()
}

/// Event objects render as `"{year} – {text}"`, other events as their plain string form, so
/// `0` stays `"0"`. Only `null` reads as empty.
fn timeline_events(content: &Value) -> Vec<String> {
    let Some(events) = content.get("events").and_then(Value::as_array) else {
        return Vec::new();
    };

    events
        .iter()
        .map(|event| match event {
            Value::Object(_) => format!("{} – {}", field_text(event, "year"), field_text(event, "text")),
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn field_text(content: &Value, name: &str) -> String {
    content.get(name).map(value_text).unwrap_or_default()
}

/// String form of a JSON value; falsy values (`null`, `false`, `0`, `""`, `[]`, `{}`) are empty.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(number) if number.as_f64() == Some(0.0) => String::new(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Object(fields) if fields.is_empty() => String::new(),
        other => other.to_string(),
    }
}
