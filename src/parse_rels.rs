use crate::types::Relationship;
use crate::Result;
use roxmltree::Document;

/// Parses relationship (`.rels`) XML data into its `<Relationship>` entries.
///
/// Entries keep their document order. Relationships with a missing `Id`, `Type` or `Target`
/// attribute are skipped.
///
/// # Errors
///
/// An error is returned if:
/// - The XML data is not valid UTF-8.
/// - Malformed or invalid XML structure is detected.
pub fn parse_rels(xml_data: &[u8]) -> Result<Vec<Relationship>> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = Document::parse(xml_str)?;
    let root = doc.root_element();

    let mut relationships = Vec::new();
    for rel in root.children().filter(|n| n.is_element() && n.tag_name().name() == "Relationship") {
        let (Some(id), Some(rel_type), Some(target)) =
            (rel.attribute("Id"), rel.attribute("Type"), rel.attribute("Target"))
        else {
            continue;
        };

        relationships.push(Relationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: rel.attribute("TargetMode") == Some("External"),
        });
    }

    Ok(relationships)
}

/// Constructs the path to the relationships part of a given part.
///
/// ```text
/// "ppt/slides/slide1.xml" -> "ppt/slides/_rels/slide1.xml.rels"
/// ```
pub fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Resolves a relationship target against the directory of the part that owns the relationship.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_part_path(absolute);
    }

    let source_dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    if source_dir.is_empty() {
        normalize_part_path(target)
    } else {
        normalize_part_path(&format!("{}/{}", source_dir, target))
    }
}

/// Expresses `target_part` relative to the directory of `source_part`, the inverse of
/// [`resolve_target`].
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();

    let common = source_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; source_dir.len() - common];
    segments.extend_from_slice(&target[common..]);
    segments.join("/")
}

fn normalize_part_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}
