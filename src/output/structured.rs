//! JSON and YAML output
//!
//! The document mirrors the path hierarchy: every segment becomes one level
//! of nesting and each leaf holds its field mapping. With metadata enabled a
//! leaf becomes `{ "data": {...}, "metadata": {...} }`.
//!
//! Building, serializing and dropping a nested `Value` recurse once per
//! level, so paths deeper than [`MAX_DOCUMENT_DEPTH`] segments are rejected.

use std::io::Write;

use serde_json::{Map, Value};

use crate::tree::SecretTree;

use super::RenderError;
use super::config::{DisplayConfig, OutputFormat};
use super::hierarchy::{Hierarchy, NodeId};
use super::listing::Listing;
use super::utils::mask;

/// Deepest path, in segments, that a JSON or YAML document will nest.
pub const MAX_DOCUMENT_DEPTH: usize = 100;

/// Build the document that gets serialized for `config`.
pub fn build_document(tree: &SecretTree, config: &DisplayConfig) -> Result<Value, RenderError> {
    if config.only_keys() {
        return Ok(string_array(Listing::Keys.entries(tree)));
    }
    if config.only_paths() {
        return Ok(string_array(Listing::Paths.entries(tree)));
    }

    if let Some((path, _)) = tree.iter().find(|(p, _)| p.depth() > MAX_DOCUMENT_DEPTH) {
        return Err(RenderError::TooDeep {
            path: path.to_string(),
            limit: MAX_DOCUMENT_DEPTH,
        });
    }

    let hierarchy = Hierarchy::build(tree);
    Ok(Value::Object(build_children(
        &hierarchy,
        Hierarchy::ROOT,
        "",
        config,
    )?))
}

fn string_array(entries: Vec<String>) -> Value {
    Value::Array(entries.into_iter().map(Value::String).collect())
}

fn build_children(
    hierarchy: &Hierarchy<'_>,
    id: NodeId,
    path: &str,
    config: &DisplayConfig,
) -> Result<Map<String, Value>, RenderError> {
    let node = hierarchy.node(id);
    let mut map = Map::new();

    if let Some(record) = node.record {
        let fields: Map<String, Value> = record
            .data
            .iter()
            .map(|(key, value)| {
                let value = if config.show_secrets() {
                    value.clone()
                } else {
                    Value::String(mask(config.password_length()))
                };
                (key.clone(), value)
            })
            .collect();

        if config.show_metadata() {
            map.insert("data".to_string(), Value::Object(fields));
            if let Some(meta) = &record.metadata {
                map.insert("metadata".to_string(), serde_json::to_value(meta)?);
            }
        } else {
            map = fields;
        }
    }

    for (name, &child) in &node.children {
        let child_path = if path.is_empty() {
            (*name).to_string()
        } else {
            format!("{}/{}", path, name)
        };
        if map.contains_key(*name) {
            return Err(RenderError::PathConflict(child_path));
        }
        let value = Value::Object(build_children(hierarchy, child, &child_path, config)?);
        map.insert((*name).to_string(), value);
    }

    Ok(map)
}

/// Serialize `tree` as JSON or YAML into `out`.
pub fn write_structured<W: Write>(
    tree: &SecretTree,
    config: &DisplayConfig,
    out: &mut W,
) -> Result<(), RenderError> {
    let document = build_document(tree, config)?;

    match config.format() {
        OutputFormat::Yaml => serde_yaml::to_writer(&mut *out, &document)?,
        _ => {
            serde_json::to_writer_pretty(&mut *out, &document)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}
