//! Tree formatter for human readable output
//!
//! Secrets are grouped by path segment and drawn with the same connectors a
//! directory tree uses. Field values are masked unless secrets are shown.

use std::io;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use termcolor::WriteColor;

use crate::tree::{SecretMetadata, SecretTree};

use super::config::DisplayConfig;
use super::hierarchy::{Hierarchy, NodeId, SegmentNode};
use super::utils::{LineStyle, connector, continuation_prefix, shown_value, write_styled};

/// Something drawn below a segment.
#[derive(Clone, Copy)]
enum Item<'a> {
    Field(&'a str, &'a Value),
    Metadata(&'a SecretMetadata),
    Child(&'a str, NodeId),
}

/// Items of one segment still to be drawn, and the prefix they are drawn with.
struct Frame<'a> {
    items: Vec<Item<'a>>,
    next: usize,
    prefix: String,
}

/// Formatter for tree output.
pub struct TreeFormatter {
    config: DisplayConfig,
}

impl TreeFormatter {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    /// Render the whole tree, followed by a summary line.
    pub fn write<W: WriteColor>(&self, tree: &SecretTree, out: &mut W) -> io::Result<()> {
        let hierarchy = Hierarchy::build(tree);

        for (mount, &id) in &hierarchy.root().children {
            write_styled(out, &format!("{}/", mount), LineStyle::Mount)?;
            writeln!(out)?;
            self.write_branch(out, &hierarchy, id)?;
        }

        writeln!(out)?;
        let count = tree.len();
        writeln!(
            out,
            "{} {}",
            count,
            if count == 1 { "secret" } else { "secrets" }
        )?;
        out.flush()
    }

    fn items<'a>(&self, node: &SegmentNode<'a>) -> Vec<Item<'a>> {
        let mut items = Vec::new();
        if let Some(record) = node.record {
            items.extend(
                record
                    .data
                    .iter()
                    .map(|(key, value)| Item::Field(key.as_str(), value)),
            );
            if self.config.show_metadata() {
                if let Some(meta) = &record.metadata {
                    items.push(Item::Metadata(meta));
                }
            }
        }
        items.extend(
            node.children
                .iter()
                .map(|(name, &child)| Item::Child(*name, child)),
        );
        items
    }

    /// Draw everything below `id`, depth first, with an explicit stack.
    fn write_branch<W: WriteColor>(
        &self,
        out: &mut W,
        hierarchy: &Hierarchy<'_>,
        id: NodeId,
    ) -> io::Result<()> {
        let mut stack = vec![Frame {
            items: self.items(hierarchy.node(id)),
            next: 0,
            prefix: String::new(),
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next == frame.items.len() {
                stack.pop();
                continue;
            }
            let item = frame.items[frame.next];
            let is_last = frame.next + 1 == frame.items.len();
            frame.next += 1;

            write!(out, "{}{}", frame.prefix, connector(is_last))?;
            let child_prefix = continuation_prefix(&frame.prefix, is_last);

            match item {
                Item::Field(key, value) => {
                    self.write_field(out, key, value)?;
                }
                Item::Metadata(meta) => {
                    write_styled(out, "metadata", LineStyle::Metadata)?;
                    writeln!(out)?;
                    write_metadata(out, meta, &child_prefix)?;
                }
                Item::Child(name, child) => {
                    let node = hierarchy.node(child);
                    self.write_label(out, name, node)?;
                    stack.push(Frame {
                        items: self.items(node),
                        next: 0,
                        prefix: child_prefix,
                    });
                }
            }
        }
        Ok(())
    }

    fn write_label<W: WriteColor>(
        &self,
        out: &mut W,
        name: &str,
        node: &SegmentNode<'_>,
    ) -> io::Result<()> {
        if node.has_children() {
            write_styled(out, &format!("{}/", name), LineStyle::Folder)?;
        } else {
            write_styled(out, name, LineStyle::Secret)?;
        }
        if node.record.is_some_and(|r| r.is_deleted()) {
            write!(out, " ")?;
            write_styled(out, "(deleted)", LineStyle::Deleted)?;
        }
        writeln!(out)
    }

    fn write_field<W: WriteColor>(&self, out: &mut W, key: &str, value: &Value) -> io::Result<()> {
        let shown = shown_value(
            value,
            self.config.show_secrets(),
            self.config.password_length(),
        );
        let style = if self.config.show_secrets() {
            LineStyle::Value
        } else {
            LineStyle::Masked
        };

        write_styled(out, key, LineStyle::Key)?;
        write!(out, " = ")?;
        write_styled(out, &shown, style)?;
        writeln!(out)
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Metadata entries as `(name, value)` pairs, in display order.
pub(crate) fn metadata_lines(meta: &SecretMetadata) -> Vec<(String, String)> {
    let mut lines = vec![("version".to_string(), meta.version.to_string())];
    if let Some(created) = &meta.created_time {
        lines.push(("created_time".to_string(), format_time(created)));
    }
    if let Some(deleted) = &meta.deletion_time {
        lines.push(("deletion_time".to_string(), format_time(deleted)));
    }
    lines.push(("destroyed".to_string(), meta.destroyed.to_string()));
    for (key, value) in &meta.custom_metadata {
        lines.push((format!("custom_metadata.{}", key), value.clone()));
    }
    lines
}

fn write_metadata<W: WriteColor>(
    out: &mut W,
    meta: &SecretMetadata,
    prefix: &str,
) -> io::Result<()> {
    let lines = metadata_lines(meta);
    let count = lines.len();
    for (i, (name, value)) in lines.iter().enumerate() {
        write!(out, "{}{}", prefix, connector(i + 1 == count))?;
        write_styled(out, &format!("{} = {}", name, value), LineStyle::Metadata)?;
        writeln!(out)?;
    }
    Ok(())
}
