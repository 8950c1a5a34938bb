//! Regroups flat leaf paths into nested segments for display.
//!
//! Nodes live in one flat arena and refer to their children by index, so
//! building, walking and dropping a hierarchy never recurses.

use std::collections::BTreeMap;

use crate::tree::{SecretRecord, SecretTree};

/// Index of a node inside a [`Hierarchy`].
pub type NodeId = usize;

/// One path segment with the secret stored there (if any) and its children.
///
/// A segment may hold a record and children at once: KV engines allow
/// `app` and `app/db` to coexist.
#[derive(Debug, Default)]
pub struct SegmentNode<'a> {
    pub record: Option<&'a SecretRecord>,
    pub children: BTreeMap<&'a str, NodeId>,
}

impl SegmentNode<'_> {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Segment hierarchy for a tree. Node [`Hierarchy::ROOT`] is a virtual root
/// whose children are the mounts.
#[derive(Debug)]
pub struct Hierarchy<'a> {
    nodes: Vec<SegmentNode<'a>>,
}

impl<'a> Hierarchy<'a> {
    pub const ROOT: NodeId = 0;

    pub fn build(tree: &'a SecretTree) -> Self {
        let mut nodes = vec![SegmentNode::default()];
        for (path, record) in tree.iter() {
            let mut current = Self::ROOT;
            for segment in path.segments() {
                let existing = nodes[current].children.get(segment.as_str()).copied();
                current = match existing {
                    Some(child) => child,
                    None => {
                        let child = nodes.len();
                        nodes.push(SegmentNode::default());
                        nodes[current].children.insert(segment.as_str(), child);
                        child
                    }
                };
            }
            nodes[current].record = Some(record);
        }
        Self { nodes }
    }

    pub fn node(&self, id: NodeId) -> &SegmentNode<'a> {
        &self.nodes[id]
    }

    pub fn root(&self) -> &SegmentNode<'a> {
        self.node(Self::ROOT)
    }
}
