//! Collector - walks the secret hierarchy and gathers every leaf

use tracing::{debug, info};

use crate::backend::{Backend, BackendError, BackendErrorKind, ChildEntry};

use super::path::SecretPath;
use super::secret_tree::SecretTree;

/// Pending work on the traversal stack.
enum Task {
    List(SecretPath),
    Fetch(SecretPath),
}

/// Recursively collects secrets below one or more root paths.
///
/// Traversal is depth-first, left to right in the order the backend lists
/// children, and strictly sequential. The first failing call aborts the whole
/// collection. The walk keeps its own stack, so depth is only bounded by memory.
pub struct Collector<B: Backend> {
    backend: B,
}

impl<B: Backend> Collector<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Collect every root into one tree.
    ///
    /// Roots are walked one after the other. When two roots overlap, the later
    /// record for a path replaces the earlier one (last write wins) without
    /// adding a second entry.
    pub fn collect(&self, roots: &[SecretPath]) -> Result<SecretTree, BackendError> {
        let mut tree = SecretTree::new();
        for root in roots {
            let found = self.collect_root(root)?;
            for path in tree.merge(found) {
                debug!(path = %path, "path collected twice, keeping the latest record");
            }
        }
        info!(roots = roots.len(), secrets = tree.len(), "collection finished");
        Ok(tree)
    }

    /// Collect the secrets below a single root.
    ///
    /// A root that cannot be listed but can be fetched is treated as a single
    /// leaf, so `kv/app1` works as well as `kv`.
    pub fn collect_root(&self, root: &SecretPath) -> Result<SecretTree, BackendError> {
        let mut tree = SecretTree::new();

        let children = match self.backend.list_children(root) {
            Ok(children) => children,
            Err(err) if err.kind == BackendErrorKind::NotFound && root.depth() > 1 => {
                debug!(path = %root, "root is not a folder, trying it as a secret");
                return match self.backend.fetch_secret(root) {
                    Ok(record) => {
                        tree.insert(root.clone(), record);
                        Ok(tree)
                    }
                    Err(fetch_err) if fetch_err.kind == BackendErrorKind::NotFound => Err(err),
                    Err(fetch_err) => Err(fetch_err),
                };
            }
            Err(err) => return Err(err),
        };

        let mut stack: Vec<Task> = Vec::new();
        push_children(&mut stack, root, children);

        while let Some(task) = stack.pop() {
            match task {
                Task::List(path) => {
                    debug!(path = %path, "descending");
                    let children = self.backend.list_children(&path)?;
                    push_children(&mut stack, &path, children);
                }
                Task::Fetch(path) => {
                    debug!(path = %path, "reading secret");
                    let record = self.backend.fetch_secret(&path)?;
                    tree.insert(path, record);
                }
            }
        }

        Ok(tree)
    }
}

/// Queue children so they pop off the stack in listing order.
fn push_children(stack: &mut Vec<Task>, parent: &SecretPath, children: Vec<ChildEntry>) {
    for child in children.into_iter().rev() {
        let path = parent.join(child.name());
        let task = match child {
            ChildEntry::Leaf(_) => Task::Fetch(path),
            ChildEntry::Intermediate(_) => Task::List(path),
        };
        stack.push(task);
    }
}
