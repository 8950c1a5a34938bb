//! Flat projections: only field names, or only leaf paths.

use std::io::{self, Write};

use crate::tree::SecretTree;

/// Which flat projection to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Keys,
    Paths,
}

impl Listing {
    /// The sorted, deduplicated entries of this projection.
    pub fn entries(&self, tree: &SecretTree) -> Vec<String> {
        match self {
            Listing::Keys => tree.keys(),
            Listing::Paths => tree.paths(),
        }
    }
}

/// Print one entry per line.
pub fn write_listing<W: Write>(tree: &SecretTree, listing: Listing, out: &mut W) -> io::Result<()> {
    for entry in listing.entries(tree) {
        writeln!(out, "{}", entry)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SecretPath, SecretRecord};

    fn tree() -> SecretTree {
        [
            (
                SecretPath::parse("kv/app2/db").unwrap(),
                SecretRecord::from_pairs([("host", "db.local"), ("user", "svc")]),
            ),
            (
                SecretPath::parse("kv/app1").unwrap(),
                SecretRecord::from_pairs([("user", "alice"), ("pass", "secret123")]),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_only_keys() {
        let mut out = Vec::new();
        write_listing(&tree(), Listing::Keys, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "host\npass\nuser\n");
    }

    #[test]
    fn test_only_paths() {
        let mut out = Vec::new();
        write_listing(&tree(), Listing::Paths, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "kv/app1\nkv/app2/db\n");
    }

    #[test]
    fn test_keys_independent_of_shape() {
        let flat: SecretTree = [
            (SecretPath::parse("kv/a").unwrap(), SecretRecord::from_pairs([("host", "x")])),
            (SecretPath::parse("kv/b").unwrap(), SecretRecord::from_pairs([("pass", "x")])),
            (SecretPath::parse("kv/c").unwrap(), SecretRecord::from_pairs([("user", "x")])),
        ]
        .into_iter()
        .collect();
        assert_eq!(Listing::Keys.entries(&flat), Listing::Keys.entries(&tree()));
    }
}
