use std::collections::BTreeMap;

use tracing::*;

use crate::database::Database;
use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::storable::tree::{EntryKind, Tree, TreeEntry};

/// Mutable staging area for one directory level.
///
/// Child directories are not kept as nested builders: every insert below this level loads the
/// stored subtree, rebuilds the path down to the new leaf and stores the result, so a builder
/// only ever holds ids of sealed trees and the object database acts as the arena.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    entries: BTreeMap<String, TreeEntry>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tree(tree: Tree) -> Self {
        Self {
            entries: tree.into_entries(),
        }
    }

    /// Start from the tree stored under `tree_id`, or from nothing.
    pub fn seed(database: &Database, tree_id: Option<&Digest>) -> Result<Self> {
        match tree_id {
            Some(tree_id) => {
                trace!(tree=%tree_id.short(), "Seeding builder");
                let tree = database
                    .load(tree_id)?
                    .into_tree()
                    .ok_or_else(|| Error::InvalidTree(tree_id.clone()))?;
                Ok(Self::from_tree(tree))
            }
            None => Ok(Self::new()),
        }
    }

    pub fn entries(&self) -> &BTreeMap<String, TreeEntry> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `oid` at `path`, creating or rewriting every directory on the way.
    ///
    /// The last segment replaces whatever entry had that name, whichever kind it was. A blob
    /// standing where a directory is needed is replaced by the directory.
    pub fn insert(
        &mut self,
        database: &Database,
        path: &[&str],
        oid: Digest,
        kind: EntryKind,
    ) -> Result<()> {
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| Error::InvalidPath(String::new()))?;

        if rest.is_empty() {
            trace!(name=%first, oid=%oid.short(), ?kind, "Inserting entry");
            self.entries
                .insert((*first).to_owned(), TreeEntry::new(oid, kind));
            return Ok(());
        }

        let mut child = match self.entries.get(*first) {
            Some(entry) if entry.is_tree() => {
                trace!(name=%first, tree=%entry.oid().short(), "Reusing subtree");
                Self::seed(database, Some(entry.oid()))?
            }
            _ => Self::new(),
        };
        child.insert(database, rest, oid, kind)?;

        let child_id = child.seal(database)?;
        self.entries
            .insert((*first).to_owned(), TreeEntry::new(child_id, EntryKind::Tree));
        Ok(())
    }

    /// Store the current entries as a tree. Sealing twice without inserting in between gives the
    /// same id.
    pub fn seal(&self, database: &Database) -> Result<Digest> {
        let oid = database.store(&Tree::new(self.entries.clone()))?;
        trace!(tree=%oid.short(), entries=self.entries.len(), "Sealed tree");
        Ok(oid)
    }
}
