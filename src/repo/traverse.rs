use std::collections::btree_map;

use crate::database::{Database, LoadedItem};
use crate::error::{Error, Result};
use crate::path;
use crate::storable::tree::TreeEntry;

use super::Repository;

/// What [`Traverse`] found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeInfo {
    Blob { size: usize, is_binary: bool },
    Tree { entries: usize },
}

impl NodeInfo {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeInfo::Blob { .. } => "blob",
            NodeInfo::Tree { .. } => "tree",
        }
    }
}

impl Repository {
    /// Walk the head tree depth first, yielding each directory before its contents.
    ///
    /// Objects are loaded as the iterator advances. Calling this again starts a fresh walk from
    /// whatever the head is at that point; an unborn branch yields nothing.
    pub fn traverse(&self) -> Result<Traverse<'_>> {
        let mut stack = Vec::new();
        if let Some(tree) = self.head_tree()? {
            stack.push((String::new(), tree.into_entries().into_iter()));
        }
        Ok(Traverse {
            database: &self.database,
            stack,
        })
    }
}

/// Lazy depth first walk over a tree. See [`Repository::traverse`].
pub struct Traverse<'a> {
    database: &'a Database,
    stack: Vec<(String, btree_map::IntoIter<String, TreeEntry>)>,
}

impl Traverse<'_> {
    fn visit(&mut self, path: String, entry: TreeEntry) -> Result<(String, NodeInfo)> {
        match self.database.load(entry.oid())? {
            LoadedItem::Tree(tree) => {
                let info = NodeInfo::Tree {
                    entries: tree.len(),
                };
                self.stack
                    .push((path.clone(), tree.into_entries().into_iter()));
                Ok((path, info))
            }
            LoadedItem::Blob(blob) => Ok((
                path,
                NodeInfo::Blob {
                    size: blob.size(),
                    is_binary: blob.is_binary(),
                },
            )),
            LoadedItem::Commit(_) => Err(Error::corrupt(
                entry.oid(),
                format!("tree entry {path} points at a commit"),
            )),
        }
    }
}

impl Iterator for Traverse<'_> {
    type Item = Result<(String, NodeInfo)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = {
                let (prefix, entries) = self.stack.last_mut()?;
                entries
                    .next()
                    .map(|(name, entry)| (path::join(prefix, &name), entry))
            };
            match next {
                Some((path, entry)) => return Some(self.visit(path, entry)),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
