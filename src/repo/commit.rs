use tracing::*;

use crate::builder::TreeBuilder;
use crate::database::{Database, LoadedItem};
use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::storable::commit::{Author, Commit};
use crate::storable::tree::EntryKind;

use super::{Repository, Stage};

/// File written into the very first commit of a repository when nothing else was staged.
const BOOTSTRAP_FILE: &str = "README";

impl Repository {
    /// Seal the pending writes into a tree and commit it on top of the branch head.
    ///
    /// With nothing staged the head tree is committed again. On an unborn branch with nothing
    /// staged the commit gets a `README` so the first snapshot is never empty.
    pub fn commit(&mut self, message: &str, author_name: &str, author_email: &str) -> Result<Digest> {
        trace!(path=%self.root, %message, "Starting commit");
        let tree_id = match &self.stage {
            Stage::Staged(builder) => builder.seal(&self.database)?,
            Stage::Unseeded => match self.head_tree_id()? {
                Some(tree_id) => tree_id,
                None => TreeBuilder::new().seal(&self.database)?,
            },
        };

        let oid = self.commit_tree(&tree_id, Author::new(author_name, author_email), message)?;
        self.stage = Stage::Unseeded;
        Ok(oid)
    }

    /// Create a commit of `tree_id` whose parent is the current head, then advance the branch.
    pub fn commit_tree(&self, tree_id: &Digest, author: Author, message: &str) -> Result<Digest> {
        let tree = match self.database.load(tree_id) {
            Ok(LoadedItem::Tree(tree)) => tree,
            Ok(_) | Err(Error::NotFound(_)) => return Err(Error::InvalidTree(tree_id.clone())),
            Err(e) => return Err(e),
        };

        let parent = self.head()?;
        let tree_id = match &parent {
            Some(parent) => {
                self.check_parent(parent)?;
                tree_id.clone()
            }
            None if tree.is_empty() => self.bootstrap_tree()?,
            None => tree_id.clone(),
        };

        let commit = Commit::new(parent.clone(), tree_id, author, message);
        let oid = self.database.store(&commit)?;
        self.refs.advance_branch(&oid, parent.as_ref())?;

        info!(
            commit=%oid.short(),
            parent=?parent.as_ref().map(Digest::short),
            branch=%self.refs.branch(),
            "Created commit"
        );
        Ok(oid)
    }

    fn check_parent(&self, parent: &Digest) -> Result<()> {
        match self.database.load(parent) {
            Ok(LoadedItem::Commit(_)) => Ok(()),
            Ok(_) | Err(Error::NotFound(_)) => Err(Error::InvalidParent {
                branch: self.refs.branch().to_owned(),
                expected: "a stored commit".to_owned(),
                actual: parent.to_hex(),
            }),
            Err(e) => Err(e),
        }
    }

    fn bootstrap_tree(&self) -> Result<Digest> {
        debug!(file = BOOTSTRAP_FILE, "Empty first commit, seeding a bootstrap file");
        let contents = format!("initial commit for {}", self.name());
        let blob = self.database.put(contents.as_bytes())?;

        let mut builder = TreeBuilder::new();
        builder.insert(&self.database, &[BOOTSTRAP_FILE], blob, EntryKind::Blob)?;
        builder.seal(&self.database)
    }

    /// The head commit, if the branch has one.
    pub fn head_commit(&self) -> Result<Option<Commit>> {
        match self.head()? {
            Some(head) => Ok(Some(self.database.load_commit(&head)?)),
            None => Ok(None),
        }
    }

    /// Walk the history from the head back to the first commit.
    pub fn log(&self) -> Result<Log<'_>> {
        Ok(Log {
            database: &self.database,
            next: self.head()?,
        })
    }
}

/// Commits from newest to oldest, following parent links.
pub struct Log<'a> {
    database: &'a Database,
    next: Option<Digest>,
}

impl Iterator for Log<'_> {
    type Item = Result<(Digest, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.next.take()?;
        match self.database.load_commit(&oid) {
            Ok(commit) => {
                self.next = commit.parent().cloned();
                Some(Ok((oid, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
