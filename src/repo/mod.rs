mod commit;
mod traverse;

pub use commit::Log;
pub use traverse::{NodeInfo, Traverse};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;

use crate::builder::TreeBuilder;
use crate::database::Database;
use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::path;
use crate::refs::Refs;
use crate::storable::tree::{EntryKind, Tree};

/// Settings used when a repository root is first created.
#[derive(Debug, Clone)]
pub struct Options {
    /// Branch that `HEAD` points at in a new root. Existing roots keep their own.
    pub branch: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            branch: "main".to_owned(),
        }
    }
}

/// Writes waiting for the next commit.
#[derive(Debug)]
enum Stage {
    /// Nothing written since opening or since the last commit.
    Unseeded,
    /// Seeded from the head tree, with every write since folded in.
    Staged(TreeBuilder),
}

/// One versioned store rooted at a directory.
pub struct Repository {
    root: Utf8PathBuf,
    database: Database,
    refs: Refs,
    stage: Stage,
}

impl Repository {
    /// Open the store at `root`, creating its layout if needed.
    pub fn open(root: impl AsRef<Utf8Path>) -> Result<Self> {
        Self::open_with(root, &Options::default())
    }

    /// Create the layout under `root`. Running it on an existing store changes nothing.
    pub fn init(root: impl AsRef<Utf8Path>) -> Result<Self> {
        Self::init_with(root, &Options::default())
    }

    pub fn init_with(root: impl AsRef<Utf8Path>, options: &Options) -> Result<Self> {
        let root = root.as_ref();
        trace!(path=%root, "Initialising repository");
        if root.join("HEAD").is_file() {
            warn!(path=%root, "Repository already exists, init will do nothing");
        }
        Self::open_with(root, options)
    }

    pub fn open_with(root: impl AsRef<Utf8Path>, options: &Options) -> Result<Self> {
        let root = root.as_ref().to_owned();
        std::fs::create_dir_all(root.join("objects"))?;
        let refs = Refs::open(&root, &options.branch)?;
        let database = Database::new(&root);
        debug!(path=%root, branch=%refs.branch(), "Opened repository");

        Ok(Self {
            root,
            database,
            refs,
            stage: Stage::Unseeded,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Last component of the root path.
    pub fn name(&self) -> &str {
        self.root.file_name().unwrap_or("repository")
    }

    pub fn branch(&self) -> &str {
        self.refs.branch()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Whether there are writes that have not been committed.
    pub fn is_staged(&self) -> bool {
        matches!(self.stage, Stage::Staged(_))
    }

    /// The commit the branch points at, `None` while it is unborn.
    pub fn head(&self) -> Result<Option<Digest>> {
        self.refs.read_head()
    }

    fn head_tree_id(&self) -> Result<Option<Digest>> {
        match self.head()? {
            Some(head) => Ok(Some(self.database.load_commit(&head)?.tree_id().clone())),
            None => Ok(None),
        }
    }

    fn head_tree(&self) -> Result<Option<Tree>> {
        match self.head_tree_id()? {
            Some(tree_id) => Ok(Some(self.database.load_tree(&tree_id)?)),
            None => Ok(None),
        }
    }

    /// Move to [`Stage::Staged`], seeding the builder from the head tree.
    fn seed_stage(&mut self) -> Result<()> {
        if let Stage::Unseeded = self.stage {
            let head_tree = self.head_tree_id()?;
            trace!(tree=?head_tree.as_ref().map(Digest::short), "Seeding pending tree");
            self.stage = Stage::Staged(TreeBuilder::seed(&self.database, head_tree.as_ref())?);
        }
        Ok(())
    }

    /// Store `data` and stage it at `path`. Nothing is visible to readers until [`commit`].
    ///
    /// [`commit`]: Repository::commit
    pub fn write(&mut self, path: &str, data: impl AsRef<[u8]>) -> Result<Digest> {
        let segments = path::segments(path)?;
        let oid = self.database.put(data.as_ref())?;
        debug!(%path, oid=%oid.short(), "Writing blob");

        self.seed_stage()?;
        if let Stage::Staged(builder) = &mut self.stage {
            builder.insert(&self.database, &segments, oid.clone(), EntryKind::Blob)?;
        }
        Ok(oid)
    }

    /// Contents of the blob at `path` in the head commit. Pending writes are not visible.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let segments = path::segments(path)?;
        let not_found = || Error::NotFound(path.to_owned());

        let mut tree = self.head_tree()?.ok_or_else(not_found)?;
        let (name, parents) = segments.split_last().ok_or_else(not_found)?;

        for parent in parents {
            let subtree = tree
                .get(parent)
                .filter(|entry| entry.is_tree())
                .ok_or_else(not_found)?
                .oid()
                .clone();
            tree = self.database.load_tree(&subtree)?;
        }

        let entry = tree
            .get(name)
            .filter(|entry| !entry.is_tree())
            .ok_or_else(not_found)?;
        self.database.get(entry.oid())
    }

    /// Every blob path in the head commit, parents before children and siblings by name.
    pub fn list(&self) -> Result<Vec<String>> {
        self.traverse()?
            .filter_map(|node| match node {
                Ok((path, NodeInfo::Blob { .. })) => Some(Ok(path)),
                Ok((_, NodeInfo::Tree { .. })) => None,
                Err(e) => Some(Err(e)),
            })
            .collect()
    }
}
