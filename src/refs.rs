use std::io::Write;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;

use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::lock::LockedFile;

/// Contains all characters that cannot appear in a ref name.
///
/// See: <https://github.com/git/git/blob/795ea8776befc95ea2becd8020c7a284677b4161/refs.c#L48-L57>
const DISALLOWED_CHARACTERS: [char; 40] = [
    '\x01', '\x02', '\x03', '\x04', '\x05', '\x06', '\x07', '\x08', '\t', '\n', '\x0b', '\x0c',
    '\r', '\x0e', '\x0f', '\x10', '\x11', '\x12', '\x13', '\x14', '\x15', '\x16', '\x17', '\x18',
    '\x19', '\x1a', '\x1b', '\x1c', '\x1d', '\x1e', '\x1f', ' ', '*', ':', '?', '[', '\\', '^',
    '~', '\x7f',
];

/// Check whether a string is a valid branch name.
///
/// Disallowed names are any name where:
///
/// - it is empty
/// - it (or any path component) begins with `'.'`
/// - it contains double dots `".."`
/// - it contains ASCII control characters
/// - it contains ':', '?', '[', '\', '^', '~', '*', SP, or TAB anywhere
/// - it ends with `'/'`
/// - it ends with `".lock"`
/// - it contains `"@{"`
pub fn is_valid_ref_name(name: &str) -> bool {
    !(name.is_empty()
        || name.chars().any(|c| DISALLOWED_CHARACTERS.contains(&c))
        || name.starts_with('.')
        || name.contains("/.")
        || name.contains("..")
        || name.ends_with('/')
        || name.ends_with(".lock")
        || name.contains("@{"))
}

/// `HEAD` and the single branch it points at.
pub struct Refs {
    root: Utf8PathBuf,
    branch: String,
}

impl Refs {
    const HEADS: &'static str = "refs/heads";

    /// Open the refs under `root`, creating `HEAD -> refs/heads/<branch>` if there is no `HEAD`
    /// yet. An existing `HEAD` decides which branch is used.
    pub fn open(root: impl AsRef<Utf8Path>, branch: &str) -> Result<Self> {
        let root = root.as_ref().to_owned();
        let head_path = root.join("HEAD");
        std::fs::create_dir_all(root.join(Self::HEADS))?;

        let branch = if head_path.is_file() {
            let contents = std::fs::read_to_string(&head_path)?;
            let target = contents
                .trim()
                .strip_prefix("ref: ")
                .and_then(|target| target.strip_prefix("refs/heads/"))
                .ok_or_else(|| Error::NotFound(format!("symbolic HEAD in {head_path}")))?;
            if !is_valid_ref_name(target) {
                return Err(Error::InvalidPath(format!("branch {target:?} named by {head_path}")));
            }
            target.to_owned()
        } else {
            if !is_valid_ref_name(branch) {
                return Err(Error::InvalidPath(branch.to_owned()));
            }
            debug!(%branch, "Creating HEAD");
            let mut head = LockedFile::acquire(&head_path)?;
            writeln!(head, "ref: {}/{branch}", Self::HEADS)?;
            head.commit()?;
            branch.to_owned()
        };

        Ok(Self { root, branch })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    fn branch_path(&self) -> Utf8PathBuf {
        self.root.join(Self::HEADS).join(&self.branch)
    }

    /// The commit the branch points at, or `None` while the branch is unborn.
    pub fn read_head(&self) -> Result<Option<Digest>> {
        Self::read_ref(&self.branch_path())
    }

    fn read_ref(path: &Utf8Path) -> Result<Option<Digest>> {
        if !path.is_file() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        let contents = contents.trim();
        let oid = Digest::from_str(contents)
            .map_err(|_| Error::NotFound(format!("commit id in {path}, found {contents:?}")))?;
        Ok(Some(oid))
    }

    /// Point the branch at `oid`, creating it if it is unborn.
    ///
    /// `expected` is the value the caller based its commit on. The branch is re-read while its
    /// lock is held, and a different value fails with [`Error::InvalidParent`] so history stays
    /// linear.
    pub fn advance_branch(&self, oid: &Digest, expected: Option<&Digest>) -> Result<()> {
        let path = self.branch_path();
        let mut lock = LockedFile::acquire(&path)?;

        let current = Self::read_ref(&path)?;
        if current.as_ref() != expected {
            let describe = |oid: Option<&Digest>| oid.map_or("nothing".to_owned(), Digest::to_hex);
            return Err(Error::InvalidParent {
                branch: self.branch.clone(),
                expected: describe(expected),
                actual: describe(current.as_ref()),
            });
        }

        writeln!(lock, "{oid:x}")?;
        lock.commit()?;
        debug!(branch=%self.branch, oid=%oid.short(), "Advanced branch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use pretty_assertions::assert_eq;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_ref_names() {
        for name in ["main", "master", "feature/x", "v1.0"] {
            assert!(is_valid_ref_name(name), "{name}");
        }
        for name in ["", ".hidden", "a/.b", "a..b", "a/", "main.lock", "a@{1}", "a b", "a:b"] {
            assert!(!is_valid_ref_name(name), "{name}");
        }
    }

    #[test]
    /// A fresh root gets a symbolic HEAD and an unborn branch, which the first update creates.
    fn test_unborn_then_advance() -> Result<()> {
        let dir = TempDir::new("")?;
        let root = Utf8Path::from_path(dir.path()).expect("tempdir is utf-8");

        let refs = Refs::open(root, "main")?;
        assert_eq!(std::fs::read_to_string(root.join("HEAD"))?, "ref: refs/heads/main\n");
        assert_eq!(refs.read_head()?, None);

        let first = Digest::new(b"first");
        let second = Digest::new(b"second");
        refs.advance_branch(&first, None)?;
        assert_eq!(refs.read_head()?, Some(first.clone()));

        refs.advance_branch(&second, Some(&first))?;
        assert_eq!(refs.read_head()?, Some(second.clone()));

        // Reopening with a different default keeps the branch HEAD names.
        let reopened = Refs::open(root, "other")?;
        assert_eq!(reopened.branch(), "main");
        assert_eq!(reopened.read_head()?, Some(second));
        Ok(())
    }

    #[test]
    fn test_stale_parent_is_rejected() -> Result<()> {
        let dir = TempDir::new("")?;
        let root = Utf8Path::from_path(dir.path()).expect("tempdir is utf-8");
        let refs = Refs::open(root, "main")?;

        let first = Digest::new(b"first");
        refs.advance_branch(&first, None)?;

        let err = refs
            .advance_branch(&Digest::new(b"second"), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParent { .. }));
        assert_eq!(refs.read_head()?, Some(first));
        Ok(())
    }

    #[test]
    fn test_invalid_branch_name() -> Result<()> {
        let dir = TempDir::new("")?;
        let root = Utf8Path::from_path(dir.path()).expect("tempdir is utf-8");
        assert!(matches!(
            Refs::open(root, "bad name"),
            Err(Error::InvalidPath(_))
        ));
        Ok(())
    }

    #[test]
    /// A hand-edited `HEAD` must not point the branch outside `refs/heads`.
    fn test_escaping_head_is_rejected() -> Result<()> {
        let dir = TempDir::new("")?;
        let root = Utf8Path::from_path(dir.path()).expect("tempdir is utf-8");
        std::fs::write(root.join("HEAD"), "ref: refs/heads/../../x\n")?;

        assert!(matches!(Refs::open(root, "main"), Err(Error::InvalidPath(_))));
        assert!(!root.join("x").exists());
        Ok(())
    }
}
