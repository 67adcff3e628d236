//! Logical stores layered over [`Repository`].
//!
//! A namespace only decides where its repository lives and which author and message its
//! commits get by default. The kinds differ in nothing but their root segments:
//!
//! - a bucket lives at `<data dir>/<name>`
//! - a system store lives at `<data dir>/system/<child>`
//! - a member store lives at `<data dir>/fingerprint/<fingerprint>`

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::path;
use crate::repo::Repository;
use crate::storable::commit::Author;

pub const DEFAULT_MESSAGE: &str = "auto-save";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceConfig {
    pub root_segments: Vec<String>,
    pub author: Author,
    pub message: String,
}

impl NamespaceConfig {
    pub fn new<I, S>(root_segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let root_segments = root_segments.into_iter().map(Into::into).collect::<Vec<_>>();
        for segment in &root_segments {
            if path::segments(segment)? != [segment.as_str()] {
                return Err(Error::InvalidPath(segment.clone()));
            }
        }
        if root_segments.is_empty() {
            return Err(Error::InvalidPath(String::new()));
        }

        Ok(Self {
            root_segments,
            author: Author::new("treestore", "treestore@localhost"),
            message: DEFAULT_MESSAGE.to_owned(),
        })
    }

    pub fn bucket(name: &str) -> Result<Self> {
        Self::new([name])
    }

    /// `child` defaults to `core`.
    pub fn system(child: Option<&str>) -> Result<Self> {
        Self::new(["system", child.unwrap_or("core")])
    }

    pub fn member(fingerprint: &str) -> Result<Self> {
        if fingerprint.is_empty() {
            return Err(Error::InvalidPath("members require a fingerprint".to_owned()));
        }
        Self::new(["fingerprint", fingerprint])
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = author;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Where the repository lives, relative to the data directory.
    pub fn relative_path(&self) -> Utf8PathBuf {
        self.root_segments.iter().collect()
    }
}

/// The record stored for each registered key fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub email: String,
    pub fingerprint: String,
    pub parent_fingerprint: Option<String>,
}

pub struct Namespace {
    config: NamespaceConfig,
    repo: Repository,
}

impl Namespace {
    pub fn open(data_dir: impl AsRef<Utf8Path>, config: NamespaceConfig) -> Result<Self> {
        let root = data_dir.as_ref().join(config.relative_path());
        trace!(path=%root, "Opening namespace");
        let repo = Repository::open(root)?;
        Ok(Self { config, repo })
    }

    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }

    /// Write one file and commit it straight away with the default author and message.
    pub fn write_file(&mut self, name: &str, data: impl AsRef<[u8]>) -> Result<Digest> {
        self.write_file_as(name, data, None, None)
    }

    pub fn write_file_as(
        &mut self,
        name: &str,
        data: impl AsRef<[u8]>,
        message: Option<&str>,
        author: Option<&Author>,
    ) -> Result<Digest> {
        let blob = self.repo.write(name, data)?;
        self.commit(message, author)?;
        Ok(blob)
    }

    /// Commit whatever has been written through [`Namespace::repository_mut`].
    pub fn save(&mut self, message: Option<&str>) -> Result<Digest> {
        self.commit(message, None)
    }

    fn commit(&mut self, message: Option<&str>, author: Option<&Author>) -> Result<Digest> {
        let author = author.unwrap_or(&self.config.author);
        let message = message.unwrap_or(self.config.message.as_str());
        self.repo.commit(message, &author.name, &author.email)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.repo.read(name)
    }

    pub fn list(&self) -> Result<Vec<String>> {
        self.repo.list()
    }

    /// Store `fp.<fingerprint>.json` describing a key and the key that vouched for it.
    pub fn add_fingerprint(
        &mut self,
        fingerprint: &str,
        email: &str,
        parent_fingerprint: Option<&str>,
    ) -> Result<Digest> {
        let name = fingerprint_file(fingerprint)?;
        let record = FingerprintRecord {
            email: email.to_owned(),
            fingerprint: fingerprint.to_owned(),
            parent_fingerprint: parent_fingerprint.map(ToOwned::to_owned),
        };
        let data = serde_json::to_vec_pretty(&record)?;
        debug!(%fingerprint, "Registering fingerprint");
        self.write_file(&name, data)
    }

    pub fn fingerprint(&self, fingerprint: &str) -> Result<FingerprintRecord> {
        let data = self.read(&fingerprint_file(fingerprint)?)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Every registered fingerprint, ordered by file name.
    pub fn fingerprints(&self) -> Result<Vec<FingerprintRecord>> {
        self.list()?
            .iter()
            .filter(|name| {
                !name.contains('/') && name.starts_with("fp.") && name.ends_with(".json")
            })
            .map(|name| -> Result<FingerprintRecord> {
                Ok(serde_json::from_slice(&self.read(name)?)?)
            })
            .collect()
    }
}

/// `fp.<fingerprint>.json`, provided the fingerprint is a single path segment.
fn fingerprint_file(fingerprint: &str) -> Result<String> {
    if fingerprint.is_empty() || path::segments(fingerprint)? != [fingerprint] {
        return Err(Error::InvalidPath(format!("fingerprint {fingerprint:?}")));
    }
    Ok(format!("fp.{fingerprint}.json"))
}
