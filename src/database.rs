use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::storable::blob::Blob;
use crate::storable::commit::Commit;
use crate::storable::tree::Tree;
use crate::storable::{DatabaseObject, Storable};
use crate::util;

use std::io::{ErrorKind, Read, Write};

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::*;

/// Content addressed object storage: one zlib compressed file per object under `objects/`.
pub struct Database {
    database_root: Utf8PathBuf,
}

impl Database {
    pub fn new(root: impl AsRef<Utf8Path>) -> Self {
        Self {
            database_root: root.as_ref().join("objects"),
        }
    }

    /// Write an object if it is not stored yet. Returns its id either way.
    pub fn store<T: Storable>(&self, obj: &T) -> Result<Digest> {
        let obj = DatabaseObject::new(obj);
        self.write_object(&obj)?;
        Ok(obj.into_oid())
    }

    /// Store raw bytes as a blob.
    pub fn put(&self, data: &[u8]) -> Result<Digest> {
        self.store(&Blob::new(data.to_vec()))
    }

    /// Read back the contents of a blob.
    pub fn get(&self, oid: &Digest) -> Result<Vec<u8>> {
        self.load_blob(oid).map(Blob::into_data)
    }

    fn write_object<T: Storable>(&self, obj: &DatabaseObject<T>) -> Result<()> {
        let object_path = self.object_path(obj.oid());

        if object_path.exists() {
            trace!(oid=%obj.oid().short(), kind=T::KIND, "Object already stored");
            return Ok(());
        }
        trace!(oid=%obj.oid().short(), kind=T::KIND, "Writing object to database");

        let dirname = object_path
            .parent()
            .ok_or_else(|| Error::NotFound(format!("parent of {object_path}")))?;

        if !dirname.is_dir() {
            std::fs::create_dir_all(dirname)?;
        }

        let temp_path = dirname.join(util::tmp_file_name());

        let content = obj.formatted();
        let mut e = ZlibEncoder::new(Vec::with_capacity(content.len()), Compression::fast());
        e.write_all(content)?;
        let compressed_bytes = e.finish()?;

        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&compressed_bytes)?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(temp_path, object_path)?;

        Ok(())
    }

    fn object_path(&self, oid: &Digest) -> Utf8PathBuf {
        let oid = oid.to_hex();
        let (prefix, suffix) = oid.split_at(2);
        self.database_root.join(prefix).join(suffix)
    }

    pub fn exists(&self, oid: &Digest) -> bool {
        self.object_path(oid).exists()
    }

    /// Read and decompress an object, header included.
    pub fn read_to_vec(&self, oid: &Digest) -> Result<Vec<u8>> {
        trace!(oid=%oid.short(), "Reading object from database");

        let compressed = match std::fs::read(self.object_path(oid)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("object {oid:x}")))
            }
            Err(e) => return Err(e.into()),
        };

        let mut decompressed = Vec::new();
        ZlibDecoder::new(&*compressed)
            .read_to_end(&mut decompressed)
            .map_err(|e| Error::corrupt(oid, e.to_string()))?;

        Ok(decompressed)
    }

    pub fn load(&self, oid: &Digest) -> Result<LoadedItem> {
        let mut bytes = self.read_to_vec(oid)?;

        let space_idx =
            memchr::memchr(b' ', &bytes).ok_or_else(|| Error::corrupt(oid, "no type in header"))?;
        let nul_idx = memchr::memchr(b'\0', &bytes)
            .filter(|&nul_idx| nul_idx > space_idx)
            .ok_or_else(|| Error::corrupt(oid, "unterminated header"))?;

        let len = std::str::from_utf8(&bytes[space_idx + 1..nul_idx])
            .ok()
            .and_then(|len| len.parse::<usize>().ok())
            .ok_or_else(|| Error::corrupt(oid, "invalid length in header"))?;
        let content_start = nul_idx + 1;
        if bytes.len() - content_start != len {
            return Err(Error::corrupt(oid, "length does not match header"));
        }

        match &bytes[..space_idx] {
            b"blob" => {
                bytes.drain(..content_start);
                Ok(LoadedItem::Blob(Blob::new(bytes)))
            }
            b"tree" => Tree::parse(&bytes[content_start..])
                .map(LoadedItem::Tree)
                .map_err(|reason| Error::corrupt(oid, reason)),
            b"commit" => Commit::parse(&bytes[content_start..])
                .map(LoadedItem::Commit)
                .map_err(|reason| Error::corrupt(oid, reason)),
            other => Err(Error::corrupt(
                oid,
                format!("unexpected object type {}", String::from_utf8_lossy(other)),
            )),
        }
    }

    pub fn load_blob(&self, oid: &Digest) -> Result<Blob> {
        self.load(oid)?
            .into_blob()
            .ok_or_else(|| Error::NotFound(format!("blob {oid:x}")))
    }

    pub fn load_tree(&self, oid: &Digest) -> Result<Tree> {
        self.load(oid)?
            .into_tree()
            .ok_or_else(|| Error::NotFound(format!("tree {oid:x}")))
    }

    pub fn load_commit(&self, oid: &Digest) -> Result<Commit> {
        self.load(oid)?
            .into_commit()
            .ok_or_else(|| Error::NotFound(format!("commit {oid:x}")))
    }
}

#[derive(Debug)]
pub enum LoadedItem {
    Commit(Commit),
    Tree(Tree),
    Blob(Blob),
}

impl LoadedItem {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Commit(_) => Commit::KIND,
            Self::Tree(_) => Tree::KIND,
            Self::Blob(_) => Blob::KIND,
        }
    }

    pub fn into_commit(self) -> Option<Commit> {
        if let Self::Commit(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        if let Self::Tree(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn into_blob(self) -> Option<Blob> {
        if let Self::Blob(v) = self {
            Some(v)
        } else {
            None
        }
    }
}
