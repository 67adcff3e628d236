use std::collections::BTreeMap;

use crate::digest::Digest;
use crate::storable::Storable;

/// What a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
}

impl EntryKind {
    const BLOB_MODE: &'static [u8] = b"100644";
    const TREE_MODE: &'static [u8] = b"40000";

    /// The octal mode written in front of the entry name.
    pub fn mode(self) -> &'static [u8] {
        match self {
            EntryKind::Blob => Self::BLOB_MODE,
            EntryKind::Tree => Self::TREE_MODE,
        }
    }

    /// Executable files and symlinks are read back as plain blobs.
    fn from_mode(mode: &[u8]) -> Option<Self> {
        match mode {
            b"40000" | b"040000" => Some(EntryKind::Tree),
            b"100644" | b"100755" | b"100664" | b"120000" => Some(EntryKind::Blob),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    oid: Digest,
    kind: EntryKind,
}

impl TreeEntry {
    pub fn new(oid: Digest, kind: EntryKind) -> Self {
        Self { oid, kind }
    }

    pub fn oid(&self) -> &Digest {
        &self.oid
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_tree(&self) -> bool {
        self.kind == EntryKind::Tree
    }
}

/// A sealed directory listing. Names are unique because entries live in a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    pub fn new(entries: BTreeMap<String, TreeEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, TreeEntry> {
        &self.entries
    }

    pub fn into_entries(self) -> BTreeMap<String, TreeEntry> {
        self.entries
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the payload of a tree object. Entries are of the form
    /// `<mode> <name>\0<20 byte oid>`.
    pub fn parse(mut bytes: &[u8]) -> Result<Self, String> {
        let mut entries = BTreeMap::new();

        while !bytes.is_empty() {
            let space_idx = memchr::memchr(b' ', bytes).ok_or("tree entry has no mode")?;
            let nul_idx = memchr::memchr(b'\0', bytes).ok_or("tree entry has no name")?;
            if nul_idx < space_idx || bytes.len() < nul_idx + 1 + Digest::LEN {
                return Err("truncated tree entry".into());
            }

            let mode = &bytes[..space_idx];
            let kind = EntryKind::from_mode(mode).ok_or_else(|| {
                format!("unsupported entry mode {}", String::from_utf8_lossy(mode))
            })?;
            let name = std::str::from_utf8(&bytes[space_idx + 1..nul_idx])
                .map_err(|_| "invalid utf-8 in tree entry name")?
                .to_owned();
            let oid = Digest::from_raw(&bytes[nul_idx + 1..nul_idx + 1 + Digest::LEN])
                .ok_or("truncated tree entry oid")?;

            if entries.insert(name, TreeEntry::new(oid, kind)).is_some() {
                return Err("duplicate tree entry".into());
            }
            bytes = &bytes[nul_idx + 1 + Digest::LEN..];
        }

        Ok(Self { entries })
    }
}

impl Storable for Tree {
    const KIND: &'static str = "tree";

    /// Entries are ordered the way git orders them: by name, with subtrees compared as if their
    /// name ended in `/`. The map's own order only differs from that for names sharing a prefix.
    fn payload(&self) -> Vec<u8> {
        let mut sorted = self.entries.iter().collect::<Vec<_>>();
        sorted.sort_by_cached_key(|(name, entry)| {
            let mut key = name.as_bytes().to_vec();
            if entry.is_tree() {
                key.push(b'/');
            }
            key
        });

        let mut data = Vec::new();
        for (name, entry) in sorted {
            data.extend_from_slice(entry.kind.mode());
            data.push(b' ');
            data.extend_from_slice(name.as_bytes());
            data.push(b'\0');
            data.extend_from_slice(&*entry.oid);
        }
        data
    }
}
