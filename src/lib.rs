//! A versioned, content addressed store of files at slash separated paths.
//!
//! Writes are staged in a [`Repository`] and sealed into commits that form a single linear
//! history. Objects use git's loose object format and layout, so a store root can be inspected
//! with `git --git-dir <root>`.

#[cfg(test)]
mod test;

mod builder;
pub mod database;
pub mod digest;
mod error;
mod lock;
pub mod namespace;
mod path;
pub mod refs;
mod repo;
pub mod storable;
mod timestamp;
mod util;

pub use builder::TreeBuilder;
pub use database::{Database, LoadedItem};
pub use digest::Digest;
pub use error::{Error, Result};
pub use namespace::{FingerprintRecord, Namespace, NamespaceConfig};
pub use repo::{Log, NodeInfo, Options, Repository, Traverse};
pub use storable::commit::{Author, Commit};
pub use storable::tree::{EntryKind, Tree, TreeEntry};
pub use timestamp::Timestamp;
