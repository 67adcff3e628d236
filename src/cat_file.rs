use std::io::Write;
use std::process::exit;

use treestore::storable::Storable;
use treestore::{Digest, Error, LoadedItem, Repository};

use crate::interface::CatFile;
use crate::Result;

pub fn handle(repo: &Repository, args: &CatFile) -> Result<()> {
    let database = repo.database();
    match args {
        CatFile::Exists { object } => match database.load(object) {
            Ok(_) => Ok(()),
            Err(Error::NotFound(_)) => {
                eprintln!("Object does not exist: {:x}", object);
                exit(1);
            }
            Err(e) => {
                eprintln!("Object is corrupt: {:x}: {e}", object);
                exit(1);
            }
        },
        CatFile::PrettyPrint { object } => pretty_print(&database.load(object)?),
        CatFile::Type { object } => {
            println!("{}", database.load(object)?.kind());
            Ok(())
        }
        CatFile::Size { object } => {
            println!("{}", payload(&database.load(object)?).len());
            Ok(())
        }
    }
}

fn payload(item: &LoadedItem) -> Vec<u8> {
    match item {
        LoadedItem::Blob(blob) => blob.payload(),
        LoadedItem::Tree(tree) => tree.payload(),
        LoadedItem::Commit(commit) => commit.payload(),
    }
}

fn pretty_print(item: &LoadedItem) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match item {
        LoadedItem::Tree(tree) => {
            for (name, entry) in tree.entries() {
                let kind = if entry.is_tree() { "tree" } else { "blob" };
                let mode = std::str::from_utf8(entry.kind().mode())?;
                writeln!(stdout, "{mode:0>6} {kind} {:x}\t{name}", entry.oid())?;
            }
        }
        // Blobs and commits are printed as stored.
        other => stdout.write_all(&payload(other))?,
    }
    stdout.flush()?;
    Ok(())
}

/// Print a short description of one commit, as shown by `log`.
pub fn print_commit(oid: &Digest, commit: &treestore::Commit) {
    println!("commit {:x}", oid);
    println!("Author: {} <{}>", commit.author().name, commit.author().email);
    println!("Date:   {}", commit.when().0.to_rfc2822());
    println!();
    for line in commit.message().lines() {
        println!("    {line}");
    }
    println!();
}
