use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use crate::test::{scratch_repo, utf8_root, COMMIT_EMAIL, COMMIT_NAME};
use crate::*;

#[test]
/// Write three files, commit once, and list them back.
fn list_after_single_commit() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    crate::write_files!(repo, ["hello.md", "todo/plan.md", "todo/backlog.md"]);
    repo.commit("add files", COMMIT_NAME, COMMIT_EMAIL)?;

    let listed = repo.list()?.into_iter().collect::<BTreeSet<_>>();
    let expected = ["hello.md", "todo/plan.md", "todo/backlog.md"]
        .map(String::from)
        .into_iter()
        .collect::<BTreeSet<_>>();
    assert_eq!(listed, expected);
    Ok(())
}

#[test]
fn round_trip() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    let cases: [(&str, &[u8]); 4] = [
        ("f", b"plain"),
        ("a/b/c/d/e.txt", b"deeply nested\n"),
        ("binary.bin", &[0, 159, 146, 150, 0, 255]),
        ("./dotted//path.md", b"normalised"),
    ];
    for (path, data) in cases {
        repo.write(path, data)?;
    }
    repo.commit("round trip", COMMIT_NAME, COMMIT_EMAIL)?;

    for (path, data) in cases {
        assert_eq!(repo.read(path)?, data);
    }
    assert_eq!(repo.read("dotted/path.md")?, b"normalised");
    Ok(())
}

#[test]
/// Reads see the head commit only, never staged writes.
fn pending_writes_are_invisible() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    repo.write("f", "C1")?;
    assert!(repo.read("f").unwrap_err().is_not_found());
    assert_eq!(repo.list()?, Vec::<String>::new());

    repo.commit("C1", COMMIT_NAME, COMMIT_EMAIL)?;
    repo.write("f", "C2")?;
    assert_eq!(repo.read("f")?, b"C1");

    repo.commit("C2", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_eq!(repo.read("f")?, b"C2");
    Ok(())
}

#[test]
fn overwrite_file_and_directory() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    repo.write("f", "C1")?;
    repo.write("f", "C2")?;
    repo.write("dir/inner.md", "inner")?;
    repo.commit("setup", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_eq!(repo.read("f")?, b"C2");
    assert_eq!(repo.list()?, ["dir/inner.md", "f"]);

    repo.write("dir", "now a file")?;
    repo.commit("replace dir", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_eq!(repo.read("dir")?, b"now a file");
    assert!(repo.read("dir/inner.md").unwrap_err().is_not_found());
    assert_eq!(repo.list()?, ["dir", "f"]);
    Ok(())
}

#[test]
/// A second write below `a` keeps the blob of the first.
fn subtree_reuse_across_commits() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    let x = repo.write("a/x", "x")?;
    repo.commit("x", COMMIT_NAME, COMMIT_EMAIL)?;
    repo.write("a/y", "y")?;
    repo.commit("y", COMMIT_NAME, COMMIT_EMAIL)?;

    let head = repo.head_commit()?.expect("branch has a head");
    let root = repo.database().load_tree(head.tree_id())?;
    let a = repo.database().load_tree(root.get("a").expect("a is stored").oid())?;
    assert_eq!(a.len(), 2);
    assert_eq!(a.get("x").map(TreeEntry::oid), Some(&x));
    Ok(())
}

#[test]
fn unknown_and_mistyped_paths() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;
    assert!(repo.read("missing").unwrap_err().is_not_found());

    crate::write_files!(repo, ["hello.md", "todo/plan.md"]);
    repo.commit("files", COMMIT_NAME, COMMIT_EMAIL)?;

    for path in ["missing", "todo", "hello.md/child", "todo/missing", "nope/plan.md"] {
        assert!(
            repo.read(path).unwrap_err().is_not_found(),
            "{path} should not be found"
        );
    }
    Ok(())
}

#[test]
fn invalid_paths() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    for path in ["", "/", ".", "a/../b"] {
        assert!(matches!(repo.write(path, "x"), Err(Error::InvalidPath(_))));
        assert!(matches!(repo.read(path), Err(Error::InvalidPath(_))));
    }
    assert!(!repo.is_staged());
    Ok(())
}

#[test]
/// Identical content written at different paths is one object.
fn identical_content_is_deduplicated() -> color_eyre::Result<()> {
    let (dir, mut repo) = scratch_repo()?;

    let first = repo.write("one.md", "same")?;
    let second = repo.write("nested/two.md", "same")?;
    assert_eq!(first, second);
    assert_ne!(first, repo.write("three.md", "different")?);

    let hex = first.to_hex();
    let object = utf8_root(&dir).join("objects").join(&hex[..2]).join(&hex[2..]);
    assert!(object.is_file());
    Ok(())
}

#[test]
/// Committed content survives dropping the repository and opening the root again.
fn persists_across_reopen() -> color_eyre::Result<()> {
    let (dir, mut repo) = scratch_repo()?;

    crate::write_files!(repo, ["hello.md", "todo/plan.md"]);
    let head = repo.commit("files", COMMIT_NAME, COMMIT_EMAIL)?;
    repo.write("uncommitted.md", "lost")?;
    drop(repo);

    let mut repo = Repository::open(utf8_root(&dir))?;
    assert_eq!(repo.head()?, Some(head.clone()));
    assert_eq!(repo.read("todo/plan.md")?, b"todo/plan.md-contents\n");
    assert_eq!(repo.list()?, ["hello.md", "todo/plan.md"]);

    // The next write is seeded from the stored head.
    repo.write("todo/backlog.md", "backlog")?;
    repo.commit("backlog", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_eq!(
        repo.list()?,
        ["hello.md", "todo/backlog.md", "todo/plan.md"]
    );
    Ok(())
}
