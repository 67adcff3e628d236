use pretty_assertions::assert_eq;

use crate::test::{scratch_repo, utf8_root, COMMIT_EMAIL, COMMIT_NAME};
use crate::*;

#[test]
/// Committing an empty store produces one parentless commit holding only the README.
fn empty_repository_bootstrap() -> color_eyre::Result<()> {
    let (dir, mut repo) = scratch_repo()?;
    assert_eq!(repo.head()?, None);

    let oid = repo.commit("init", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_eq!(repo.head()?, Some(oid.clone()));

    let commits = repo.log()?.collect::<crate::Result<Vec<_>>>()?;
    assert_eq!(commits.len(), 1);
    let (log_oid, commit) = &commits[0];
    assert_eq!(log_oid, &oid);
    assert_eq!(commit.parent(), None);
    assert_eq!(commit.message(), "init");

    let tree = repo.database().load_tree(commit.tree_id())?;
    assert_eq!(tree.entries().keys().collect::<Vec<_>>(), ["README"]);
    assert_eq!(repo.list()?, ["README"]);

    let name = utf8_root(&dir).file_name().expect("tempdir has a name").to_owned();
    assert_eq!(
        String::from_utf8(repo.read("README")?)?,
        format!("initial commit for {name}")
    );
    Ok(())
}

#[test]
/// The bootstrap only applies to the first commit; staged writes replace it entirely.
fn first_commit_with_content_has_no_readme() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    crate::write_files!(repo, ["hello.md"]);
    repo.commit("first", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_eq!(repo.list()?, ["hello.md"]);
    Ok(())
}

#[test]
/// Every commit's parent is the commit before it, and only the first has none.
fn commit_chain_is_linear() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    let mut created = Vec::new();
    for i in 0..4 {
        repo.write(&format!("file{i}"), format!("contents {i}"))?;
        created.push(repo.commit(&format!("commit {i}"), COMMIT_NAME, COMMIT_EMAIL)?);
    }

    let log = repo.log()?.collect::<crate::Result<Vec<_>>>()?;
    let logged = log.iter().map(|(oid, _)| oid.clone()).rev().collect::<Vec<_>>();
    assert_eq!(logged, created);

    for (n, (_, commit)) in log.iter().rev().enumerate() {
        let expected = n.checked_sub(1).map(|parent| &created[parent]);
        assert_eq!(commit.parent(), expected);
        assert_eq!(commit.message(), format!("commit {n}"));
        assert_eq!(commit.author(), &Author::new(COMMIT_NAME, COMMIT_EMAIL));
    }
    Ok(())
}

#[test]
/// A commit with nothing staged snapshots the head tree again on top of the head.
fn commit_without_writes() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;

    crate::write_files!(repo, ["hello.md"]);
    let first = repo.commit("first", COMMIT_NAME, COMMIT_EMAIL)?;
    let second = repo.commit("again", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_ne!(first, second);

    let first = repo.database().load_commit(&first)?;
    let second_commit = repo.database().load_commit(&second)?;
    assert_eq!(second_commit.tree_id(), first.tree_id());
    assert_eq!(repo.head()?, Some(second));
    Ok(())
}

#[test]
fn commit_of_unknown_tree() -> color_eyre::Result<()> {
    let (_dir, mut repo) = scratch_repo()?;
    let author = Author::new(COMMIT_NAME, COMMIT_EMAIL);

    let missing = Digest::new(b"no such tree");
    assert!(matches!(
        repo.commit_tree(&missing, author.clone(), "bad"),
        Err(Error::InvalidTree(_))
    ));

    let blob = repo.write("hello.md", "hello")?;
    assert!(matches!(
        repo.commit_tree(&blob, author, "bad"),
        Err(Error::InvalidTree(_))
    ));
    assert_eq!(repo.head()?, None);
    Ok(())
}

#[test]
/// The branch file holds the head commit id and `HEAD` names the branch.
fn branch_reference_on_disk() -> color_eyre::Result<()> {
    let (dir, mut repo) = scratch_repo()?;
    let root = utf8_root(&dir);
    assert!(!root.join("refs/heads/main").exists());

    let oid = repo.commit("init", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_eq!(
        std::fs::read_to_string(root.join("refs/heads/main"))?,
        format!("{oid:x}\n")
    );
    assert_eq!(std::fs::read_to_string(root.join("HEAD"))?, "ref: refs/heads/main\n");
    assert!(!root.join("refs/heads/main.lock").exists());
    Ok(())
}

#[test]
/// A held branch lock fails the commit and leaves the branch and the staged writes alone.
fn locked_branch() -> color_eyre::Result<()> {
    let (dir, mut repo) = scratch_repo()?;
    let root = utf8_root(&dir);

    let first = repo.commit("init", COMMIT_NAME, COMMIT_EMAIL)?;
    repo.write("hello.md", "hello")?;

    std::fs::write(root.join("refs/heads/main.lock"), "")?;
    assert!(matches!(
        repo.commit("blocked", COMMIT_NAME, COMMIT_EMAIL),
        Err(Error::Locked(_))
    ));
    assert_eq!(repo.head()?, Some(first));
    assert!(repo.is_staged());

    std::fs::remove_file(root.join("refs/heads/main.lock"))?;
    repo.commit("unblocked", COMMIT_NAME, COMMIT_EMAIL)?;
    assert_eq!(repo.read("hello.md")?, b"hello");
    Ok(())
}
