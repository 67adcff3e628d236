mod commit;
mod write;

use camino::Utf8PathBuf;
use tempdir::TempDir;

use crate::Repository;

pub const COMMIT_NAME: &str = "John Doe";
pub const COMMIT_EMAIL: &str = "john@doe.com";

/// A repository in a fresh temporary directory. Keep the `TempDir` alive for the whole test.
pub fn scratch_repo() -> color_eyre::Result<(TempDir, Repository)> {
    let dir = TempDir::new("treestore")?;
    let repo = Repository::open(utf8_root(&dir))?;
    Ok((dir, repo))
}

pub fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_owned()).expect("tempdir is utf-8")
}

#[macro_export]
macro_rules! write_files {
    ($repo:ident, [$($path:literal),*]) => {{
        $(
            $repo.write($path, concat!($path, "-contents\n"))?;
        )*
    }};
}
