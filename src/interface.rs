use camino::Utf8PathBuf;
use clap::Parser;
use clap::Subcommand;

use treestore::Digest;

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Create the store layout. Every other command does this too if needed.
    Init,

    /// Store a file at `path` and commit it.
    Write {
        /// Slash separated path inside the store.
        path: String,

        /// File to read the contents from. Standard input if omitted.
        #[clap(value_name = "file")]
        source: Option<Utf8PathBuf>,

        #[clap(short, long, env = "TREESTORE_COMMIT_MESSAGE", default_value = "auto-save")]
        message: String,
    },

    /// Commit the current head tree again, or the bootstrap tree in an empty store.
    Commit {
        #[clap(short, long, env = "TREESTORE_COMMIT_MESSAGE")]
        message: String,
    },

    /// Print the contents of `path` as of the head commit.
    Read { path: String },

    /// Print every file path in the head commit.
    List,

    /// Print every file and directory in the head commit with its metadata.
    Traverse,

    /// Print the history of the branch, newest first.
    Log,

    #[clap(subcommand)]
    CatFile(CatFile),
}

#[derive(Clone, Debug, Subcommand)]
pub enum CatFile {
    /// Exit with status `ExitCode::SUCCESS` if `object` exists and is a valid object. If
    /// `object` is of an invalid format, exit with status `ExitCode::FAILURE`, and print an
    /// error to stderr.
    #[clap(short_flag = 'e')]
    Exists {
        #[clap(value_name = "object")]
        object: Digest,
    },

    /// Pretty-print the contents of `object` based on its type
    #[clap(short_flag = 'p')]
    PrettyPrint {
        #[clap(value_name = "object")]
        object: Digest,
    },

    /// Print the type of `object` to stdout
    #[clap(short_flag = 't')]
    Type {
        #[clap(value_name = "object")]
        object: Digest,
    },

    /// Print the size of `object` to stdout
    #[clap(short_flag = 's')]
    Size {
        #[clap(value_name = "object")]
        object: Digest,
    },
}

#[derive(Debug, Parser)]
pub struct Opt {
    #[clap(subcommand)]
    pub command: Command,

    /// The store root to be used. Defaults to the current directory.
    #[clap(short = 'C', env = "TREESTORE_DIR")]
    pub path: Option<Utf8PathBuf>,

    /// Branch for a newly created store.
    #[clap(long, env = "TREESTORE_BRANCH", default_value = "main")]
    pub branch: String,

    #[clap(long, env = "TREESTORE_AUTHOR_NAME")]
    pub author_name: Option<String>,

    #[clap(long, env = "TREESTORE_AUTHOR_EMAIL")]
    pub author_email: Option<String>,
}
