mod cat_file;
mod interface;

use std::io::Read;

use camino::Utf8PathBuf;
use color_eyre::eyre::{eyre, Context};
pub use color_eyre::Result;

use crate::interface::*;
use treestore::{NodeInfo, Options, Repository};

use clap::Parser;
use once_cell::sync::Lazy;
use tracing_subscriber::prelude::*;

static ARGS: Lazy<Opt> = Lazy::new(Opt::parse);

fn author() -> Result<(&'static str, &'static str)> {
    let name = ARGS.author_name.as_deref().ok_or_else(|| {
        eyre!("No author name: pass --author-name or set TREESTORE_AUTHOR_NAME")
    })?;
    let email = ARGS.author_email.as_deref().ok_or_else(|| {
        eyre!("No author email: pass --author-email or set TREESTORE_AUTHOR_EMAIL")
    })?;
    Ok((name, email))
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    Lazy::force(&ARGS);

    let path = match ARGS.path {
        Some(ref path) => path.to_owned(),
        None => Utf8PathBuf::try_from(std::env::current_dir()?)
            .wrap_err("Current directory is not valid UTF-8")?,
    };

    let options = Options {
        branch: ARGS.branch.clone(),
    };
    let mut repo = match ARGS.command {
        Command::Init => Repository::init_with(&path, &options),
        _ => Repository::open_with(&path, &options),
    }
    .wrap_err(format!("Could not open store at '{path}'"))?;

    match &ARGS.command {
        Command::Init => {
            println!("Initialised store in {} on branch {}", repo.root(), repo.branch());
        }
        Command::Write {
            path,
            source,
            message,
        } => {
            let data = match source {
                Some(source) => {
                    std::fs::read(source).wrap_err(format!("Could not read '{source}'"))?
                }
                None => {
                    let mut data = Vec::new();
                    std::io::stdin().lock().read_to_end(&mut data)?;
                    data
                }
            };
            let (name, email) = author()?;
            let blob_id = repo.write(path, data)?;
            let commit_id = repo.commit(message, name, email)?;
            println!("Wrote {} as {}", path, blob_id.short());
            println!("Created commit {}", commit_id.to_hex());
        }
        Command::Commit { message } => {
            let (name, email) = author()?;
            let commit_id = repo.commit(message, name, email)?;
            println!("Created commit {}", commit_id.to_hex());
        }
        Command::Read { path } => {
            let data = repo.read(path)?;
            std::io::Write::write_all(&mut std::io::stdout().lock(), &data)?;
        }
        Command::List => {
            for path in repo.list()? {
                println!("{path}");
            }
        }
        Command::Traverse => {
            for node in repo.traverse()? {
                let (path, info) = node?;
                match info {
                    NodeInfo::Tree { entries } => {
                        println!("{} {entries:>8}      {path}/", info.kind())
                    }
                    NodeInfo::Blob { size, is_binary } => println!(
                        "{} {size:>8} {} {path}",
                        info.kind(),
                        if is_binary { "bin " } else { "text" }
                    ),
                }
            }
        }
        Command::Log => {
            for entry in repo.log()? {
                let (oid, commit) = entry?;
                cat_file::print_commit(&oid, &commit);
            }
        }
        Command::CatFile(args) => cat_file::handle(&repo, args)?,
    }
    Ok(())
}
