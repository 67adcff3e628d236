use std::fmt::Write as _;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::digest::Digest;
use crate::storable::Storable;
use crate::timestamp::Timestamp;

/// Who wrote a commit. Author and committer are always the same person here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    /// `<`, `>` and newlines would break the signature line, so they are dropped.
    pub fn new(name: impl AsRef<str>, email: impl AsRef<str>) -> Self {
        fn clean(s: &str) -> String {
            s.chars()
                .filter(|c| !matches!(c, '<' | '>' | '\n' | '\r'))
                .collect::<String>()
                .trim()
                .to_owned()
        }
        Self {
            name: clean(name.as_ref()),
            email: clean(email.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub author: Author,
    pub when: Timestamp,
}

impl Signature {
    /// Parse a signature line from a commit.
    ///
    /// ## Example
    /// `author Jamie Quigley <jamie@quigley.xyz> 1658312219 +0100`
    fn parse(line: &str) -> Result<Self, String> {
        static REGEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^(?:author|committer) (.*) <(.*)> (-?\d+ [+-]\d{4})$")
                .expect("signature regex is valid")
        });

        let groups = REGEX
            .captures(line)
            .ok_or_else(|| format!("invalid signature line: {line}"))?;

        Ok(Self {
            author: Author {
                name: groups[1].to_owned(),
                email: groups[2].to_owned(),
            },
            when: Timestamp::from_git(&groups[3])?,
        })
    }

    fn write_line(&self, out: &mut String, header: &str) {
        let _ = writeln!(
            out,
            "{header} {} <{}> {}",
            self.author.name, self.author.email, self.when
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    tree_id: Digest,
    parent: Option<Digest>,
    author: Signature,
    committer: Signature,
    message: String,
}

impl Commit {
    pub fn new(parent: Option<Digest>, tree_id: Digest, author: Author, message: &str) -> Self {
        let author = Signature {
            author,
            when: Timestamp::now(),
        };
        let committer = author.clone();

        Self {
            tree_id,
            parent,
            author,
            committer,
            message: message.to_owned(),
        }
    }

    pub fn tree_id(&self) -> &Digest {
        &self.tree_id
    }

    pub fn parent(&self) -> Option<&Digest> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Author {
        &self.author.author
    }

    pub fn when(&self) -> &Timestamp {
        &self.author.when
    }

    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// Parse the payload of a commit object.
    ///
    /// ## Example
    /// ```text
    /// tree 090c4c5dd61d2e84c832c4cd306b66bf2fabc1f5
    /// parent e6a49274aa0893ce2e2928589100387aee220c5b
    /// author Jamie Quigley <jamie@quigley.xyz> 1658312219 +0100
    /// committer Jamie Quigley <jamie@quigley.xyz> 1658312219 +0100
    ///
    /// Add the backlog
    /// ```
    ///
    /// Headers this store never writes (`gpgsig`, `encoding`, ...) are skipped. A second
    /// `parent` line is rejected since history here is strictly linear.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let text = std::str::from_utf8(bytes).map_err(|_| "commit is not valid utf-8")?;
        let (header, message) = text.split_once("\n\n").unwrap_or((text, ""));

        let mut tree_id = None;
        let mut parent = None;
        let mut author = None;
        let mut committer = None;

        for line in header.lines() {
            if let Some(oid) = line.strip_prefix("tree ") {
                tree_id = Some(Digest::from_str(oid).map_err(|e| format!("bad tree id: {e}"))?);
            } else if let Some(oid) = line.strip_prefix("parent ") {
                if parent.is_some() {
                    return Err("merge commits are not supported".into());
                }
                parent = Some(Digest::from_str(oid).map_err(|e| format!("bad parent id: {e}"))?);
            } else if line.starts_with("author ") {
                author = Some(Signature::parse(line)?);
            } else if line.starts_with("committer ") {
                committer = Some(Signature::parse(line)?);
            }
        }

        let author = author.ok_or("commit has no author")?;
        Ok(Self {
            tree_id: tree_id.ok_or("commit has no tree")?,
            parent,
            committer: committer.unwrap_or_else(|| author.clone()),
            author,
            message: message.strip_suffix('\n').unwrap_or(message).to_owned(),
        })
    }
}

impl Storable for Commit {
    const KIND: &'static str = "commit";

    fn payload(&self) -> Vec<u8> {
        let mut data = format!("tree {:x}\n", self.tree_id);
        if let Some(parent) = &self.parent {
            let _ = writeln!(data, "parent {parent:x}");
        }
        self.author.write_line(&mut data, "author");
        self.committer.write_line(&mut data, "committer");
        data.push('\n');
        data.push_str(&self.message);
        data.push('\n');
        data.into_bytes()
    }
}
