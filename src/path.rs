use crate::error::{Error, Result};

/// Split a slash separated path into the names used inside trees.
///
/// Empty and `.` segments are skipped, so `./todo//plan.md` is `["todo", "plan.md"]`.
pub fn segments(path: &str) -> Result<Vec<&str>> {
    let mut out = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(Error::InvalidPath(path.to_owned())),
            s if s.contains('\0') => return Err(Error::InvalidPath(path.to_owned())),
            s => out.push(s),
        }
    }

    if out.is_empty() {
        return Err(Error::InvalidPath(path.to_owned()));
    }
    Ok(out)
}

pub fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}
