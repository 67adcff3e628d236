use rand::distributions::Alphanumeric;
use rand::prelude::*;

/// A random name for an object being written, renamed into place once complete.
pub fn tmp_file_name() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("tmp_obj_{suffix}")
}
