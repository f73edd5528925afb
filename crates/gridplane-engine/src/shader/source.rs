use std::path::Path;

use crate::error::{GridError, GridResult};

/// Reads a shader source file as UTF-8 text.
///
/// Missing, unreadable and non-UTF-8 files all fail with `FileRead`.
pub fn load_source(path: impl AsRef<Path>) -> GridResult<String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| GridError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("loaded {} ({} bytes)", path.display(), text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join("gridplane-does-not-exist.vert");
        match load_source(&path) {
            Err(GridError::FileRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn reads_whole_file() {
        let path = std::env::temp_dir().join(format!("gridplane-src-{}.frag", std::process::id()));
        std::fs::write(&path, "#version 450\nvoid main() {}\n").unwrap();
        let text = load_source(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(text, "#version 450\nvoid main() {}\n");
    }
}
