use std::io::Write;
use std::path::Path;

use crate::error::MdMergeError;

pub fn read_text(path: &Path) -> Result<String, MdMergeError> {
    std::fs::read_to_string(path).map_err(|source| MdMergeError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `text` to `path`, or to stdout when no path is given. A trailing
/// newline is added so files end cleanly.
pub fn write_text_or_print(path: Option<&Path>, text: &str) -> Result<(), MdMergeError> {
    match path {
        Some(p) => std::fs::write(p, format!("{}\n", text)).map_err(|source| MdMergeError::Write {
            path: p.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text).map_err(|source| MdMergeError::Write {
                path: "<stdout>".into(),
                source,
            })
        }
    }
}
