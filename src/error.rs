use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MdMergeError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template '{name}' has no heading sections")]
    EmptyTemplate { name: String },
}
