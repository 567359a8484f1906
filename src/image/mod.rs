//! Image insertion.
//!
//! The dialog collects either a URL, used verbatim, or a local file path that
//! is encoded into a `data:` URL on a worker thread.

mod dialog;
mod encode;

pub use dialog::{DialogField, ImageDialog, ImageSource, ImageTab, Submission};
pub use encode::{encode_bytes, encode_file, mime_type};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image encoder stopped before finishing")]
    Disconnected,
}
