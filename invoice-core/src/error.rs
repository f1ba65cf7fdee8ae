use std::io;

use thiserror::Error;

/// Error type for invoice rendering and the underlying PDF canvas.
///
/// `generate` either returns the complete byte stream or one of these —
/// never a truncated document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// `open_page` was asked for a page that does not exist (1-based).
    #[error("page {requested} out of range (document has {available})")]
    PageOutOfRange { requested: usize, available: usize },

    #[error("image error: {0}")]
    Image(String),

    /// A numeric field that drives rendering is NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}
