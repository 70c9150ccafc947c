pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors that abort an LSIF transform.
///
/// A malformed line or invalid id is fatal by design: ids are structural
/// keys into fixed-offset files, so skipping a bad record could silently
/// corrupt an adjacent slot. Lookup misses are not errors and never surface
/// here.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("invalid dump line: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dump line is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("store error: {0}")]
    Store(#[from] lsif_store::StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
