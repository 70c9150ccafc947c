pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced by the disk-backed record stores.
///
/// All of these indicate a disk or descriptor problem, not a data problem;
/// callers are expected to abort the surrounding transform rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record list of {len} items does not fit the side index")]
    OversizedList { len: usize },

    #[error("payload file exceeds the 4 GiB addressable by side-index offsets")]
    PayloadOverflow,
}
