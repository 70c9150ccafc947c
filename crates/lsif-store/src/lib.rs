//! Disk-backed record stores for external-memory indexing.
//!
//! Two storage primitives keyed by a `u32` slot number:
//! - [`FixedRecordStore`]: a sparse array of fixed-size records at
//!   `slot * record_size`, supporting partial-field patch writes.
//! - [`DynamicRecordStore`]: variable-length record lists, backed by an
//!   append-only payload file plus a [`FixedRecordStore`] side index of
//!   `(at, len)` entries.
//!
//! Both are backed by anonymous temp files (`tempfile::tempfile_in`), so the
//! storage never outlives the process and no cleanup is needed on crash.
//!
//! ## Compatibility limitations
//! Record layouts are little-endian regardless of host byte order, but the
//! backing files are private to a single transform run and are never
//! exchanged between processes.

mod dynamic;
mod error;
mod fixed;
mod record;

pub use dynamic::DynamicRecordStore;
pub use error::{Result, StoreError};
pub use fixed::FixedRecordStore;
pub use record::{Offset, Record};
