//! Transforms an LSIF dump into a zip archive of per-document
//! code-intelligence sidecar files.
//!
//! The input is a stream of newline-delimited JSON vertex/edge records that
//! may arrive in arbitrary order. Rather than buffering the graph, each
//! record kind lands in a disk-backed store from [`lsif_store`], keyed by
//! the record's integer id; forward references are resolved by back-patching
//! id-derived file offsets. After the single ingestion pass, a single
//! serialization pass walks every known document and emits one
//! `lsif/<path>.json` zip entry with that document's resolved ranges.
//!
//! ```no_run
//! use std::fs::File;
//! use lsif_transform::{transform, TransformConfig};
//!
//! # fn main() -> lsif_transform::Result<()> {
//! let config = TransformConfig {
//!     temp_dir: std::env::temp_dir(),
//!     process_references: false,
//! };
//! let dump = std::io::BufReader::new(File::open("dump.lsif")?);
//! transform(&config, dump, File::create("sidecar.zip")?)?;
//! # Ok(())
//! # }
//! ```

mod docs;
mod error;
mod hover_content;
mod hovers;
mod id;
mod label;
mod ranges;
mod references;

use std::io::{BufRead, Seek, Write};
use std::path::PathBuf;

use zip::ZipWriter;

pub use docs::DocumentIndex;
pub use error::{Result, TransformError};
pub use hover_content::CodeHover;
pub use id::{Id, MAX_ID, MIN_ID};
pub use label::Label;
pub use ranges::{DefRef, Range};
pub use references::{ReferenceItem, SerializedReference};

/// The two knobs the transform core honors. Everything else (dump
/// acquisition, upload, serving) belongs to the caller.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Directory the disk-backed stores put their (anonymous) scratch files
    /// in.
    pub temp_dir: PathBuf,
    /// Whether to index reference lists. Off by default upstream: reference
    /// payloads dominate dump size for large projects.
    pub process_references: bool,
}

/// Run the full transform: ingest `input` line by line, then serialize every
/// document into a zip archive written to `output`.
pub fn transform<R: BufRead, W: Write + Seek>(
    config: &TransformConfig,
    input: R,
    output: W,
) -> Result<()> {
    let mut index = DocumentIndex::new(config)?;

    let mut lines = 0u64;
    for line in input.split(b'\n') {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        index.read_line(&line)?;
        lines += 1;
    }
    tracing::debug!(lines, documents = index.document_count(), "ingested lsif dump");

    let mut zip = ZipWriter::new(output);
    index.serialize(&mut zip)?;
    zip.finish()?;
    Ok(())
}
