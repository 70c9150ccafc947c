use std::path::Path;

use lsif_store::DynamicRecordStore;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::Result;
use crate::hover_content;
use crate::id::Id;

/// Hover blobs keyed by result-set id.
///
/// A `hoverResult` vertex stores its normalized contents under its own id.
/// The `textDocument/hover` and `textDocument/references` edges then alias
/// that slot onto result-set-shaped ids, so serialization can resolve hover
/// text directly from a range's `ref_id` with no further indirection.
pub struct HoverIndex {
    blobs: DynamicRecordStore<u8>,
}

#[derive(Deserialize)]
struct HoverResultLine<'a> {
    id: Id,
    #[serde(borrow)]
    result: HoverResult<'a>,
}

#[derive(Deserialize)]
struct HoverResult<'a> {
    #[serde(borrow)]
    contents: Vec<&'a RawValue>,
}

#[derive(Deserialize)]
struct HoverEdgeLine {
    #[serde(rename = "outV")]
    result_set_id: Id,
    #[serde(rename = "inV")]
    hover_id: Id,
}

#[derive(Deserialize)]
struct ReferencesEdgeLine {
    #[serde(rename = "outV")]
    result_set_id: Id,
    #[serde(rename = "inV")]
    ref_id: Id,
}

impl HoverIndex {
    pub fn create_in(dir: &Path) -> Result<Self> {
        Ok(Self {
            blobs: DynamicRecordStore::create_in(dir)?,
        })
    }

    /// `hoverResult` vertex: normalize and store the contents blob.
    pub fn add_result(&mut self, line: &[u8]) -> Result<()> {
        let line = std::str::from_utf8(line)?;
        let parsed: HoverResultLine = serde_json::from_str(line)?;

        let mut hovers = Vec::with_capacity(parsed.result.contents.len());
        for content in parsed.result.contents {
            hovers.push(hover_content::normalize(content)?);
        }

        let blob = serde_json::to_vec(&hovers)?;
        self.blobs.set(parsed.id.slot(), &blob)?;
        Ok(())
    }

    /// `textDocument/hover` edge: alias the hover vertex's blob onto the
    /// result-set id.
    pub fn add_hover_edge(&mut self, line: &[u8]) -> Result<()> {
        let parsed: HoverEdgeLine = serde_json::from_slice(line)?;
        self.blobs
            .alias(parsed.hover_id.slot(), parsed.result_set_id.slot())?;
        Ok(())
    }

    /// `textDocument/references` edge: result sets chain, so the referenced
    /// result inherits the referring set's hover. A source slot that holds
    /// nothing aliases to nothing, which is fine.
    pub fn add_references_edge(&mut self, line: &[u8]) -> Result<()> {
        let parsed: ReferencesEdgeLine = serde_json::from_slice(line)?;
        self.blobs
            .alias(parsed.result_set_id.slot(), parsed.ref_id.slot())?;
        Ok(())
    }

    /// Hover blob for a range's `ref_id`; `None` when absent.
    pub fn hover_for(&mut self, ref_id: Id) -> Result<Option<Box<RawValue>>> {
        let blob = self.blobs.get(ref_id.slot())?;
        if blob.is_empty() {
            return Ok(None);
        }

        let json = String::from_utf8(blob).map_err(|err| err.utf8_error())?;
        Ok(Some(RawValue::from_string(json)?))
    }
}
