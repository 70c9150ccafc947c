use std::collections::HashMap;
use std::io::{Seek, Write};

use lsif_store::DynamicRecordStore;
use serde::Deserialize;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::hovers::HoverIndex;
use crate::id::Id;
use crate::label::Label;
use crate::ranges::RangeIndex;
use crate::references::ReferenceIndex;
use crate::TransformConfig;

/// Zip entry prefix for the emitted sidecar files.
const LSIF_PREFIX: &str = "lsif";

/// Top-level line dispatcher and per-document state.
///
/// Document id → path stays in memory (bounded by the number of files in the
/// project); everything that scales with token count — ranges, hovers,
/// references, per-document range-id lists — lives in the disk-backed
/// stores.
pub struct DocumentIndex {
    root: String,
    paths: HashMap<Id, String>,
    doc_ranges: DynamicRecordStore<Id>,
    ranges: RangeIndex,
    hovers: HoverIndex,
    references: ReferenceIndex,
}

#[derive(Deserialize)]
struct LineHeader {
    label: String,
}

#[derive(Deserialize)]
struct MetaDataLine {
    #[serde(rename = "projectRoot", default)]
    project_root: String,
}

#[derive(Deserialize)]
struct DocumentLine {
    id: Id,
    uri: String,
}

#[derive(Deserialize)]
struct ContainsLine {
    #[serde(rename = "outV")]
    doc_id: Id,
    #[serde(rename = "inVs", default)]
    range_ids: Vec<Id>,
}

impl DocumentIndex {
    pub fn new(config: &TransformConfig) -> Result<Self> {
        let dir = config.temp_dir.as_path();
        Ok(Self {
            root: "file:///".to_string(),
            paths: HashMap::new(),
            doc_ranges: DynamicRecordStore::create_in(dir)?,
            ranges: RangeIndex::create_in(dir)?,
            hovers: HoverIndex::create_in(dir)?,
            references: ReferenceIndex::create_in(dir, config.process_references)?,
        })
    }

    /// Dispatch one dump line on its `label` field.
    pub fn read_line(&mut self, line: &[u8]) -> Result<()> {
        let header: LineHeader = serde_json::from_slice(line)?;
        match Label::parse(&header.label) {
            Label::MetaData => self.add_metadata(line),
            Label::Document => self.add_document(line),
            Label::Contains => self.add_contains(line),
            Label::Range => self.ranges.add_range(line),
            Label::Item => self.ranges.add_item(line, &mut self.references),
            Label::HoverResult => self.hovers.add_result(line),
            Label::HoverEdge => self.hovers.add_hover_edge(line),
            Label::ReferencesEdge => self.hovers.add_references_edge(line),
            Label::Ignored => Ok(()),
        }
    }

    pub fn document_count(&self) -> usize {
        self.paths.len()
    }

    /// Write one `lsif/<path>.json` zip entry per document, in id order so
    /// archives are deterministic.
    ///
    /// A document whose range-id list cannot be read back is logged and
    /// skipped; one bad document must not deny intelligence for the rest of
    /// the project.
    pub fn serialize<W: Write + Seek>(&mut self, zip: &mut ZipWriter<W>) -> Result<()> {
        let options =
            FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

        let mut doc_ids: Vec<Id> = self.paths.keys().copied().collect();
        doc_ids.sort_unstable();

        for doc_id in doc_ids {
            let range_ids = match self.doc_ranges.get(doc_id.slot()) {
                Ok(range_ids) => range_ids,
                Err(err) => {
                    tracing::warn!(%doc_id, error = %err, "skipping unreadable document");
                    continue;
                }
            };

            let path = &self.paths[&doc_id];
            zip.start_file(format!("{LSIF_PREFIX}/{path}.json"), options)?;
            self.ranges.serialize(
                zip,
                &range_ids,
                &self.paths,
                &mut self.hovers,
                &mut self.references,
            )?;
        }

        Ok(())
    }

    fn add_metadata(&mut self, line: &[u8]) -> Result<()> {
        let parsed: MetaDataLine = serde_json::from_slice(line)?;
        self.root = format!("{}/", parsed.project_root.trim());
        Ok(())
    }

    fn add_document(&mut self, line: &[u8]) -> Result<()> {
        let parsed: DocumentLine = serde_json::from_slice(line)?;
        let path = parsed
            .uri
            .strip_prefix(&self.root)
            .unwrap_or(&parsed.uri)
            .to_string();
        self.paths.insert(parsed.id, path);
        Ok(())
    }

    fn add_contains(&mut self, line: &[u8]) -> Result<()> {
        let parsed: ContainsLine = serde_json::from_slice(line)?;
        self.doc_ranges
            .set(parsed.doc_id.slot(), &parsed.range_ids)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> DocumentIndex {
        DocumentIndex::new(&TransformConfig {
            temp_dir: std::env::temp_dir(),
            process_references: false,
        })
        .unwrap()
    }

    fn id(raw: i64) -> Id {
        serde_json::from_str(&raw.to_string()).unwrap()
    }

    #[test]
    fn document_paths_are_relative_to_the_project_root() {
        let mut docs = index();
        docs.read_line(br#"{"label":"metaData","projectRoot":"file:///proj"}"#)
            .unwrap();
        docs.read_line(br#"{"label":"document","id":1,"uri":"file:///proj/src/a.go"}"#)
            .unwrap();
        docs.read_line(br#"{"label":"document","id":2,"uri":"file:///elsewhere/b.go"}"#)
            .unwrap();

        assert_eq!(docs.paths[&id(1)], "src/a.go");
        // URIs outside the root keep their full form.
        assert_eq!(docs.paths[&id(2)], "file:///elsewhere/b.go");
    }

    #[test]
    fn unrecognized_labels_are_ignored() {
        let mut docs = index();
        docs.read_line(br#"{"label":"resultSet","id":7}"#).unwrap();
        docs.read_line(br#"{"label":"moniker","whatever":true}"#)
            .unwrap();
    }

    #[test]
    fn malformed_lines_are_fatal() {
        let mut docs = index();
        assert!(docs.read_line(b"{not json").is_err());
        assert!(docs
            .read_line(br#"{"label":"document","id":-1,"uri":"x"}"#)
            .is_err());
    }
}
