use std::collections::HashMap;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use lsif_store::{DynamicRecordStore, Record};
use serde::Serialize;

use crate::error::Result;
use crate::id::Id;

/// One stored reference location: a 1-based display line in a document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceItem {
    pub line: u32,
    pub doc_id: Id,
}

impl Record for ReferenceItem {
    const SIZE: usize = 8;

    fn encode(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..4], self.line);
        self.doc_id.encode(&mut buf[4..8]);
    }

    fn decode(buf: &[u8]) -> Self {
        Self {
            line: LittleEndian::read_u32(&buf[0..4]),
            doc_id: Id::decode(&buf[4..8]),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SerializedReference {
    pub path: String,
}

/// Reference lists per result-set id.
///
/// Reference indexing can be disabled wholesale as a cost control; when it
/// is, both `store` and `for_ref` short-circuit without touching disk.
pub struct ReferenceIndex {
    items: DynamicRecordStore<ReferenceItem>,
    enabled: bool,
}

impl ReferenceIndex {
    pub fn create_in(dir: &Path, enabled: bool) -> Result<Self> {
        Ok(Self {
            items: DynamicRecordStore::create_in(dir)?,
            enabled,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&mut self, ref_id: Id, items: &[ReferenceItem]) -> Result<()> {
        if !self.enabled || items.is_empty() {
            return Ok(());
        }
        self.items.set(ref_id.slot(), items)?;
        Ok(())
    }

    /// Resolve the stored list into display paths (`<doc-path>#L<line>`).
    /// Items pointing at unknown documents are dropped.
    pub fn for_ref(
        &mut self,
        docs: &HashMap<Id, String>,
        ref_id: Id,
    ) -> Result<Vec<SerializedReference>> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let items = self.items.get(ref_id.slot())?;
        Ok(items
            .iter()
            .filter_map(|item| {
                docs.get(&item.doc_id).map(|path| SerializedReference {
                    path: format!("{path}#L{}", item.line),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: i64) -> Id {
        serde_json::from_str(&raw.to_string()).unwrap()
    }

    fn index(enabled: bool) -> ReferenceIndex {
        ReferenceIndex::create_in(&std::env::temp_dir(), enabled).unwrap()
    }

    #[test]
    fn stored_references_resolve_to_paths() {
        let mut references = index(true);
        references
            .store(
                id(3),
                &[
                    ReferenceItem { line: 2, doc_id: id(1) },
                    ReferenceItem { line: 3, doc_id: id(1) },
                ],
            )
            .unwrap();

        let docs = HashMap::from([(id(1), "doc.go".to_string())]);
        let resolved = references.for_ref(&docs, id(3)).unwrap();

        assert!(resolved.contains(&SerializedReference { path: "doc.go#L2".into() }));
        assert!(resolved.contains(&SerializedReference { path: "doc.go#L3".into() }));
    }

    #[test]
    fn disabled_index_stores_and_resolves_nothing() {
        let mut references = index(false);
        references
            .store(id(3), &[ReferenceItem { line: 2, doc_id: id(1) }])
            .unwrap();

        let docs = HashMap::from([(id(1), "doc.go".to_string())]);
        assert!(references.for_ref(&docs, id(3)).unwrap().is_empty());
    }

    #[test]
    fn empty_store_matches_never_stored() {
        let mut references = index(true);
        references.store(id(5), &[]).unwrap();

        let docs = HashMap::new();
        assert_eq!(references.for_ref(&docs, id(5)).unwrap(), Vec::new());
        assert_eq!(references.for_ref(&docs, id(6)).unwrap(), Vec::new());
    }
}
