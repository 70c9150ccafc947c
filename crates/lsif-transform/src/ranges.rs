use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use lsif_store::{FixedRecordStore, Record};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::Result;
use crate::hovers::HoverIndex;
use crate::id::Id;
use crate::references::{ReferenceIndex, ReferenceItem, SerializedReference};

const PROPERTY_DEFINITIONS: &str = "definitions";
const PROPERTY_REFERENCES: &str = "references";

/// Byte offset of `ref_id` inside an encoded [`Range`], the field the
/// back-patching protocol overwrites in place.
const REF_ID_FIELD_OFFSET: usize = 8;

/// A token range: 0-based start position plus the result-set id it belongs
/// to. `ref_id` starts unset and is back-patched when the owning `item` edge
/// arrives, which may be before or after the `range` vertex itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub line: u32,
    pub character: u32,
    pub ref_id: Id,
}

impl Record for Range {
    const SIZE: usize = 12;

    fn encode(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..4], self.line);
        LittleEndian::write_u32(&mut buf[4..8], self.character);
        self.ref_id.encode(&mut buf[8..12]);
    }

    fn decode(buf: &[u8]) -> Self {
        Self {
            line: LittleEndian::read_u32(&buf[0..4]),
            character: LittleEndian::read_u32(&buf[4..8]),
            ref_id: Id::decode(&buf[8..12]),
        }
    }
}

/// The definition location of a result set: a 1-based display line in a
/// document. The zero record (line 0) means "no definition seen".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefRef {
    pub line: u32,
    pub doc_id: Id,
}

impl Record for DefRef {
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

#[derive(Deserialize)]
struct RangeLine {
    id: Id,
    start: Position,
}

#[derive(Deserialize)]
struct Position {
    line: u32,
    character: u32,
}

#[derive(Deserialize)]
struct ItemLine {
    #[serde(default)]
    property: String,
    #[serde(rename = "outV")]
    ref_id: Id,
    #[serde(rename = "inVs", default)]
    range_ids: Vec<Id>,
    #[serde(rename = "document", default)]
    doc_id: Id,
}

#[derive(Serialize)]
struct SerializedRange {
    start_line: u32,
    start_char: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    definition_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hover: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    references: Vec<SerializedReference>,
}

/// Ranges and definition locations, both as fixed-slot files.
pub struct RangeIndex {
    ranges: FixedRecordStore<Range>,
    def_refs: FixedRecordStore<DefRef>,
}

impl RangeIndex {
    pub fn create_in(dir: &Path) -> Result<Self> {
        Ok(Self {
            ranges: FixedRecordStore::create_in(dir)?,
            def_refs: FixedRecordStore::create_in(dir)?,
        })
    }

    /// `range` vertex: store the start position.
    ///
    /// Every field owner writes only its own byte sub-range of the record:
    /// the vertex owns `line`/`character`, the `item` edge owns `ref_id`.
    /// That keeps vertex and edge writes commutative, so arrival order does
    /// not change the stored record.
    pub fn add_range(&mut self, line: &[u8]) -> Result<()> {
        let parsed: RangeLine = serde_json::from_slice(line)?;
        let mut position = [0u8; REF_ID_FIELD_OFFSET];
        LittleEndian::write_u32(&mut position[0..4], parsed.start.line);
        LittleEndian::write_u32(&mut position[4..8], parsed.start.character);
        self.ranges.patch(parsed.id.slot(), 0, &position)?;
        Ok(())
    }

    /// `item` edge: back-patch every listed range's `ref_id`, then record
    /// the definition location or reference list the edge describes.
    pub fn add_item(&mut self, line: &[u8], references: &mut ReferenceIndex) -> Result<()> {
        let parsed: ItemLine = serde_json::from_slice(line)?;
        match parsed.property.as_str() {
            PROPERTY_DEFINITIONS | PROPERTY_REFERENCES => {}
            _ => return Ok(()),
        }

        let mut ref_id_bytes = [0u8; Id::SIZE];
        parsed.ref_id.encode(&mut ref_id_bytes);
        for range_id in &parsed.range_ids {
            self.ranges
                .patch(range_id.slot(), REF_ID_FIELD_OFFSET, &ref_id_bytes)?;
        }

        if parsed.property == PROPERTY_DEFINITIONS {
            self.add_def_ref(&parsed)
        } else {
            self.add_reference_items(&parsed, references)
        }
    }

    pub fn get(&mut self, range_id: Id) -> Result<Range> {
        Ok(self.ranges.get(range_id.slot())?)
    }

    /// Stream one document's ranges as a JSON array.
    ///
    /// A range whose lookup fails is skipped rather than failing the whole
    /// entry, so one bad record cannot blank out a file's intelligence.
    pub fn serialize<W: Write>(
        &mut self,
        out: &mut W,
        range_ids: &[Id],
        docs: &HashMap<Id, String>,
        hovers: &mut HoverIndex,
        references: &mut ReferenceIndex,
    ) -> Result<()> {
        out.write_all(b"[")?;
        let mut first = true;
        for &range_id in range_ids {
            let entry = match self.entry_for(range_id, docs, hovers, references) {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(%range_id, error = %err, "skipping unresolvable range");
                    continue;
                }
            };
            if !first {
                out.write_all(b",")?;
            }
            serde_json::to_writer(&mut *out, &entry)?;
            first = false;
        }
        out.write_all(b"]")?;
        Ok(())
    }

    fn entry_for(
        &mut self,
        range_id: Id,
        docs: &HashMap<Id, String>,
        hovers: &mut HoverIndex,
        references: &mut ReferenceIndex,
    ) -> Result<SerializedRange> {
        let range = self.get(range_id)?;
        Ok(SerializedRange {
            start_line: range.line,
            start_char: range.character,
            definition_path: self.definition_path_for(docs, range.ref_id)?,
            hover: hovers.hover_for(range.ref_id)?,
            references: references.for_ref(docs, range.ref_id)?,
        })
    }

    fn definition_path_for(
        &mut self,
        docs: &HashMap<Id, String>,
        ref_id: Id,
    ) -> Result<Option<String>> {
        let def_ref = self.def_refs.get(ref_id.slot())?;
        if def_ref.line == 0 {
            return Ok(None);
        }
        Ok(docs
            .get(&def_ref.doc_id)
            .map(|path| format!("{path}#L{}", def_ref.line)))
    }

    /// Definition edges resolve to the first listed range's stored start
    /// line. This reads the range file, so it relies on the `range` vertex
    /// preceding its defining edge; LSIF emitters do this in practice.
    fn add_def_ref(&mut self, item: &ItemLine) -> Result<()> {
        let Some(&first) = item.range_ids.first() else {
            return Ok(());
        };
        let range = self.ranges.get(first.slot())?;
        self.def_refs.set(
            item.ref_id.slot(),
            &DefRef {
                line: range.line + 1,
                doc_id: item.doc_id,
            },
        )?;
        Ok(())
    }

    fn add_reference_items(
        &mut self,
        item: &ItemLine,
        references: &mut ReferenceIndex,
    ) -> Result<()> {
        if !references.enabled() {
            return Ok(());
        }

        let mut items = Vec::with_capacity(item.range_ids.len());
        for range_id in &item.range_ids {
            let range = self.ranges.get(range_id.slot())?;
            items.push(ReferenceItem {
                line: range.line + 1,
                doc_id: item.doc_id,
            });
        }
        references.store(item.ref_id, &items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::ReferenceIndex;

    fn id(raw: i64) -> Id {
        serde_json::from_str(&raw.to_string()).unwrap()
    }

    fn index() -> (RangeIndex, ReferenceIndex) {
        let dir = std::env::temp_dir();
        (
            RangeIndex::create_in(&dir).unwrap(),
            ReferenceIndex::create_in(&dir, true).unwrap(),
        )
    }

    #[test]
    fn back_patch_is_order_independent() {
        let range_line = br#"{"id":2,"start":{"line":5,"character":3}}"#;
        let item_line = br#"{"outV":4,"inVs":[2],"property":"definitions","document":1}"#;

        let (mut vertex_first, mut refs_a) = index();
        vertex_first.add_range(range_line).unwrap();
        vertex_first.add_item(item_line, &mut refs_a).unwrap();

        let (mut edge_first, mut refs_b) = index();
        edge_first.add_item(item_line, &mut refs_b).unwrap();
        edge_first.add_range(range_line).unwrap();

        let expected = Range {
            line: 5,
            character: 3,
            ref_id: id(4),
        };
        assert_eq!(vertex_first.get(id(2)).unwrap(), expected);
        assert_eq!(edge_first.get(id(2)).unwrap(), expected);
    }

    #[test]
    fn patched_record_equals_directly_constructed_record() {
        let (mut ranges, mut refs) = index();
        ranges
            .add_range(br#"{"id":2,"start":{"line":5,"character":3}}"#)
            .unwrap();
        ranges
            .add_item(
                br#"{"outV":4,"inVs":[2],"property":"definitions","document":1}"#,
                &mut refs,
            )
            .unwrap();

        assert_eq!(
            ranges.get(id(2)).unwrap(),
            Range {
                line: 5,
                character: 3,
                ref_id: id(4)
            }
        );
    }

    #[test]
    fn definition_path_is_one_based() {
        let (mut ranges, mut refs) = index();
        ranges
            .add_range(br#"{"id":2,"start":{"line":5,"character":3}}"#)
            .unwrap();
        ranges
            .add_item(
                br#"{"outV":4,"inVs":[2],"property":"definitions","document":1}"#,
                &mut refs,
            )
            .unwrap();

        let docs = HashMap::from([(id(1), "a.go".to_string())]);
        assert_eq!(
            ranges.definition_path_for(&docs, id(4)).unwrap(),
            Some("a.go#L6".to_string())
        );
    }

    #[test]
    fn reference_items_collect_stored_lines() {
        let (mut ranges, mut refs) = index();
        ranges
            .add_range(br#"{"id":2,"start":{"line":1,"character":0}}"#)
            .unwrap();
        ranges
            .add_range(br#"{"id":3,"start":{"line":7,"character":0}}"#)
            .unwrap();
        ranges
            .add_item(
                br#"{"outV":9,"inVs":[2,3],"property":"references","document":1}"#,
                &mut refs,
            )
            .unwrap();

        let docs = HashMap::from([(id(1), "a.go".to_string())]);
        let resolved = refs.for_ref(&docs, id(9)).unwrap();
        assert_eq!(
            resolved,
            vec![
                SerializedReference { path: "a.go#L2".into() },
                SerializedReference { path: "a.go#L8".into() },
            ]
        );
    }

    #[test]
    fn items_without_a_known_property_are_ignored() {
        let (mut ranges, mut refs) = index();
        ranges
            .add_range(br#"{"id":2,"start":{"line":5,"character":3}}"#)
            .unwrap();
        ranges
            .add_item(br#"{"outV":4,"inVs":[2]}"#, &mut refs)
            .unwrap();

        assert!(ranges.get(id(2)).unwrap().ref_id.is_unset());
    }
}
