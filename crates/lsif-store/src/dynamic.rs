use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::fixed::FixedRecordStore;
use crate::record::{Offset, Record};

/// Variable-length record lists keyed by slot number.
///
/// Lists are appended to a payload file; a [`FixedRecordStore<Offset>`] side
/// index maps each slot to `(at, len)` in that file. An empty list is never
/// stored: absence is represented by a side-index entry with `len == 0`
/// (which is also what an unwritten slot decodes to), so "never seen" and
/// "seen but empty" are indistinguishable by design.
///
/// The payload file is append-only; re-`set`-ing a slot records a fresh
/// payload location and strands the old bytes.
pub struct DynamicRecordStore<T: Record> {
    payload: File,
    index: FixedRecordStore<Offset>,
    current_offset: u32,
    _record: PhantomData<T>,
}

impl<T: Record> DynamicRecordStore<T> {
    pub fn create_in(dir: &Path) -> Result<Self> {
        Ok(Self {
            payload: tempfile::tempfile_in(dir)?,
            index: FixedRecordStore::create_in(dir)?,
            current_offset: 0,
            _record: PhantomData,
        })
    }

    /// Store `items` under `slot`. An empty slice is a no-op.
    pub fn set(&mut self, slot: u32, items: &[T]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let len = u32::try_from(items.len())
            .map_err(|_| StoreError::OversizedList { len: items.len() })?;
        let mut buf = vec![0u8; items.len() * T::SIZE];
        for (item, chunk) in items.iter().zip(buf.chunks_exact_mut(T::SIZE)) {
            item.encode(chunk);
        }

        let at = self.current_offset;
        let end = u64::from(at) + buf.len() as u64;
        let end = u32::try_from(end).map_err(|_| StoreError::PayloadOverflow)?;

        self.payload.seek(SeekFrom::Start(u64::from(at)))?;
        self.payload.write_all(&buf)?;
        self.index.set(slot, &Offset { at, len })?;
        self.current_offset = end;

        Ok(())
    }

    /// Read back the list stored under `slot`; empty when absent.
    pub fn get(&mut self, slot: u32) -> Result<Vec<T>> {
        let offset = self.index.get(slot)?;
        if offset.len == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; offset.len as usize * T::SIZE];
        self.payload.seek(SeekFrom::Start(u64::from(offset.at)))?;
        self.payload.read_exact(&mut buf)?;

        Ok(buf.chunks_exact(T::SIZE).map(T::decode).collect())
    }

    /// Copy the side-index entry of `from` into `to`, making both slots
    /// resolve to the same payload bytes.
    pub fn alias(&mut self, from: u32, to: u32) -> Result<()> {
        let offset = self.index.get(from)?;
        self.index.set(to, &offset)
    }
}
