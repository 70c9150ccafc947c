use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;

use crate::error::Result;
use crate::record::Record;

/// A disk-backed sparse array of fixed-size records.
///
/// Record `slot` lives at byte offset `slot * T::SIZE` in an anonymous temp
/// file. Writing past the current end of file is valid (sparse growth); the
/// gap and any slot never written read back as all-zero bytes, which decode
/// to `T::default()`.
pub struct FixedRecordStore<T: Record> {
    file: File,
    _record: PhantomData<T>,
}

impl<T: Record> FixedRecordStore<T> {
    /// Open a store over a fresh anonymous file in `dir`.
    ///
    /// The file is unlinked from the filesystem namespace on creation, so the
    /// storage is reclaimed by the OS when the store is dropped, including on
    /// crash.
    pub fn create_in(dir: &Path) -> Result<Self> {
        let file = tempfile::tempfile_in(dir)?;
        Ok(Self {
            file,
            _record: PhantomData,
        })
    }

    pub fn set(&mut self, slot: u32, record: &T) -> Result<()> {
        let mut buf = vec![0u8; T::SIZE];
        record.encode(&mut buf);
        self.write_at(Self::slot_offset(slot), &buf)
    }

    pub fn get(&mut self, slot: u32) -> Result<T> {
        let mut buf = vec![0u8; T::SIZE];
        self.read_at(Self::slot_offset(slot), &mut buf)?;
        Ok(T::decode(&buf))
    }

    /// Overwrite part of the record at `slot`, starting `field_offset` bytes
    /// into it, leaving the rest of the slot untouched.
    ///
    /// This is a plain positioned write, not read-modify-write, so it lands
    /// correctly even when the slot has never been written.
    pub fn patch(&mut self, slot: u32, field_offset: usize, bytes: &[u8]) -> Result<()> {
        debug_assert!(field_offset + bytes.len() <= T::SIZE);
        self.write_at(Self::slot_offset(slot) + field_offset as u64, bytes)
    }

    fn slot_offset(slot: u32) -> u64 {
        u64::from(slot) * T::SIZE as u64
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;
        Ok(())
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        // Short reads past EOF are not an error: the tail stays zeroed and
        // decodes to the record's zero value.
        buf[filled..].fill(0);
        Ok(())
    }
}
