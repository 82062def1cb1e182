use super::directory::DirectoryEntry;
use super::fat::{FatTable, MiniFatTable};
use super::header::CfbHeader;
use doc_core::constants::ENDOFCHAIN;
use doc_core::{DocError, Result};
use std::io::{Read, Seek};

/// A stream materialized from a CFB container.
///
/// The buffer is independently owned: it stays valid after the container that
/// produced it is dropped.
#[derive(Debug, Clone)]
pub struct Stream {
    /// Stream name
    pub name: String,
    /// Stream data, truncated to the directory entry's declared size
    pub data: Vec<u8>,
}

impl Stream {
    /// Create a new stream
    pub fn new(name: String, data: Vec<u8>) -> Self {
        Stream { name, data }
    }

    /// Materialize the stream described by a directory entry.
    ///
    /// Non-root entries below the mini-stream cutoff are routed through the
    /// mini FAT when one exists; the Root entry (whose stream IS the mini
    /// stream) and everything at or above the cutoff go through the FAT.
    pub fn from_entry<R: Read + Seek>(
        reader: &mut R,
        entry: &DirectoryEntry,
        header: &CfbHeader,
        fat: &FatTable,
        mini_fat: Option<&MiniFatTable>,
    ) -> Result<Self> {
        let size = entry.stream_size();

        let data = if size == 0 || entry.starting_sector == ENDOFCHAIN {
            Vec::new()
        } else {
            let use_mini = !entry.is_root()
                && size < u64::from(header.mini_stream_cutoff_size)
                && mini_fat.is_some();
            if use_mini {
                let mini_fat = mini_fat.unwrap();
                log::trace!("stream '{}' routed through the mini FAT", entry.name);
                mini_fat.read_chain(entry.starting_sector)?
            } else {
                log::trace!("stream '{}' routed through the FAT", entry.name);
                fat.read_chain(reader, header, entry.starting_sector)?
            }
        };

        if (data.len() as u64) < size {
            return Err(DocError::BadChain {
                reason: format!(
                    "chain yields {} bytes, directory entry declares {}",
                    data.len(),
                    size
                ),
            });
        }

        // Chains are sector-aligned; cut the tail padding
        let mut data = data;
        data.truncate(size as usize);

        Ok(Stream::new(entry.name.clone(), data))
    }

    /// Get stream data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Stream length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the stream, keeping only its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// A `Read + Seek` cursor over a materialized stream.
pub struct StreamReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> StreamReader<'a> {
    /// Create a new stream reader
    pub fn new(data: &'a [u8]) -> Self {
        StreamReader { data, position: 0 }
    }

    /// Get the current position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the remaining bytes
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if we've reached the end
    pub fn is_eof(&self) -> bool {
        self.position >= self.data.len()
    }
}

impl<'a> Read for StreamReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let available = self.remaining();
        let to_read = buf.len().min(available);

        if to_read > 0 {
            buf[..to_read].copy_from_slice(&self.data[self.position..self.position + to_read]);
            self.position += to_read;
        }

        Ok(to_read)
    }
}

impl<'a> Seek for StreamReader<'a> {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        let new_pos = match pos {
            std::io::SeekFrom::Start(offset) => offset as i64,
            std::io::SeekFrom::Current(offset) => self.position as i64 + offset,
            std::io::SeekFrom::End(offset) => self.data.len() as i64 + offset,
        };

        if new_pos < 0 || new_pos > self.data.len() as i64 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Seek position out of bounds",
            ));
        }

        self.position = new_pos as usize;
        Ok(self.position as u64)
    }
}
