use super::directory::{DirectoryEntry, DirectoryTree};
use super::fat::{FatTable, MiniFatTable};
use super::header::CfbHeader;
use super::stream::Stream;
use doc_core::constants::{DIR_ENTRY_SIZE, ENDOFCHAIN};
use doc_core::{DocError, Result};
use std::io::{Cursor, Read, Seek, SeekFrom};

/// CFB (Compound File Binary) container.
///
/// The container owns its byte source for its whole lifetime; streams it
/// produces are independently owned buffers with no back-reference.
pub struct CfbContainer<R> {
    source: R,
    /// CFB header
    pub header: CfbHeader,
    /// FAT table
    fat: FatTable,
    /// Mini FAT table with the cached mini stream, when the file has one
    mini_fat: Option<MiniFatTable>,
    /// Directory tree
    pub directory: DirectoryTree,
}

impl<R: Read + Seek> CfbContainer<R> {
    /// Open a CFB container, taking ownership of the byte source.
    ///
    /// Signature and byte-order validation happen before any table is built,
    /// so a rejected file allocates nothing.
    pub fn open(mut source: R) -> Result<Self> {
        let header = CfbHeader::from_reader(&mut source)?;
        log::debug!(
            "container opened: version {}, {} byte sectors, byte order {:?}",
            header.major_version,
            header.sector_size(),
            header.byte_order
        );

        let fat = FatTable::from_reader(&mut source, &header)?;

        let entries = Self::read_directory_entries(&mut source, &header, &fat)?;
        log::debug!("directory read: {} entries", entries.len());
        let directory = DirectoryTree::new(entries);

        // The Root entry doubles as the descriptor of the mini stream; cache
        // that stream once so small-stream reads never touch the source again.
        let mini_fat = match directory.root() {
            Some(root) if header.mini_fat_sectors > 0 && root.starting_sector != ENDOFCHAIN => {
                Some(MiniFatTable::from_reader(
                    &mut source,
                    &header,
                    &fat,
                    root.starting_sector,
                    root.stream_size(),
                )?)
            }
            _ => None,
        };

        Ok(CfbContainer {
            source,
            header,
            fat,
            mini_fat,
            directory,
        })
    }

    /// Read all directory entries by walking the directory chain.
    fn read_directory_entries(
        source: &mut R,
        header: &CfbHeader,
        fat: &FatTable,
    ) -> Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        if header.first_dir_sector == ENDOFCHAIN {
            return Ok(entries);
        }

        let entries_per_sector = header.sector_size() as usize / DIR_ENTRY_SIZE;
        for sector in fat.chain(header.first_dir_sector)? {
            source.seek(SeekFrom::Start(header.sector_offset(sector)))?;
            let mut sector_data = vec![0u8; header.sector_size() as usize];
            source.read_exact(&mut sector_data)?;

            for i in 0..entries_per_sector {
                let slot = &sector_data[i * DIR_ENTRY_SIZE..(i + 1) * DIR_ENTRY_SIZE];
                entries.push(DirectoryEntry::from_bytes(slot, header.byte_order)?);
            }
        }

        Ok(entries)
    }

    /// All allocated directory entries in SID order.
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.directory.iter()
    }

    /// Resolve a name through the directory's sibling tree.
    pub fn find_entry(&self, name: &str) -> Option<&DirectoryEntry> {
        self.directory.find(name)
    }

    /// Get a directory entry by SID
    pub fn entry_by_sid(&self, sid: u32) -> Option<&DirectoryEntry> {
        self.directory.get(sid)
    }

    /// Get the root directory entry
    pub fn root_entry(&self) -> Option<&DirectoryEntry> {
        self.directory.root()
    }

    /// Check if a stream exists
    pub fn has_stream(&self, name: &str) -> bool {
        self.find_entry(name).map(|e| e.is_stream()).unwrap_or(false)
    }

    /// List all stream names
    pub fn list_streams(&self) -> Vec<String> {
        self.directory
            .streams()
            .into_iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// List all storage names
    pub fn list_storages(&self) -> Vec<String> {
        self.directory
            .storages()
            .into_iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Materialize a stream by name.
    pub fn open_stream(&mut self, name: &str) -> Result<Stream> {
        let entry = self
            .find_entry(name)
            .cloned()
            .ok_or_else(|| DocError::NotFound {
                name: name.to_string(),
            })?;
        self.materialize(&entry)
    }

    /// Materialize a stream by SID.
    pub fn open_stream_by_sid(&mut self, sid: u32) -> Result<Stream> {
        let entry = self
            .entry_by_sid(sid)
            .cloned()
            .ok_or_else(|| DocError::NotFound {
                name: format!("SID {sid}"),
            })?;
        self.materialize(&entry)
    }

    fn materialize(&mut self, entry: &DirectoryEntry) -> Result<Stream> {
        // Storages carry no byte content; only streams and the Root entry
        // (whose stream is the mini stream) can be materialized
        if !entry.is_stream() && !entry.is_root() {
            return Err(DocError::NotFound {
                name: entry.name.clone(),
            });
        }
        Stream::from_entry(
            &mut self.source,
            entry,
            &self.header,
            &self.fat,
            self.mini_fat.as_ref(),
        )
        .map_err(|e| e.while_reading_stream(&entry.name))
    }

    /// Whether the mini stream was materialized at open time.
    pub fn has_mini_stream(&self) -> bool {
        self.mini_fat.is_some()
    }
}

impl CfbContainer<Cursor<Vec<u8>>> {
    /// Open a container from a source that cannot seek, spooling it into a
    /// temporary in-memory buffer first.
    pub fn open_spooled<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::open(Cursor::new(data))
    }
}
