use crate::reader::ByteReader;
use doc_core::constants::{DIR_ENTRY_SIZE, NIL_SID};
use doc_core::models::ByteOrder;
use doc_core::{DocError, Result};
use std::cmp::Ordering;

/// Object type for directory entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// Unallocated entry
    Invalid = 0,
    /// Storage object (directory)
    Storage = 1,
    /// Stream object (file)
    Stream = 2,
    /// Reserved lock-bytes object
    LockBytes = 3,
    /// Reserved property object
    Property = 4,
    /// Root storage
    Root = 5,
}

impl From<u8> for ObjectType {
    fn from(value: u8) -> Self {
        match value {
            1 => ObjectType::Storage,
            2 => ObjectType::Stream,
            3 => ObjectType::LockBytes,
            4 => ObjectType::Property,
            5 => ObjectType::Root,
            _ => ObjectType::Invalid,
        }
    }
}

/// Color flag for directory tree nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFlag {
    Red = 0,
    Black = 1,
}

impl From<u8> for ColorFlag {
    fn from(value: u8) -> Self {
        match value {
            0 => ColorFlag::Red,
            _ => ColorFlag::Black,
        }
    }
}

/// Directory entry structure (128 bytes)
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Entry name, decoded from UTF-16
    pub name: String,
    /// Entry name as UTF-16 code units, the form sibling ordering is defined on
    pub name_units: Vec<u16>,
    /// Name length in bytes including the terminator (the on-disk _cb field)
    pub name_len: u16,
    /// Object type
    pub object_type: ObjectType,
    /// Color flag (for the red-black sibling tree)
    pub color_flag: ColorFlag,
    /// Left sibling SID
    pub left_sibling_sid: u32,
    /// Right sibling SID
    pub right_sibling_sid: u32,
    /// Child SID (for storage objects)
    pub child_sid: u32,
    /// CLSID (16 bytes)
    pub clsid: [u8; 16],
    /// User flags
    pub state_bits: u32,
    /// Creation FILETIME
    pub creation_time: u64,
    /// Modification FILETIME
    pub modified_time: u64,
    /// Starting sector (for streams; mini stream for the Root entry)
    pub starting_sector: u32,
    /// Stream size (low 32 bits)
    pub stream_size_low: u32,
    /// Stream size (high 32 bits, only meaningful for version 4)
    pub stream_size_high: u32,
}

impl DirectoryEntry {
    /// Parse a directory entry from a 128-byte slot.
    pub fn from_bytes(data: &[u8], order: ByteOrder) -> Result<Self> {
        if data.len() < DIR_ENTRY_SIZE {
            return Err(DocError::BadHeader {
                reason: "directory entry too small".to_string(),
            });
        }

        let mut r = ByteReader::with_order(data, order);

        // Name field: 64 bytes of UTF-16, length given by _cb right after
        let raw_units = r.read_utf16_units(32)?;
        let name_len = r.read_u16()?;
        if name_len % 2 != 0 || name_len > 64 {
            return Err(DocError::BadHeader {
                reason: format!("directory entry name length {name_len} out of range"),
            });
        }

        let mut name_units: Vec<u16> = if name_len >= 2 {
            raw_units[..(name_len as usize / 2).saturating_sub(1)].to_vec()
        } else {
            Vec::new()
        };
        if let Some(null_pos) = name_units.iter().position(|&u| u == 0) {
            name_units.truncate(null_pos);
        }
        let name = String::from_utf16_lossy(&name_units);

        let object_type = ObjectType::from(r.read_u8()?);
        let color_flag = ColorFlag::from(r.read_u8()?);

        let left_sibling_sid = r.read_u32()?;
        let right_sibling_sid = r.read_u32()?;
        let child_sid = r.read_u32()?;

        let mut clsid = [0u8; 16];
        r.read_exact(&mut clsid)?;

        let state_bits = r.read_u32()?;
        let creation_time = r.read_u64()?;
        let modified_time = r.read_u64()?;
        let starting_sector = r.read_u32()?;
        let stream_size_low = r.read_u32()?;
        let stream_size_high = r.read_u32()?;

        Ok(DirectoryEntry {
            name,
            name_units,
            name_len,
            object_type,
            color_flag,
            left_sibling_sid,
            right_sibling_sid,
            child_sid,
            clsid,
            state_bits,
            creation_time,
            modified_time,
            starting_sector,
            stream_size_low,
            stream_size_high,
        })
    }

    /// Get the total stream size
    pub fn stream_size(&self) -> u64 {
        (u64::from(self.stream_size_high) << 32) | u64::from(self.stream_size_low)
    }

    /// Check if this is an allocated entry
    pub fn is_valid(&self) -> bool {
        self.object_type != ObjectType::Invalid
    }

    /// Check if this is the root entry
    pub fn is_root(&self) -> bool {
        self.object_type == ObjectType::Root
    }

    /// Check if this is a storage (directory)
    pub fn is_storage(&self) -> bool {
        matches!(self.object_type, ObjectType::Storage | ObjectType::Root)
    }

    /// Check if this is a stream (file)
    pub fn is_stream(&self) -> bool {
        self.object_type == ObjectType::Stream
    }
}

/// Sibling ordering of the directory tree: shorter names sort first, names of
/// equal length compare by UTF-16 code-unit sequence.
pub fn name_cmp(a: &[u16], b: &[u16]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Directory tree for navigating the CFB structure.
///
/// Entries are stored by SID; sibling sets form red-black trees that the
/// format permits to degenerate into all-black spines, so lookups are bounded
/// by the entry count rather than any balance assumption.
pub struct DirectoryTree {
    /// All directory entries, indexed by SID
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryTree {
    /// Create a new directory tree from entries
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        DirectoryTree { entries }
    }

    /// Get entry by SID
    pub fn get(&self, sid: u32) -> Option<&DirectoryEntry> {
        self.entries.get(sid as usize)
    }

    /// The Root Directory Entry (SID 0).
    pub fn root(&self) -> Option<&DirectoryEntry> {
        self.entries.first().filter(|e| e.is_root())
    }

    /// Find an entry below the root by walking the sibling tree.
    pub fn find(&self, name: &str) -> Option<&DirectoryEntry> {
        let target: Vec<u16> = name.encode_utf16().collect();
        let mut sid = self.root()?.child_sid;
        let mut steps = 0;

        while sid != NIL_SID && steps <= self.entries.len() {
            let entry = self.get(sid)?;
            match name_cmp(&target, &entry.name_units) {
                Ordering::Equal => return Some(entry),
                Ordering::Less => sid = entry.left_sibling_sid,
                Ordering::Greater => sid = entry.right_sibling_sid,
            }
            steps += 1;
        }

        None
    }

    /// All allocated entries in SID order.
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_valid())
    }

    /// Get all stream entries
    pub fn streams(&self) -> Vec<&DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_stream()).collect()
    }

    /// Get all storage entries
    pub fn storages(&self) -> Vec<&DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_storage()).collect()
    }
}
