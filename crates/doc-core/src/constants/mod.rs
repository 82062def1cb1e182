pub mod special_chars;

/// CFB signature bytes
pub const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Obsolete CFB signature written by late-'92 beta files, still accepted
pub const CFB_SIGNATURE_OLD: [u8; 8] = [0x0E, 0x11, 0xFC, 0x0D, 0xD0, 0xCF, 0x11, 0xE0];

/// CFB header size, independent of the sector size
pub const HEADER_SIZE: usize = 512;

/// Directory entry size
pub const DIR_ENTRY_SIZE: usize = 128;

/// Number of DIFAT entries embedded in the header
pub const HEADER_DIFAT_ENTRIES: usize = 109;

/// Maximum regular sector ID
pub const MAXREGSECT: u32 = 0xFFFFFFFA;

/// Sector occupied by the DIFAT
pub const DIFSECT: u32 = 0xFFFFFFFC;

/// Sector occupied by the FAT
pub const FATSECT: u32 = 0xFFFFFFFD;

/// End of chain marker
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE;

/// Free sector marker
pub const FREESECT: u32 = 0xFFFFFFFF;

/// SID sentinel terminating a directory-tree branch
pub const NIL_SID: u32 = 0xFFFFFFFF;

/// Magic number at offset 0 of the WordDocument stream (FibBase.wIdent)
pub const FIB_WIDENT: u16 = 0xA5EC;

/// Required count of 16-bit values in the FibRgW97 region
pub const FIB_CSW: u16 = 14;

/// Required count of 32-bit values in the FibRgLw97 region
pub const FIB_CSLW: u16 = 22;

/// Byte offset of the fcClx/lcbClx pair inside the FibRgFcLcb blob
pub const FC_CLX_OFFSET: usize = 0x108;

/// Clx tag opening a Prc (property-modifier) record
pub const CLX_TAG_PRC: u8 = 0x01;

/// Clx tag opening the Pcdt (piece table) record
pub const CLX_TAG_PCDT: u8 = 0x02;

/// Upper bound for PrcData.cbGrpprl
pub const CBGRPPRL_MAX: i16 = 0x3FA2;

/// Word version implied by the FIB's cbRgFcLcb count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordVersion {
    Word97,
    Word2000,
    Word2002,
    Word2003,
    Word2007,
    Unknown(u16),
}

impl WordVersion {
    /// Map a cbRgFcLcb count to the Word version that writes it.
    ///
    /// Counts outside the canonical table are tolerated by the FIB reader;
    /// they surface here as `Unknown`.
    pub fn from_cb_rg_fc_lcb(cb: u16) -> Self {
        match cb {
            0x005D => WordVersion::Word97,
            0x006C => WordVersion::Word2000,
            0x0088 => WordVersion::Word2002,
            0x00A4 => WordVersion::Word2003,
            0x00B7 => WordVersion::Word2007,
            other => WordVersion::Unknown(other),
        }
    }
}

impl std::fmt::Display for WordVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordVersion::Word97 => write!(f, "Word 97"),
            WordVersion::Word2000 => write!(f, "Word 2000"),
            WordVersion::Word2002 => write!(f, "Word 2002"),
            WordVersion::Word2003 => write!(f, "Word 2003"),
            WordVersion::Word2007 => write!(f, "Word 2007"),
            WordVersion::Unknown(cb) => write!(f, "unknown (cbRgFcLcb=0x{cb:04X})"),
        }
    }
}
