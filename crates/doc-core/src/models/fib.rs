use crate::constants::WordVersion;

/// FibBase: the fixed-size 32-byte head of the File Information Block.
#[derive(Debug, Clone, Default)]
pub struct FibBase {
    /// Word binary file magic, MUST be 0xA5EC
    pub w_ident: u16,
    /// File format version number (0x00C1 for Word 97)
    pub n_fib: u16,
    /// Install language of the producing application
    pub lid: u16,
    /// Offset of the AutoText FIB, in 512-byte units; 0 if none
    pub pn_next: u16,
    /// Packed flags word (fDot .. fObfuscated)
    pub flags: u16,
    /// MUST be 0x00BF or 0x00C1
    pub n_fib_back: u16,
    /// Obfuscation password verifier or encryption header size
    pub l_key: u32,
    /// MUST be 0 and MUST be ignored
    pub envr: u8,
    /// Packed flags byte (fMac .. fSpare0)
    pub flags2: u8,
}

impl FibBase {
    /// fDot: the document is a template
    pub fn is_template(&self) -> bool {
        self.flags & 0x0001 != 0
    }

    /// fComplex: the last save was an incremental save
    pub fn is_complex(&self) -> bool {
        self.flags & 0x0004 != 0
    }

    /// fEncrypted: the document is encrypted or obfuscated
    pub fn is_encrypted(&self) -> bool {
        self.flags & 0x0100 != 0
    }

    /// fWhichTblStm: the active Table stream is 1Table rather than 0Table
    pub fn uses_table_one(&self) -> bool {
        self.flags & 0x0200 != 0
    }

    /// fObfuscated: XOR obfuscation; only meaningful when fEncrypted is set
    pub fn is_obfuscated(&self) -> bool {
        self.flags & 0x8000 != 0
    }
}

/// FibRgLw97: the 32-bit-value region of the FIB.
///
/// Only the byte count of the WordDocument stream and the per-part character
/// counts matter for text retrieval; the reserved slots are skipped.
#[derive(Debug, Clone, Default)]
pub struct FibRgLw97 {
    /// Count of meaningful bytes in the WordDocument stream
    pub cb_mac: u32,
    /// Count of CPs in the main document
    pub ccp_text: u32,
    /// Count of CPs in the footnote subdocument
    pub ccp_ftn: u32,
    /// Count of CPs in the header subdocument
    pub ccp_hdd: u32,
    /// Count of CPs in the macro subdocument (reserved slot)
    pub ccp_mcr: u32,
    /// Count of CPs in the comment subdocument
    pub ccp_atn: u32,
    /// Count of CPs in the endnote subdocument
    pub ccp_edn: u32,
    /// Count of CPs in the textbox subdocument of the main document
    pub ccp_txbx: u32,
    /// Count of CPs in the textbox subdocument of the header
    pub ccp_hdr_txbx: u32,
}

impl FibRgLw97 {
    /// Sum of the character counts of every part after the main document.
    pub fn ccp_extra(&self) -> u32 {
        self.ccp_ftn
            + self.ccp_hdd
            + self.ccp_mcr
            + self.ccp_atn
            + self.ccp_edn
            + self.ccp_txbx
            + self.ccp_hdr_txbx
    }
}

/// The decoded File Information Block.
#[derive(Debug, Clone)]
pub struct Fib {
    pub base: FibBase,
    pub lw: FibRgLw97,
    /// Word version implied by the cbRgFcLcb count
    pub version: WordVersion,
    /// Offset of the Clx in the Table stream
    pub fc_clx: u32,
    /// Size, in bytes, of the Clx
    pub lcb_clx: u32,
}

impl Fib {
    /// The final CP of the piece table.
    ///
    /// Equals ccpText when the main document is the only part; otherwise the
    /// parts are concatenated and one extra paragraph mark closes the whole.
    pub fn last_cp(&self) -> u32 {
        let extra = self.lw.ccp_extra();
        if extra == 0 {
            self.lw.ccp_text
        } else {
            self.lw.ccp_text + 1 + extra
        }
    }

    /// Name of the Table stream this FIB refers to.
    pub fn table_stream_name(&self) -> &'static str {
        if self.base.uses_table_one() {
            "1Table"
        } else {
            "0Table"
        }
    }
}
