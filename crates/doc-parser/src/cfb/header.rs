use crate::reader::ByteReader;
use doc_core::constants::*;
use doc_core::models::ByteOrder;
use doc_core::{DocError, Result};
use std::io::{Read, Seek, SeekFrom};

/// CFB Header structure (512 bytes)
#[derive(Debug, Clone)]
pub struct CfbHeader {
    /// Signature, current or legacy
    pub signature: [u8; 8],
    /// CLSID (16 bytes, typically zeros)
    pub clsid: [u8; 16],
    /// Minor version
    pub minor_version: u16,
    /// Major version (3 for 512-byte sectors, 4 for 4096-byte sectors)
    pub major_version: u16,
    /// Byte order selected by the mark at offset 0x1C
    pub byte_order: ByteOrder,
    /// Sector size power (9 = 512 bytes, 12 = 4096 bytes)
    pub sector_shift: u16,
    /// Mini sector size power (typically 6 = 64 bytes)
    pub mini_sector_shift: u16,
    /// Total sectors (0 for version 3)
    pub total_sectors: u32,
    /// Number of FAT sectors
    pub fat_sectors: u32,
    /// First directory sector
    pub first_dir_sector: u32,
    /// Transaction signature
    pub transaction_signature: u32,
    /// Mini stream cutoff size (typically 4096)
    pub mini_stream_cutoff_size: u32,
    /// First mini FAT sector
    pub first_mini_fat_sector: u32,
    /// Number of mini FAT sectors
    pub mini_fat_sectors: u32,
    /// First DIFAT sector
    pub first_difat_sector: u32,
    /// Number of DIFAT sectors
    pub difat_sectors: u32,
    /// First 109 FAT sector positions (DIFAT array)
    pub difat: [u32; 109],
}

impl CfbHeader {
    /// Parse the CFB header from the first 512 bytes of a reader.
    ///
    /// The signature is validated before anything else, then the byte-order
    /// mark; every remaining field is decoded through the selected mode.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;

        let mut raw = [0u8; HEADER_SIZE];
        reader.read_exact(&mut raw)?;

        Self::from_bytes(&raw)
    }

    /// Parse the CFB header from a raw 512-byte block.
    pub fn from_bytes(raw: &[u8; HEADER_SIZE]) -> Result<Self> {
        let mut signature = [0u8; 8];
        signature.copy_from_slice(&raw[0..8]);
        if signature != CFB_SIGNATURE && signature != CFB_SIGNATURE_OLD {
            return Err(DocError::BadSignature);
        }

        let mark = u16::from_le_bytes([raw[0x1C], raw[0x1D]]);
        let byte_order = match mark {
            0xFFFE => ByteOrder::Little,
            0xFEFF => ByteOrder::Big,
            _ => return Err(DocError::BadEndian { mark }),
        };

        let mut r = ByteReader::with_order(raw, byte_order);
        r.skip(8)?; // signature
        let mut clsid = [0u8; 16];
        r.read_exact(&mut clsid)?;

        let minor_version = r.read_u16()?;
        let major_version = r.read_u16()?;
        r.skip(2)?; // byte-order mark, already decoded
        let sector_shift = r.read_u16()?;
        let mini_sector_shift = r.read_u16()?;
        r.skip(6)?; // reserved
        let total_sectors = r.read_u32()?;
        let fat_sectors = r.read_u32()?;
        let first_dir_sector = r.read_u32()?;
        let transaction_signature = r.read_u32()?;
        let mini_stream_cutoff_size = r.read_u32()?;
        let first_mini_fat_sector = r.read_u32()?;
        let mini_fat_sectors = r.read_u32()?;
        let first_difat_sector = r.read_u32()?;
        let difat_sectors = r.read_u32()?;

        let mut difat = [0u32; 109];
        for entry in difat.iter_mut() {
            *entry = r.read_u32()?;
        }

        let header = CfbHeader {
            signature,
            clsid,
            minor_version,
            major_version,
            byte_order,
            sector_shift,
            mini_sector_shift,
            total_sectors,
            fat_sectors,
            first_dir_sector,
            transaction_signature,
            mini_stream_cutoff_size,
            first_mini_fat_sector,
            mini_fat_sectors,
            first_difat_sector,
            difat_sectors,
            difat,
        };
        header.validate()?;

        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        if !matches!(self.major_version, 3 | 4) {
            return Err(DocError::BadHeader {
                reason: format!("unsupported major version {}", self.major_version),
            });
        }
        // Sector sizes are computed from the shifts, never hard-coded; the
        // shifts still have to describe a sane power of two.
        if !(7..=15).contains(&self.sector_shift) {
            return Err(DocError::BadHeader {
                reason: format!("implausible sector shift {}", self.sector_shift),
            });
        }
        if self.mini_sector_shift == 0 || self.mini_sector_shift >= self.sector_shift {
            return Err(DocError::BadHeader {
                reason: format!("implausible mini sector shift {}", self.mini_sector_shift),
            });
        }
        Ok(())
    }

    /// Get the sector size in bytes
    pub fn sector_size(&self) -> u32 {
        1 << self.sector_shift
    }

    /// Get the mini sector size in bytes
    pub fn mini_sector_size(&self) -> u32 {
        1 << self.mini_sector_shift
    }

    /// Byte offset of a sector in the file; the header occupies the segment
    /// before sector zero.
    pub fn sector_offset(&self, sector: u32) -> u64 {
        (u64::from(sector) + 1) * u64::from(self.sector_size())
    }
}
