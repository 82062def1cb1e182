use super::header::CfbHeader;
use crate::reader::ByteReader;
use doc_core::constants::*;
use doc_core::{DocError, Result};
use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};

/// Walk a sector chain from `start` until ENDOFCHAIN.
///
/// Every identifier must be a regular sector, no identifier may repeat, and
/// the chain may not be longer than the table that backs it.
fn walk_chain<F>(start: u32, limit: usize, mut next: F) -> Result<Vec<u32>>
where
    F: FnMut(u32) -> Result<u32>,
{
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = start;

    while current != ENDOFCHAIN {
        if current > MAXREGSECT {
            return Err(DocError::BadChain {
                reason: format!("sector 0x{current:08X} is not a regular sector"),
            });
        }
        if !visited.insert(current) {
            return Err(DocError::BadChain {
                reason: format!("cycle at sector 0x{current:08X}"),
            });
        }
        if chain.len() >= limit {
            return Err(DocError::BadChain {
                reason: format!("chain exceeds {limit} sectors"),
            });
        }
        chain.push(current);
        current = next(current)?;
    }

    Ok(chain)
}

fn read_sector<R: Read + Seek>(reader: &mut R, header: &CfbHeader, sector: u32) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(header.sector_offset(sector)))?;
    let mut data = vec![0u8; header.sector_size() as usize];
    reader.read_exact(&mut data)?;
    Ok(data)
}

/// FAT (File Allocation Table) manager
pub struct FatTable {
    /// FAT entries, one next-hop per sector
    pub entries: Vec<u32>,
    /// Sector size
    pub sector_size: u32,
}

impl FatTable {
    /// Build the FAT from a reader and header by resolving the DIFAT.
    ///
    /// The first 109 FAT sector positions are embedded in the header; any
    /// remaining positions live in chained DIFAT sectors whose final 4-byte
    /// slot holds the next DIFAT sector.
    pub fn from_reader<R: Read + Seek>(reader: &mut R, header: &CfbHeader) -> Result<Self> {
        let sector_size = header.sector_size();
        let entries_per_sector = (sector_size / 4) as usize;

        // Collect all FAT sector positions from the DIFAT
        let mut fat_sectors = Vec::new();
        for &sector in header.difat.iter() {
            if sector == FREESECT {
                break;
            }
            fat_sectors.push(sector);
        }

        if header.difat_sectors > 0 {
            let mut current_difat = header.first_difat_sector;
            let mut seen = HashSet::new();
            for _ in 0..header.difat_sectors {
                if current_difat == ENDOFCHAIN || current_difat == FREESECT {
                    break;
                }
                if current_difat > MAXREGSECT || !seen.insert(current_difat) {
                    return Err(DocError::BadChain {
                        reason: format!("invalid DIFAT sector 0x{current_difat:08X}"),
                    });
                }

                let data = read_sector(reader, header, current_difat)?;
                let mut r = ByteReader::with_order(&data, header.byte_order);
                for _ in 0..entries_per_sector - 1 {
                    let sector = r.read_u32()?;
                    if sector != FREESECT {
                        fat_sectors.push(sector);
                    }
                }
                // The last slot points at the next DIFAT sector
                current_difat = r.read_u32()?;
            }
        }

        // Read all FAT entries
        let mut entries = Vec::with_capacity(fat_sectors.len() * entries_per_sector);
        for &fat_sector in &fat_sectors {
            if fat_sector > MAXREGSECT {
                return Err(DocError::BadChain {
                    reason: format!("invalid FAT sector 0x{fat_sector:08X} in DIFAT"),
                });
            }
            let data = read_sector(reader, header, fat_sector)?;
            let mut r = ByteReader::with_order(&data, header.byte_order);
            for _ in 0..entries_per_sector {
                entries.push(r.read_u32()?);
            }
        }

        log::debug!(
            "FAT resolved: {} sectors, {} entries",
            fat_sectors.len(),
            entries.len()
        );

        Ok(FatTable {
            entries,
            sector_size,
        })
    }

    /// Next-hop for a sector.
    pub fn next(&self, sector: u32) -> Result<u32> {
        self.entries
            .get(sector as usize)
            .copied()
            .ok_or_else(|| DocError::BadChain {
                reason: format!("sector 0x{sector:08X} is not covered by the FAT"),
            })
    }

    /// All sectors in the chain starting at `start`; empty for ENDOFCHAIN.
    pub fn chain(&self, start: u32) -> Result<Vec<u32>> {
        walk_chain(start, self.entries.len(), |s| self.next(s))
    }

    /// Concatenate the content of every sector in a chain.
    pub fn read_chain<R: Read + Seek>(
        &self,
        reader: &mut R,
        header: &CfbHeader,
        start: u32,
    ) -> Result<Vec<u8>> {
        let chain = self.chain(start)?;
        let mut data = Vec::with_capacity(chain.len() * self.sector_size as usize);
        for sector in chain {
            data.extend_from_slice(&read_sector(reader, header, sector)?);
        }
        Ok(data)
    }
}

/// Mini FAT table for small streams.
///
/// Owns the cached mini-stream: mini sectors address bytes inside that
/// buffer, not inside the container.
pub struct MiniFatTable {
    /// Mini FAT entries
    pub entries: Vec<u32>,
    /// Mini stream data, cached at open time
    pub mini_stream: Vec<u8>,
    /// Mini sector size
    mini_sector_size: u32,
}

impl MiniFatTable {
    /// Build the mini FAT and cache the mini stream.
    ///
    /// The mini FAT itself is an ordinary stream chained through the FAT from
    /// the header's mini-FAT start sector; the mini stream is the content of
    /// the Root entry's chain, truncated to the Root entry's size.
    pub fn from_reader<R: Read + Seek>(
        reader: &mut R,
        header: &CfbHeader,
        fat: &FatTable,
        mini_stream_start: u32,
        mini_stream_size: u64,
    ) -> Result<Self> {
        let mini_sector_size = header.mini_sector_size();
        let entries_per_sector = (header.sector_size() / 4) as usize;

        let mut entries = Vec::new();
        if header.mini_fat_sectors > 0 && header.first_mini_fat_sector != ENDOFCHAIN {
            for sector in fat.chain(header.first_mini_fat_sector)? {
                let data = read_sector(reader, header, sector)?;
                let mut r = ByteReader::with_order(&data, header.byte_order);
                for _ in 0..entries_per_sector {
                    entries.push(r.read_u32()?);
                }
            }
        }

        let mut mini_stream = if mini_stream_start != ENDOFCHAIN {
            fat.read_chain(reader, header, mini_stream_start)?
        } else {
            Vec::new()
        };
        if (mini_stream.len() as u64) < mini_stream_size {
            return Err(DocError::BadChain {
                reason: format!(
                    "mini stream chain yields {} bytes, root entry declares {}",
                    mini_stream.len(),
                    mini_stream_size
                ),
            });
        }
        mini_stream.truncate(mini_stream_size as usize);

        log::debug!(
            "mini FAT resolved: {} entries, {} byte mini stream",
            entries.len(),
            mini_stream.len()
        );

        Ok(MiniFatTable {
            entries,
            mini_stream,
            mini_sector_size,
        })
    }

    /// Next-hop for a mini sector.
    pub fn next(&self, mini_sector: u32) -> Result<u32> {
        self.entries
            .get(mini_sector as usize)
            .copied()
            .ok_or_else(|| DocError::BadChain {
                reason: format!("mini sector 0x{mini_sector:08X} is not covered by the mini FAT"),
            })
    }

    /// All mini sectors in the chain starting at `start`.
    pub fn chain(&self, start: u32) -> Result<Vec<u32>> {
        walk_chain(start, self.entries.len(), |s| self.next(s))
    }

    /// Concatenate the content of every mini sector in a chain.
    pub fn read_chain(&self, start: u32) -> Result<Vec<u8>> {
        let chain = self.chain(start)?;
        let size = self.mini_sector_size as usize;
        let mut data = Vec::with_capacity(chain.len() * size);

        for mini_sector in chain {
            let offset = mini_sector as usize * size;
            let end = offset + size;
            if end > self.mini_stream.len() {
                return Err(DocError::BadChain {
                    reason: format!("mini sector 0x{mini_sector:08X} is outside the mini stream"),
                });
            }
            data.extend_from_slice(&self.mini_stream[offset..end]);
        }

        Ok(data)
    }
}
