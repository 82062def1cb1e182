//! Shared fixtures: synthetic CFB containers and .doc stream images, built
//! in both byte orders.
#![allow(dead_code)]

use doc_core::constants::*;

pub const SECTOR: usize = 512;
pub const MINI_SECTOR: usize = 64;

/// Byte offset of the piece text inside the fixture WordDocument stream.
pub const TEXT_OFFSET: usize = 2048;

fn ceil_div(n: usize, d: usize) -> usize {
    (n + d - 1) / d
}

fn w16(buf: &mut [u8], off: usize, v: u16, be: bool) {
    let bytes = if be { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[off..off + 2].copy_from_slice(&bytes);
}

fn w32(buf: &mut [u8], off: usize, v: u32, be: bool) {
    let bytes = if be { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[off..off + 4].copy_from_slice(&bytes);
}

fn p16(buf: &mut Vec<u8>, v: u16, be: bool) {
    buf.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() });
}

fn p32(buf: &mut Vec<u8>, v: u32, be: bool) {
    buf.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() });
}

fn write_dir_entry(
    file: &mut [u8],
    off: usize,
    name: &str,
    object_type: u8,
    right_sid: u32,
    child_sid: u32,
    starting_sector: u32,
    size: u32,
    be: bool,
) {
    let units: Vec<u16> = name.encode_utf16().collect();
    assert!(units.len() <= 31);
    for (i, &unit) in units.iter().enumerate() {
        w16(file, off + i * 2, unit, be);
    }
    w16(file, off + 64, ((units.len() + 1) * 2) as u16, be);
    file[off + 66] = object_type;
    file[off + 67] = 1; // black
    w32(file, off + 68, NIL_SID, be);
    w32(file, off + 72, right_sid, be);
    w32(file, off + 76, child_sid, be);
    w32(file, off + 116, starting_sector, be);
    w32(file, off + 120, size, be);
    w32(file, off + 124, 0, be);
}

/// Assembles a version-3 container with one FAT sector and one directory
/// sector: a root entry plus up to three streams chained as a right spine in
/// sibling order.
pub struct ContainerBuilder {
    big_endian: bool,
    mini_cutoff: u32,
    force_fat: bool,
    streams: Vec<(String, Vec<u8>)>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        ContainerBuilder {
            big_endian: false,
            mini_cutoff: 4096,
            force_fat: false,
            streams: Vec::new(),
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Keep every stream in the FAT and write no mini FAT at all.
    pub fn without_mini_fat(mut self) -> Self {
        self.force_fat = true;
        self
    }

    pub fn stream(mut self, name: &str, data: Vec<u8>) -> Self {
        self.streams.push((name.to_string(), data));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let be = self.big_endian;
        assert!(self.streams.len() <= 3, "one directory sector only");

        // Sibling spine must be in name order: length first, then code units
        let mut order: Vec<usize> = (0..self.streams.len()).collect();
        order.sort_by(|&a, &b| {
            let ua: Vec<u16> = self.streams[a].0.encode_utf16().collect();
            let ub: Vec<u16> = self.streams[b].0.encode_utf16().collect();
            ua.len().cmp(&ub.len()).then_with(|| ua.cmp(&ub))
        });

        let is_small: Vec<bool> = self
            .streams
            .iter()
            .map(|(_, d)| !self.force_fat && !d.is_empty() && (d.len() as u32) < self.mini_cutoff)
            .collect();
        let any_small = is_small.iter().any(|&s| s);

        // Mini stream layout: each small stream padded to mini-sector size
        let mut mini_start_of = vec![0u32; self.streams.len()];
        let mut mini_stream = Vec::new();
        let mut mini_fat_entries: Vec<u32> = Vec::new();
        for (idx, (_, data)) in self.streams.iter().enumerate() {
            if !is_small[idx] {
                continue;
            }
            let first = mini_fat_entries.len() as u32;
            mini_start_of[idx] = first;
            let sectors = ceil_div(data.len(), MINI_SECTOR);
            for s in 0..sectors {
                mini_fat_entries.push(if s + 1 < sectors {
                    first + s as u32 + 1
                } else {
                    ENDOFCHAIN
                });
            }
            let base = mini_stream.len();
            mini_stream.extend_from_slice(data);
            mini_stream.resize(base + sectors * MINI_SECTOR, 0);
        }

        // Sector plan: FAT, directory, then mini FAT + mini stream, then the
        // FAT-chained streams
        let mut fat: Vec<u32> = vec![FREESECT; SECTOR / 4];
        fat[0] = FATSECT;
        fat[1] = ENDOFCHAIN; // directory
        let mut next_sector = 2u32;

        let mut mini_fat_sector = None;
        let mut mini_stream_first = ENDOFCHAIN;
        if any_small {
            mini_fat_sector = Some(next_sector);
            fat[next_sector as usize] = ENDOFCHAIN;
            next_sector += 1;

            let mini_sectors = ceil_div(mini_stream.len(), SECTOR);
            mini_stream_first = next_sector;
            for s in 0..mini_sectors {
                let cur = (next_sector + s as u32) as usize;
                fat[cur] = if s + 1 < mini_sectors {
                    next_sector + s as u32 + 1
                } else {
                    ENDOFCHAIN
                };
            }
            next_sector += mini_sectors as u32;
        }

        let mut large_start_of = vec![ENDOFCHAIN; self.streams.len()];
        for (idx, (_, data)) in self.streams.iter().enumerate() {
            if is_small[idx] || data.is_empty() {
                continue;
            }
            let sectors = ceil_div(data.len(), SECTOR);
            large_start_of[idx] = next_sector;
            for s in 0..sectors {
                let cur = (next_sector + s as u32) as usize;
                fat[cur] = if s + 1 < sectors {
                    next_sector + s as u32 + 1
                } else {
                    ENDOFCHAIN
                };
            }
            next_sector += sectors as u32;
        }

        let total_sectors = next_sector as usize;
        assert!(total_sectors <= SECTOR / 4, "one FAT sector only");

        let mut file = vec![0u8; (total_sectors + 1) * SECTOR];

        // Header
        file[0..8].copy_from_slice(&CFB_SIGNATURE);
        w16(&mut file, 0x18, 0x003E, be);
        w16(&mut file, 0x1A, 3, be);
        w16(&mut file, 0x1C, 0xFFFE, be);
        w16(&mut file, 0x1E, 9, be);
        w16(&mut file, 0x20, 6, be);
        w32(&mut file, 0x2C, 1, be); // FAT sector count
        w32(&mut file, 0x30, 1, be); // first directory sector
        w32(&mut file, 0x38, self.mini_cutoff, be);
        w32(&mut file, 0x3C, mini_fat_sector.unwrap_or(ENDOFCHAIN), be);
        w32(&mut file, 0x40, u32::from(any_small), be);
        w32(&mut file, 0x44, ENDOFCHAIN, be); // no DIFAT chain
        w32(&mut file, 0x48, 0, be);
        w32(&mut file, 0x4C, 0, be); // DIFAT[0]: the FAT lives in sector 0
        for i in 1..109 {
            w32(&mut file, 0x4C + i * 4, FREESECT, be);
        }

        // FAT sector
        for (i, &entry) in fat.iter().enumerate() {
            w32(&mut file, SECTOR + i * 4, entry, be);
        }

        // Directory sector: root at SID 0, streams at SID 1.. in spine order
        let child = if self.streams.is_empty() { NIL_SID } else { 1 };
        write_dir_entry(
            &mut file,
            2 * SECTOR,
            "Root Entry",
            5,
            NIL_SID,
            child,
            mini_stream_first,
            mini_stream.len() as u32,
            be,
        );
        for (pos, &idx) in order.iter().enumerate() {
            let (name, data) = &self.streams[idx];
            let right = if pos + 1 < order.len() {
                pos as u32 + 2
            } else {
                NIL_SID
            };
            let start = if is_small[idx] {
                mini_start_of[idx]
            } else {
                large_start_of[idx]
            };
            write_dir_entry(
                &mut file,
                2 * SECTOR + (pos + 1) * DIR_ENTRY_SIZE,
                name,
                2,
                right,
                NIL_SID,
                start,
                data.len() as u32,
                be,
            );
        }

        // Mini FAT sector
        if let Some(sector) = mini_fat_sector {
            let base = (sector as usize + 1) * SECTOR;
            for i in 0..SECTOR / 4 {
                w32(
                    &mut file,
                    base + i * 4,
                    mini_fat_entries.get(i).copied().unwrap_or(FREESECT),
                    be,
                );
            }
        }

        // Mini stream sectors
        if mini_stream_first != ENDOFCHAIN {
            let base = (mini_stream_first as usize + 1) * SECTOR;
            file[base..base + mini_stream.len()].copy_from_slice(&mini_stream);
        }

        // FAT-chained stream sectors
        for (idx, (_, data)) in self.streams.iter().enumerate() {
            if large_start_of[idx] == ENDOFCHAIN {
                continue;
            }
            let base = (large_start_of[idx] as usize + 1) * SECTOR;
            file[base..base + data.len()].copy_from_slice(data);
        }

        file
    }
}

fn fib_bytes(flags: u16, ccp_text: u32, fc_clx: u32, lcb_clx: u32, be: bool) -> Vec<u8> {
    let mut d = vec![0u8; 900];
    w16(&mut d, 0, 0xA5EC, be); // wIdent
    w16(&mut d, 2, 0x00C1, be); // nFib
    w16(&mut d, 6, 0x0409, be); // lid
    w16(&mut d, 10, flags, be);
    w16(&mut d, 12, 0x00BF, be); // nFibBack
    w16(&mut d, 32, 14, be); // csw
    w16(&mut d, 62, 22, be); // cslw
    w32(&mut d, 64 + 3 * 4, ccp_text, be);
    w16(&mut d, 152, 0x005D, be); // cbRgFcLcb, Word 97
    w32(&mut d, 154 + FC_CLX_OFFSET, fc_clx, be);
    w32(&mut d, 154 + FC_CLX_OFFSET + 4, lcb_clx, be);
    // cswNew at 898 stays zero
    d
}

/// Assembles a complete one-piece .doc container image.
pub struct DocBuilder {
    big_endian: bool,
    table_one: bool,
    encrypted: bool,
    /// 8-bit piece bytes, or UTF-16 text
    compressed: Option<Vec<u8>>,
    unicode: Option<String>,
}

impl DocBuilder {
    /// A document whose single piece is compressed 8-bit text.
    pub fn compressed(bytes: &[u8]) -> Self {
        DocBuilder {
            big_endian: false,
            table_one: true,
            encrypted: false,
            compressed: Some(bytes.to_vec()),
            unicode: None,
        }
    }

    /// A document whose single piece is UTF-16 text.
    pub fn unicode(text: &str) -> Self {
        DocBuilder {
            big_endian: false,
            table_one: true,
            encrypted: false,
            compressed: None,
            unicode: Some(text.to_string()),
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Clear the fWhichTblStm flag so the FIB points at 0Table.
    pub fn zero_table(mut self) -> Self {
        self.table_one = false;
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let be = self.big_endian;

        let (ccp_text, fc, piece_bytes) = match (&self.compressed, &self.unicode) {
            (Some(bytes), None) => (
                bytes.len() as u32,
                0x4000_0000 | (TEXT_OFFSET as u32 * 2),
                bytes.clone(),
            ),
            (None, Some(text)) => {
                let units: Vec<u16> = text.encode_utf16().collect();
                let mut bytes = Vec::with_capacity(units.len() * 2);
                for unit in &units {
                    p16(&mut bytes, *unit, be);
                }
                (units.len() as u32, TEXT_OFFSET as u32, bytes)
            }
            _ => unreachable!(),
        };

        // Table stream: the Clx sits at offset zero
        let mut clx = vec![0x02u8];
        p32(&mut clx, 2 * 4 + 8, be);
        p32(&mut clx, 0, be);
        p32(&mut clx, ccp_text, be);
        p16(&mut clx, 0, be); // Pcd flags
        p32(&mut clx, fc, be);
        p16(&mut clx, 0, be); // prm
        let lcb_clx = clx.len() as u32;
        let mut table = clx;
        table.resize(4096, 0);

        let mut flags = 0u16;
        if self.table_one {
            flags |= 0x0200;
        }
        if self.encrypted {
            flags |= 0x0100;
        }

        let mut word = fib_bytes(flags, ccp_text, 0, lcb_clx, be);
        word.resize(TEXT_OFFSET, 0);
        word.extend_from_slice(&piece_bytes);
        word.resize(4096, 0);

        let table_name = if self.table_one { "1Table" } else { "0Table" };
        let mut builder = ContainerBuilder::new()
            .stream("WordDocument", word)
            .stream(table_name, table);
        if be {
            builder = builder.big_endian();
        }
        builder.build()
    }
}
