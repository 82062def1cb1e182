use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use doc_core::models::ByteOrder;
use doc_core::{DocError, Result};
use std::io::{Cursor, Read, Seek, SeekFrom};

/// A bounded reader for parsing binary document data.
///
/// All multi-byte reads go through the container's byte-order mode, so the
/// big-endian variant of a compound file is handled by construction rather
/// than by per-field conditionals.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
    size: usize,
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    /// Create a ByteReader over little-endian data.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_order(data, ByteOrder::Little)
    }

    /// Create a ByteReader with an explicit byte-order mode.
    pub fn with_order(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            size: data.len(),
            cursor: Cursor::new(data),
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Get the current position in the buffer
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Get the remaining bytes available to read
    pub fn remaining(&self) -> usize {
        self.size.saturating_sub(self.position())
    }

    /// Check if we've reached the end of the buffer
    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(DocError::truncated(n, self.remaining()));
        }
        Ok(())
    }

    /// Skip n bytes forward
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.cursor.seek(SeekFrom::Current(n as i64))?;
        Ok(())
    }

    /// Seek to an absolute position
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.size {
            return Err(DocError::truncated(pos, self.size));
        }
        self.cursor.seek(SeekFrom::Start(pos as u64))?;
        Ok(())
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.cursor.read_u8()?)
    }

    /// Peek at the next byte without advancing
    pub fn peek_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let pos = self.cursor.position();
        let b = self.cursor.read_u8()?;
        self.cursor.set_position(pos);
        Ok(b)
    }

    /// Read a 16-bit unsigned integer
    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let v = match self.order {
            ByteOrder::Little => self.cursor.read_u16::<LittleEndian>()?,
            ByteOrder::Big => self.cursor.read_u16::<BigEndian>()?,
        };
        Ok(v)
    }

    /// Read a 16-bit signed integer
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    /// Read a 32-bit unsigned integer
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let v = match self.order {
            ByteOrder::Little => self.cursor.read_u32::<LittleEndian>()?,
            ByteOrder::Big => self.cursor.read_u32::<BigEndian>()?,
        };
        Ok(v)
    }

    /// Read a 64-bit unsigned integer
    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        let v = match self.order {
            ByteOrder::Little => self.cursor.read_u64::<LittleEndian>()?,
            ByteOrder::Big => self.cursor.read_u64::<BigEndian>()?,
        };
        Ok(v)
    }

    /// Read n bytes into a vector
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.ensure(n)?;
        let mut buf = vec![0u8; n];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read n bytes into an existing buffer
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len())?;
        self.cursor.read_exact(buf)?;
        Ok(())
    }

    /// Read `count` UTF-16 code units through the byte-order mode.
    pub fn read_utf16_units(&mut self, count: usize) -> Result<Vec<u16>> {
        let mut units = Vec::with_capacity(count);
        for _ in 0..count {
            units.push(self.read_u16()?);
        }
        Ok(units)
    }
}
