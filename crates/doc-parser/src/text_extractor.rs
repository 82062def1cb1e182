use crate::cfb::open_container_bytes;
use crate::parser::WordDocument;
use crate::reader::ByteReader;
use doc_core::constants::special_chars::special_char;
use doc_core::{DocError, Result};

/// A caller-resolved code-page mapping for compressed-text bytes without a
/// fixed Unicode mapping. The caller picks the mapping for the document's
/// code page; when none is supplied, Windows-1252 is assumed.
pub type AnsiTranscoder = fn(u8) -> char;

/// Receiver of decoded characters.
///
/// `push_char` returns `false` to stop extraction early; the stop is reported
/// as an outcome, not an error.
pub trait TextSink {
    fn push_char(&mut self, ch: char) -> bool;
}

impl TextSink for String {
    fn push_char(&mut self, ch: char) -> bool {
        self.push(ch);
        true
    }
}

/// Adapter turning a closure into a [`TextSink`].
pub struct FnSink<F>(pub F);

impl<F> TextSink for FnSink<F>
where
    F: FnMut(char) -> bool,
{
    fn push_char(&mut self, ch: char) -> bool {
        (self.0)(ch)
    }
}

/// How a text-extraction request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Every requested character reached the sink
    Complete,
    /// The sink asked to stop before the end of the range
    Stopped,
}

fn windows_1252(byte: u8) -> char {
    let bytes = [byte];
    let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(&bytes);
    decoded.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
}

impl WordDocument {
    /// Emit the main document part, CPs `[0, ccpText)`, in CP order.
    ///
    /// The final character of the range is the closing paragraph mark
    /// (U+000D) the format requires; it is data like any other character.
    pub fn extract_text<S: TextSink + ?Sized>(&self, sink: &mut S) -> Result<Extraction> {
        self.emit_range(0, self.fib.lw.ccp_text, sink)
    }

    /// Emit every CP the piece table covers: the main document followed by
    /// the footnote, header, comment, endnote and textbox parts.
    pub fn extract_all_text<S: TextSink + ?Sized>(&self, sink: &mut S) -> Result<Extraction> {
        self.emit_range(0, self.piece_table.end_cp(), sink)
    }

    /// Emit `len` characters starting at `cp`.
    pub fn extract_text_range<S: TextSink + ?Sized>(
        &self,
        cp: u32,
        len: u32,
        sink: &mut S,
    ) -> Result<Extraction> {
        let end = cp.checked_add(len).filter(|&e| e <= self.piece_table.end_cp());
        let Some(end) = end else {
            return Err(DocError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "character range [{cp}, {cp}+{len}) is outside the document (end CP {})",
                    self.piece_table.end_cp()
                ),
            )));
        };
        self.emit_range(cp, end, sink)
    }

    /// Walk the pieces overlapping `[start_cp, end_cp)` and decode each one.
    fn emit_range<S: TextSink + ?Sized>(
        &self,
        start_cp: u32,
        end_cp: u32,
        sink: &mut S,
    ) -> Result<Extraction> {
        let mut cp = start_cp;
        while cp < end_cp {
            let i = self
                .piece_table
                .piece_containing(cp)
                .ok_or_else(|| DocError::BadClx {
                    reason: format!("CP {cp} is not covered by the piece table"),
                })?;
            let piece = &self.piece_table.pieces[i];
            let (piece_start, piece_end) = self.piece_table.cp_range(i);
            let upto = piece_end.min(end_cp);
            let chars = (upto - cp) as usize;
            let offset =
                piece.fc.file_offset() + u64::from(cp - piece_start) * piece.fc.bytes_per_char();

            if piece.fc.is_compressed() {
                for &byte in self.stream_slice(offset, chars)? {
                    if !sink.push_char(self.decode_ansi(byte)) {
                        return Ok(Extraction::Stopped);
                    }
                }
            } else {
                let bytes = self.stream_slice(offset, chars * 2)?;
                let mut r = ByteReader::with_order(bytes, self.byte_order);
                let units = r.read_utf16_units(chars)?;
                for decoded in char::decode_utf16(units) {
                    let ch = decoded.unwrap_or(char::REPLACEMENT_CHARACTER);
                    if !sink.push_char(ch) {
                        return Ok(Extraction::Stopped);
                    }
                }
            }

            cp = upto;
        }

        Ok(Extraction::Complete)
    }

    /// Decode one byte of compressed text.
    fn decode_ansi(&self, byte: u8) -> char {
        if byte < 0x80 {
            byte as char
        } else if let Some(ch) = special_char(byte) {
            ch
        } else if let Some(transcode) = self.transcoder {
            transcode(byte)
        } else {
            windows_1252(byte)
        }
    }

    fn stream_slice(&self, offset: u64, len: usize) -> Result<&[u8]> {
        let start = offset as usize;
        let end = start.checked_add(len).filter(|&e| e <= self.word_stream.len());
        match end {
            Some(end) => Ok(&self.word_stream[start..end]),
            None => Err(DocError::truncated(
                len,
                self.word_stream.len().saturating_sub(start),
            )),
        }
    }
}

/// Text extractor for Word binary documents.
///
/// Wraps container opening, FIB/Clx decoding and extraction into one call
/// for callers that just want the text.
pub struct TextExtractor;

impl TextExtractor {
    /// Extract the main document text from raw .doc file bytes.
    pub fn extract_from_bytes(data: &[u8]) -> Result<String> {
        let mut container = open_container_bytes(data)?;
        let doc = WordDocument::open(&mut container)?;
        let mut text = String::new();
        doc.extract_text(&mut text)?;
        Ok(text)
    }

    /// Extract the main document text from an already-opened document.
    pub fn extract_from_document(doc: &WordDocument) -> Result<String> {
        let mut text = String::new();
        doc.extract_text(&mut text)?;
        Ok(text)
    }
}
