pub mod clx;
pub mod fib;

use crate::cfb::CfbContainer;
use crate::reader::ByteReader;
use crate::text_extractor::AnsiTranscoder;
use doc_core::models::ByteOrder;
use doc_core::{DocError, Fib, PieceTable, Result};
use std::io::{Read, Seek};

/// Name of the main document stream of a .doc container.
pub const WORD_DOCUMENT_STREAM: &str = "WordDocument";

/// A parsed Word binary document, ready for text retrieval.
///
/// Owns the materialized WordDocument stream and the decoded piece table; the
/// container it came from is no longer needed afterwards.
pub struct WordDocument {
    pub(crate) word_stream: Vec<u8>,
    pub(crate) byte_order: ByteOrder,
    pub(crate) fib: Fib,
    pub(crate) piece_table: PieceTable,
    pub(crate) transcoder: Option<AnsiTranscoder>,
}

impl WordDocument {
    /// Open the Word document held by a CFB container.
    ///
    /// Reads the FIB from offset zero of the WordDocument stream, selects the
    /// Table stream the FIB points at, and decodes the piece table from its
    /// Clx.
    pub fn open<R: Read + Seek>(container: &mut CfbContainer<R>) -> Result<Self> {
        let byte_order = container.header.byte_order;

        let word_stream = container.open_stream(WORD_DOCUMENT_STREAM)?.into_bytes();
        let mut reader = ByteReader::with_order(&word_stream, byte_order);
        let fib = fib::parse_fib(&mut reader)?;

        let table_name = fib.table_stream_name();
        log::debug!("active table stream: {table_name}");
        let table_stream = container.open_stream(table_name)?;

        let piece_table = clx::parse_clx(
            table_stream.as_bytes(),
            fib.fc_clx,
            fib.lcb_clx,
            fib.last_cp(),
            byte_order,
        )?;

        let doc = WordDocument {
            word_stream,
            byte_order,
            fib,
            piece_table,
            transcoder: None,
        };
        doc.check_piece_bounds()?;
        Ok(doc)
    }

    /// Use a caller-resolved code-page mapping for compressed-text bytes that
    /// have no fixed Unicode mapping.
    pub fn with_transcoder(mut self, transcoder: AnsiTranscoder) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    /// The decoded File Information Block.
    pub fn fib(&self) -> &Fib {
        &self.fib
    }

    /// The decoded piece table.
    pub fn piece_table(&self) -> &PieceTable {
        &self.piece_table
    }

    /// Character count of the main document part.
    pub fn main_document_len(&self) -> u32 {
        self.fib.lw.ccp_text
    }

    /// Every piece must point inside the WordDocument stream.
    fn check_piece_bounds(&self) -> Result<()> {
        let stream_len = self.word_stream.len() as u64;
        for (i, piece) in self.piece_table.pieces.iter().enumerate() {
            let (start, end) = self.piece_table.cp_range(i);
            let chars = u64::from(end - start);
            let last = piece.fc.file_offset() + chars * piece.fc.bytes_per_char();
            if last > stream_len {
                return Err(DocError::BadClx {
                    reason: format!(
                        "piece {i} ends at byte {last}, WordDocument stream is {stream_len} bytes"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Open the Word document held by a CFB container.
pub fn open_document<R: Read + Seek>(container: &mut CfbContainer<R>) -> Result<WordDocument> {
    WordDocument::open(container)
}
