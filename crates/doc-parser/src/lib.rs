pub mod cfb;
pub mod parser;
pub mod reader;
pub mod text_extractor;

pub use cfb::{open_container, open_container_bytes, CfbContainer, DirectoryEntry, Stream};
pub use parser::{open_document, WordDocument};
pub use text_extractor::{AnsiTranscoder, Extraction, FnSink, TextExtractor, TextSink};

use doc_core::Result;

/// Extract the main document text from raw .doc file bytes.
pub fn extract_text(data: &[u8]) -> Result<String> {
    TextExtractor::extract_from_bytes(data)
}

/// Extract the main document text from a .doc file on disk.
pub fn extract_text_from_file(path: &str) -> Result<String> {
    let data = std::fs::read(path)?;
    extract_text(&data)
}
