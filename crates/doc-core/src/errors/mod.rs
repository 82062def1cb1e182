use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a compound file: signature mismatch")]
    BadSignature,

    #[error("Invalid byte-order mark: 0x{mark:04X}")]
    BadEndian { mark: u16 },

    #[error("Invalid compound file header: {reason}")]
    BadHeader { reason: String },

    #[error("Broken sector chain: {reason}")]
    BadChain { reason: String },

    #[error("Stream '{name}' not found")]
    NotFound { name: String },

    #[error("Failed to read stream '{name}': {source}")]
    StreamRead {
        name: String,
        source: Box<DocError>,
    },

    #[error("Invalid file information block: {reason}")]
    BadFib { reason: String },

    #[error("Document is encrypted or obfuscated")]
    Encrypted,

    #[error("Invalid Clx or piece table: {reason}")]
    BadClx { reason: String },
}

impl DocError {
    /// Wrap an error with the name of the stream being materialized.
    pub fn while_reading_stream(self, name: &str) -> Self {
        DocError::StreamRead {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// IO error for a read past the end of a bounded buffer.
    pub fn truncated(requested: usize, available: usize) -> Self {
        DocError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("attempted to read {requested} bytes, but only {available} available"),
        ))
    }
}

pub type Result<T> = std::result::Result<T, DocError>;
