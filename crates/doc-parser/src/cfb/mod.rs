pub mod container;
pub mod directory;
pub mod fat;
pub mod header;
pub mod stream;

pub use container::CfbContainer;
pub use directory::{DirectoryEntry, DirectoryTree, ObjectType};
pub use header::CfbHeader;
pub use stream::{Stream, StreamReader};

use doc_core::Result;
use std::io::{Cursor, Read, Seek};

/// Open a CFB container from a seekable byte source.
pub fn open_container<R: Read + Seek>(source: R) -> Result<CfbContainer<R>> {
    CfbContainer::open(source)
}

/// Open a CFB container over a byte slice.
pub fn open_container_bytes(data: &[u8]) -> Result<CfbContainer<Cursor<&[u8]>>> {
    CfbContainer::open(Cursor::new(data))
}
