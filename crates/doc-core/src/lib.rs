pub mod constants;
pub mod errors;
pub mod models;

// Re-export commonly used items
pub use constants::{WordVersion, CFB_SIGNATURE, CFB_SIGNATURE_OLD};
pub use errors::{DocError, Result};
pub use models::{ByteOrder, FcCompressed, Fib, FibBase, FibRgLw97, Pcd, PieceTable};
