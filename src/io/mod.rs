//! I/O operations for reading and writing DSK files.

/// DSK decoding
pub mod reader;
/// DSK encoding
pub mod writer;

pub use reader::{read_dsk, read_image};
pub use writer::{write_dsk, write_image};
