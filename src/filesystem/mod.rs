//! AMSDOS filesystem layer: loader header codec, catalogue, allocation
//! bitmap and the file store.

/// AMSDOS file store operations
pub mod amsdos;
/// Allocation block bitmap
pub mod bitmap;
/// Directory entry codec and catalogue cache
pub mod directory;
/// AMSDOS loader header codec
pub mod header;

pub use amsdos::{AmsdosDisk, ImportOptions, SaveMode};
pub use bitmap::AllocationBitmap;
pub use directory::{DirEntry, Directory};
pub use header::{try_parse_header, AmsdosHeader};

use std::fmt;
use std::path::Path;

/// An 8.3 AMSDOS file name: space-padded name and extension, stored
/// uppercase as the firmware does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmsdosName {
    /// Name part, space-padded to 8 bytes
    pub name: [u8; 8],
    /// Extension part, space-padded to 3 bytes
    pub ext: [u8; 3],
}

impl AmsdosName {
    /// Build a name from a host path: uppercase stem truncated to 8
    /// characters, uppercase extension truncated to 3.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_default();
        Self::from_parts(&stem, &ext)
    }

    /// Parse a `NAME.EXT` string; padding spaces are tolerated on both
    /// parts, so catalogue-style names (`"IRONMAN .SCR"`) work too.
    pub fn parse(s: &str) -> Self {
        let (stem, ext) = match s.find('.') {
            Some(dot) => (&s[..dot], &s[dot + 1..]),
            None => (s, ""),
        };
        Self::from_parts(&stem.trim_end().to_uppercase(), &ext.trim_end().to_uppercase())
    }

    fn from_parts(stem: &str, ext: &str) -> Self {
        let mut name = [b' '; 8];
        for (slot, byte) in name.iter_mut().zip(stem.bytes()) {
            *slot = byte;
        }
        let mut extension = [b' '; 3];
        for (slot, byte) in extension.iter_mut().zip(ext.bytes()) {
            *slot = byte;
        }
        Self {
            name,
            ext: extension,
        }
    }

    /// The padded 12-character catalogue form, `NNNNNNNN.EEE`
    pub fn padded(&self) -> String {
        let mut s = String::with_capacity(12);
        s.push_str(&String::from_utf8_lossy(&self.name));
        s.push('.');
        s.push_str(&String::from_utf8_lossy(&self.ext));
        s
    }
}

impl fmt::Display for AmsdosName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.padded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_pads_and_uppercases() {
        let name = AmsdosName::from_path("/some/dir/ironman.scr");
        assert_eq!(&name.name, b"IRONMAN ");
        assert_eq!(&name.ext, b"SCR");
        assert_eq!(name.to_string(), "IRONMAN .SCR");
    }

    #[test]
    fn test_from_path_truncates() {
        let name = AmsdosName::from_path("averylongfilename.basic");
        assert_eq!(&name.name, b"AVERYLON");
        assert_eq!(&name.ext, b"BAS");
    }

    #[test]
    fn test_from_path_without_extension() {
        let name = AmsdosName::from_path("disc");
        assert_eq!(&name.name, b"DISC    ");
        assert_eq!(&name.ext, b"   ");
    }

    #[test]
    fn test_parse_accepts_padded_form() {
        let name = AmsdosName::parse("IRONMAN .SCR");
        assert_eq!(name, AmsdosName::parse("ironman.scr"));
    }
}
