//! Error types, the crate-wide `Result` alias, and non-fatal validation
//! warnings.

use thiserror::Error;

/// Result type alias for DSK operations
pub type Result<T> = std::result::Result<T, DskError>;

/// Errors that can occur when working with DSK images
#[derive(Debug, Error)]
pub enum DskError {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unrecognized DSK file signature
    #[error("Unsupported DSK format: {0}")]
    UnsupportedFormat(String),

    /// First sector id of track 0 is not one of the known numbering bases
    #[error("Bad first sector id {id:#04x} (expected 0x01, 0x41 or 0xC1)")]
    BadFirstSector {
        /// The sector id that was found
        id: u8,
    },

    /// Track number outside the formatted area
    #[error("Invalid track {track}")]
    InvalidTrack {
        /// Track number
        track: u8,
    },

    /// Sector id not present in the addressed track
    #[error("Invalid sector: id={id:#04x} on track {track}")]
    InvalidSector {
        /// Track number
        track: u8,
        /// Sector id
        id: u8,
    },

    /// Import source exceeds the 64 KiB AMSDOS file limit
    #[error("File size {size} exceeds 65536 bytes")]
    FileTooLarge {
        /// Source length in bytes
        size: usize,
    },

    /// No free allocation block left on the disk
    #[error("Disk full: no more free blocks available")]
    DiskFull,

    /// No free directory entry left in the catalogue
    #[error("Directory full: no more catalogue entries available")]
    DirectoryFull,

    /// Requested name/extension absent from the catalogue
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// An entry-chain walk ran past the 64-entry catalogue
    #[error("Catalogue exceeded: entry chain runs past the directory")]
    CatalogueExceeded,
}

/// Non-fatal geometry anomalies reported by [`DskImage::check`](crate::DskImage::check).
///
/// Archived images are frequently slightly non-conformant; these are
/// surfaced to the caller but never abort a load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// A track holds a sector count other than the usual 9
    #[error("track {track} has {count} sectors, wanted 9")]
    UnexpectedSectorCount {
        /// Track number
        track: u8,
        /// Sector count found
        count: u8,
    },

    /// Sector ids of a track do not span a contiguous run of 9
    #[error("strange sector numbering in track {track} (min {min:#04x}, max {max:#04x})")]
    IrregularSectorSpread {
        /// Track number
        track: u8,
        /// Lowest sector id found
        min: u8,
        /// Highest sector id found
        max: u8,
    },

    /// A track starts at a different sector id than track 0
    #[error("track {track} starts at sector {found:#04x} while track 0 starts at {expected:#04x}")]
    FirstSectorMismatch {
        /// Track number
        track: u8,
        /// First sector id of this track
        found: u8,
        /// First sector id of track 0
        expected: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DskError::BadFirstSector { id: 0x21 };
        assert_eq!(
            err.to_string(),
            "Bad first sector id 0x21 (expected 0x01, 0x41 or 0xC1)"
        );
    }

    #[test]
    fn test_warning_display() {
        let warn = Warning::UnexpectedSectorCount { track: 3, count: 8 };
        assert_eq!(warn.to_string(), "track 3 has 8 sectors, wanted 9");
    }
}
