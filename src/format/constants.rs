//! DSK format magic bytes and fixed layout constants.

/// Standard (plain) DSK signature, 34 bytes
pub const STANDARD_DSK_SIGNATURE: &[u8] = b"MV - CPCEMU Disk-File\r\nDisk-Info\r\n";

/// Extended DSK signature, 34 bytes
pub const EXTENDED_DSK_SIGNATURE: &[u8] = b"EXTENDED CPC DSK File\r\nDisk-Info\r\n";

/// Track-Info block marker (padded to 16 bytes on disk)
pub const TRACK_INFO_MARKER: &[u8] = b"Track-Info\r\n";

/// Creator string written into freshly formatted images
pub const CREATOR_SIGNATURE: &[u8] = b"amsdsk v0.1";

/// Signature field width in the disk info block
pub const SIGNATURE_SIZE: usize = 0x22;

/// Creator field width in the disk info block
pub const CREATOR_SIZE: usize = 0x0E;

/// Size of the disk info block (header + size table + padding)
pub const DISK_INFO_BLOCK_SIZE: usize = 0x100;

/// Size of the reserved size-table area in plain images
pub const PLAIN_SIZE_TABLE_SIZE: usize = 0xCC;

/// Size of the track info block (marker + fields + 29 descriptors)
pub const TRACK_INFO_BLOCK_SIZE: usize = 0x100;

/// Track-Info marker field width
pub const TRACK_MARKER_SIZE: usize = 0x10;

/// Size of one sector descriptor on disk
pub const SECTOR_DESCRIPTOR_SIZE: usize = 8;

/// Maximum number of sector descriptors per track
pub const MAX_SECTORS_PER_TRACK: usize = 29;

/// Fixed sector payload size used by the AMSDOS layer
pub const SECTOR_SIZE: usize = 512;

/// Allocation block size (two sectors)
pub const BLOCK_SIZE: usize = 1024;

/// Sectors making up one allocation block
pub const SECTORS_PER_BLOCK: usize = 2;

/// Sectors per track assumed by the block-to-position mapping
pub const SECTORS_PER_TRACK: usize = 9;

/// Number of entries in the catalogue
pub const DIR_ENTRY_COUNT: usize = 64;

/// On-disk size of one directory entry
pub const DIR_ENTRY_SIZE: usize = 32;

/// AMSDOS loader header size
pub const HEADER_SIZE: usize = 0x80;

/// Largest file AMSDOS can store
pub const MAX_FILE_SIZE: usize = 65536;

/// Highest block index the allocator will consider
pub const MAX_BLOCK: usize = 256;

/// Catalogue marker for a deleted (or never used) entry
pub const USER_DELETED: u8 = 0xE5;

/// Filler byte written into freshly formatted sectors
pub const FILLER_BYTE: u8 = 0xE5;

/// GAP#3 length written into freshly formatted tracks
pub const GAP3_LENGTH: u8 = 0x4E;

/// Pages (128-byte records) per allocation block
pub const PAGES_PER_BLOCK: usize = BLOCK_SIZE / 128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_widths() {
        assert_eq!(STANDARD_DSK_SIGNATURE.len(), SIGNATURE_SIZE);
        assert_eq!(EXTENDED_DSK_SIGNATURE.len(), SIGNATURE_SIZE);
        assert!(CREATOR_SIGNATURE.len() <= CREATOR_SIZE);
    }

    #[test]
    fn test_track_header_layout() {
        // marker + 8 header bytes + 29 descriptors fill the info block exactly
        assert_eq!(
            TRACK_MARKER_SIZE + 8 + MAX_SECTORS_PER_TRACK * SECTOR_DESCRIPTOR_SIZE,
            TRACK_INFO_BLOCK_SIZE
        );
    }

    #[test]
    fn test_plain_info_block_layout() {
        assert_eq!(
            SIGNATURE_SIZE + CREATOR_SIZE + 4 + PLAIN_SIZE_TABLE_SIZE,
            DISK_INFO_BLOCK_SIZE
        );
    }
}
