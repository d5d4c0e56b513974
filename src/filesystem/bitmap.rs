//! Transient allocation bitmap.
//!
//! AMSDOS keeps no free list on disk: the set of occupied blocks is derived
//! from the catalogue whenever an allocation decision is needed.

use crate::filesystem::directory::Directory;
use crate::format::MAX_BLOCK;

/// Boolean-per-block occupancy map over the image's addressable block range.
///
/// Blocks 0 and 1 are permanently reserved for the catalogue.
#[derive(Debug, Clone)]
pub struct AllocationBitmap {
    used: [bool; MAX_BLOCK],
}

impl Default for AllocationBitmap {
    fn default() -> Self {
        Self {
            used: [false; MAX_BLOCK],
        }
    }
}

impl AllocationBitmap {
    /// Rebuild the map from the catalogue: clear everything, reserve the
    /// catalogue blocks, mark every block referenced by a live entry.
    /// Returns the number of distinct referenced blocks (free-space
    /// reporting).
    pub fn rebuild(&mut self, directory: &Directory) -> usize {
        self.used = [false; MAX_BLOCK];
        self.used[0] = true;
        self.used[1] = true;
        let mut referenced = 0;
        for entry in directory.iter() {
            if entry.is_deleted() {
                continue;
            }
            for &block in &entry.blocks {
                let block = block as usize;
                if block > 1 && !self.used[block] {
                    self.used[block] = true;
                    referenced += 1;
                }
            }
        }
        referenced
    }

    /// Claim the first free block below `max_block`.
    ///
    /// Returns `None` when the disk is full; callers surface that as a
    /// capacity error.
    pub fn allocate(&mut self, max_block: usize) -> Option<u8> {
        let limit = max_block.min(MAX_BLOCK);
        for block in 2..limit {
            if !self.used[block] {
                self.used[block] = true;
                return Some(block as u8);
            }
        }
        None
    }

    /// Whether a block is currently marked occupied
    pub fn is_used(&self, block: usize) -> bool {
        self.used.get(block).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::directory::DirEntry;
    use crate::filesystem::AmsdosName;

    #[test]
    fn test_rebuild_reserves_catalogue_blocks() {
        let mut bitmap = AllocationBitmap::default();
        let count = bitmap.rebuild(&Directory::default());
        assert_eq!(count, 0);
        assert!(bitmap.is_used(0));
        assert!(bitmap.is_used(1));
        assert!(!bitmap.is_used(2));
    }

    #[test]
    fn test_rebuild_marks_referenced_blocks_once() {
        let mut dir = Directory::default();
        let mut entry = DirEntry::new(&AmsdosName::parse("A.BIN"));
        entry.page_count = 16;
        entry.blocks[0] = 2;
        entry.blocks[1] = 3;
        dir.set_entry(0, entry);
        let mut other = DirEntry::new(&AmsdosName::parse("B.BIN"));
        other.page_count = 8;
        other.blocks[0] = 3; // cross-linked with A on purpose
        dir.set_entry(1, other);

        let mut bitmap = AllocationBitmap::default();
        assert_eq!(bitmap.rebuild(&dir), 2);
        assert!(bitmap.is_used(2));
        assert!(bitmap.is_used(3));
    }

    #[test]
    fn test_allocate_skips_reserved_and_marks() {
        let mut bitmap = AllocationBitmap::default();
        bitmap.rebuild(&Directory::default());
        assert_eq!(bitmap.allocate(MAX_BLOCK), Some(2));
        assert_eq!(bitmap.allocate(MAX_BLOCK), Some(3));
        assert!(bitmap.is_used(2));
    }

    #[test]
    fn test_allocate_exhaustion() {
        let mut bitmap = AllocationBitmap::default();
        bitmap.rebuild(&Directory::default());
        for expected in 2..6u8 {
            assert_eq!(bitmap.allocate(6), Some(expected));
        }
        assert_eq!(bitmap.allocate(6), None);
    }

    #[test]
    fn test_deleted_entries_free_their_blocks() {
        let mut dir = Directory::default();
        let mut entry = DirEntry::new(&AmsdosName::parse("A.BIN"));
        entry.page_count = 8;
        entry.blocks[0] = 2;
        dir.set_entry(0, entry);

        let mut bitmap = AllocationBitmap::default();
        assert_eq!(bitmap.rebuild(&dir), 1);

        let mut deleted = *dir.entry(0);
        deleted.user = crate::format::USER_DELETED;
        dir.set_entry(0, deleted);
        assert_eq!(bitmap.rebuild(&dir), 0);
        assert!(!bitmap.is_used(2));
    }
}
