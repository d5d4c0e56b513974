//! Geometry math: sector numbering base, in-track payload offsets and the
//! block/catalogue to CHS mapping.

use crate::error::{DskError, Result};
use crate::format::{SECTORS_PER_BLOCK, SECTORS_PER_TRACK};
use crate::image::DskImage;

impl DskImage {
    /// Lowest sector id observed on track 0.
    ///
    /// This is "the" sector numbering base for the whole image: 0xC1 for
    /// data layouts, 0x41 for vendor layouts, 0x01 for IBM-style layouts.
    /// Returns 0xFF when track 0 is missing or unformatted, which
    /// [`check`](DskImage::check) then rejects.
    pub fn first_sector_id(&self) -> u8 {
        self.tracks
            .first()
            .map(|track| track.min_sector_id())
            .unwrap_or(0xFF)
    }

    /// Byte offset of a sector's payload inside its track data.
    ///
    /// Scans the descriptor table accumulating stored sizes until the
    /// matching sector is found: by physical id when `physical` is set, by
    /// ordinal index otherwise. A missing sector yields the offset past the
    /// last descriptor, exactly like the firmware routine this mirrors.
    pub fn data_position(&self, track: usize, sector: u8, physical: bool) -> Result<usize> {
        let tr = self
            .tracks
            .get(track)
            .ok_or(DskError::InvalidTrack { track: track as u8 })?;
        let mut pos = 0usize;
        for (ordinal, sect) in tr.live_sectors().iter().enumerate() {
            if (physical && sect.sector_id == sector) || (!physical && ordinal == sector as usize) {
                break;
            }
            pos += sect.stored_size();
        }
        Ok(pos)
    }

    /// Track shift applied when mapping blocks and catalogue sectors to
    /// physical tracks: vendor layouts reserve two boot tracks, 0x01
    /// layouts one.
    pub(crate) fn track_offset(&self) -> usize {
        match self.first_sector_id() {
            0x41 => 2,
            0x01 => 1,
            _ => 0,
        }
    }

    /// Map an allocation block to its starting physical position.
    ///
    /// Blocks are two 512-byte sectors on a nine-sector track; the layout
    /// track shift is already applied.
    pub(crate) fn block_position(&self, block: usize) -> (usize, usize) {
        let sector_index = block * SECTORS_PER_BLOCK;
        let track = sector_index / SECTORS_PER_TRACK + self.track_offset();
        let sector = sector_index % SECTORS_PER_TRACK;
        (track, sector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DiskLayout;

    #[test]
    fn test_first_sector_id_per_layout() {
        let data = DskImage::format(9, 2, 1, DiskLayout::Data, false);
        assert_eq!(data.first_sector_id(), 0xC1);

        let vendor = DskImage::format(9, 2, 1, DiskLayout::Vendor, false);
        assert_eq!(vendor.first_sector_id(), 0x41);
    }

    #[test]
    fn test_data_position_by_physical_id() {
        let image = DskImage::format(9, 1, 1, DiskLayout::Data, false);
        // Interleaved order is C1 C6 C2 C7 C3 C8 C4 C9 C5, 512 bytes each
        assert_eq!(image.data_position(0, 0xC1, true).unwrap(), 0);
        assert_eq!(image.data_position(0, 0xC6, true).unwrap(), 512);
        assert_eq!(image.data_position(0, 0xC2, true).unwrap(), 1024);
        assert_eq!(image.data_position(0, 0xC5, true).unwrap(), 8 * 512);
    }

    #[test]
    fn test_data_position_by_ordinal() {
        let image = DskImage::format(9, 1, 1, DiskLayout::Data, false);
        for ordinal in 0..9u8 {
            assert_eq!(
                image.data_position(0, ordinal, false).unwrap(),
                ordinal as usize * 512
            );
        }
    }

    #[test]
    fn test_data_position_invalid_track() {
        let image = DskImage::format(9, 2, 1, DiskLayout::Data, false);
        assert!(matches!(
            image.data_position(5, 0xC1, true),
            Err(DskError::InvalidTrack { track: 5 })
        ));
    }

    #[test]
    fn test_block_position_applies_layout_offset() {
        let data = DskImage::format(9, 2, 1, DiskLayout::Data, false);
        assert_eq!(data.block_position(0), (0, 0));
        assert_eq!(data.block_position(4), (0, 8));
        assert_eq!(data.block_position(5), (1, 1));

        let vendor = DskImage::format(9, 4, 1, DiskLayout::Vendor, false);
        assert_eq!(vendor.block_position(0), (2, 0));
        assert_eq!(vendor.block_position(5), (3, 1));
    }
}
