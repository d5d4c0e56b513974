//! Core image data structures (`DskImage`, `Track`, `SectorDescriptor`).

/// Geometry math: sector numbering base and in-track payload offsets
pub mod geometry;
/// Sector descriptor definition
pub mod sector;
/// Track definition and formatting
pub mod track;

pub use sector::SectorDescriptor;
pub use track::Track;

use crate::error::{DskError, Result, Warning};
use crate::format::{
    DiskLayout, DskFormat, SizeTable, CREATOR_SIGNATURE, CREATOR_SIZE, EXTENDED_DSK_SIGNATURE,
    SECTOR_SIZE, SIGNATURE_SIZE, STANDARD_DSK_SIGNATURE, TRACK_INFO_BLOCK_SIZE,
};
use std::path::Path;

/// Whole-image DSK container: header, optional per-track size table and the
/// ordered tracks.
///
/// Double-head images interleave their tracks by head: slot `2t` holds
/// `(track t, head 0)` and slot `2t + 1` holds `(track t, head 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DskImage {
    /// Raw signature bytes, kept verbatim for round-tripping
    pub(crate) signature: [u8; SIGNATURE_SIZE],
    /// Raw creator bytes, kept verbatim for round-tripping
    pub(crate) creator: [u8; CREATOR_SIZE],
    /// Number of tracks per head
    pub(crate) track_count: u8,
    /// Number of heads (1 or 2)
    pub(crate) head_count: u8,
    /// Nominal track data size (info block + sector payloads)
    pub(crate) data_size: u16,
    /// Per-track size information
    pub(crate) size_table: SizeTable,
    /// All tracks, interleaved by head for double-head images
    pub(crate) tracks: Vec<Track>,
}

impl DskImage {
    /// Open a DSK file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::io::reader::read_dsk(path)
    }

    /// Save the image to a DSK file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::io::writer::write_dsk(self, path)
    }

    /// Format a new image in memory.
    ///
    /// `layout` selects the sector numbering base (0xC1 for data, 0x41 for
    /// vendor). The extended container is used when `extended` is set or the
    /// layout is vendor, matching what the original firmware tools produce.
    pub fn format(
        sectors_per_track: u8,
        track_count: u8,
        head_count: u8,
        layout: DiskLayout,
        extended: bool,
    ) -> Self {
        let extended = extended || layout == DiskLayout::Vendor;

        let mut signature = [0u8; SIGNATURE_SIZE];
        signature.copy_from_slice(if extended {
            EXTENDED_DSK_SIGNATURE
        } else {
            STANDARD_DSK_SIGNATURE
        });
        let mut creator = [0u8; CREATOR_SIZE];
        creator[..CREATOR_SIGNATURE.len()].copy_from_slice(CREATOR_SIGNATURE);

        let size_table = if extended {
            // One byte per track, size in 256-byte units including the
            // track info block.
            let units =
                ((TRACK_INFO_BLOCK_SIZE + SECTOR_SIZE * sectors_per_track as usize) / 0x100) as u8;
            SizeTable::Extended(vec![units; head_count as usize * track_count as usize])
        } else {
            SizeTable::Plain
        };

        let mut image = Self {
            signature,
            creator,
            track_count,
            head_count,
            data_size: 0x100 + (SECTOR_SIZE as u16 * sectors_per_track as u16),
            size_table,
            tracks: vec![Track::default(); head_count as usize * track_count as usize],
        };

        let min_sector_id = layout.first_sector_id();
        for track in 0..track_count {
            for head in 0..head_count {
                let index = track as usize * head_count as usize + head as usize;
                image.tracks[index] = Track::format(track, head, min_sector_id, sectors_per_track);
            }
        }
        image
    }

    /// (Re)format one track in place, or append it when `index` is past the
    /// current end of the track array (growing the track count).
    pub fn format_track(
        &mut self,
        index: usize,
        track_number: u8,
        head: u8,
        min_sector_id: u8,
        sector_count: u8,
    ) {
        let track = Track::format(track_number, head, min_sector_id, sector_count);
        if index >= self.tracks.len() {
            self.tracks.push(track);
            self.track_count += 1;
        } else {
            self.tracks[index] = track;
        }
    }

    /// Container variant of this image
    pub fn format_kind(&self) -> DskFormat {
        if self.size_table.is_extended() {
            DskFormat::Extended
        } else {
            DskFormat::Standard
        }
    }

    /// Whether this is an extended-format image
    pub fn is_extended(&self) -> bool {
        self.size_table.is_extended()
    }

    /// Number of tracks per head
    pub fn track_count(&self) -> u8 {
        self.track_count
    }

    /// Number of heads
    pub fn head_count(&self) -> u8 {
        self.head_count
    }

    /// Nominal track data size from the image header
    pub fn nominal_data_size(&self) -> u16 {
        self.data_size
    }

    /// Creator string from the image header
    pub fn creator(&self) -> String {
        String::from_utf8_lossy(&self.creator)
            .trim_end_matches(['\0', ' '])
            .to_string()
    }

    /// All tracks in on-disk order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Get a track by its position in the track array
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Get a mutable track by its position in the track array
    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    /// Validate the image geometry.
    ///
    /// Returns a hard error only when the first sector id of track 0 is not
    /// one of the known numbering bases (0x01, 0x41, 0xC1). Everything else
    /// is reported as warnings: real-world images are frequently slightly
    /// non-conformant and must still be usable. Extended images skip the
    /// per-track geometry warnings because their geometry legitimately
    /// varies.
    pub fn check(&self) -> Result<Vec<Warning>> {
        let first = self.first_sector_id();
        if first != 0x01 && first != 0x41 && first != 0xC1 {
            return Err(DskError::BadFirstSector { id: first });
        }

        let mut warnings = Vec::new();
        if self.is_extended() {
            return Ok(warnings);
        }
        for (number, track) in self.tracks.iter().enumerate() {
            let number = number as u8;
            if track.sector_count != 9 {
                warnings.push(Warning::UnexpectedSectorCount {
                    track: number,
                    count: track.sector_count,
                });
            }
            let min = track.min_sector_id();
            let max = track.max_sector_id();
            if max.wrapping_sub(min) != 8 {
                warnings.push(Warning::IrregularSectorSpread {
                    track: number,
                    min,
                    max,
                });
            }
            if min != first {
                warnings.push(Warning::FirstSectorMismatch {
                    track: number,
                    found: min,
                    expected: first,
                });
            }
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_data_image() {
        let image = DskImage::format(9, 40, 1, DiskLayout::Data, false);
        assert_eq!(image.format_kind(), DskFormat::Standard);
        assert_eq!(image.track_count(), 40);
        assert_eq!(image.head_count(), 1);
        assert_eq!(image.tracks().len(), 40);
        assert_eq!(image.first_sector_id(), 0xC1);
        assert_eq!(image.nominal_data_size(), 0x100 + 9 * 512);
        assert_eq!(image.creator(), "amsdsk v0.1");
    }

    #[test]
    fn test_format_vendor_image_is_extended() {
        let image = DskImage::format(9, 40, 1, DiskLayout::Vendor, false);
        assert!(image.is_extended());
        assert_eq!(image.first_sector_id(), 0x41);
        match &image.size_table {
            SizeTable::Extended(table) => {
                assert_eq!(table.len(), 40);
                assert!(table.iter().all(|&units| units == 19)); // (256 + 4608) / 256
            }
            SizeTable::Plain => panic!("vendor image should carry a size table"),
        }
    }

    #[test]
    fn test_format_double_head_interleaves_tracks() {
        let image = DskImage::format(9, 10, 2, DiskLayout::Data, false);
        assert_eq!(image.tracks().len(), 20);
        for track in 0..10u8 {
            let side0 = image.track(track as usize * 2).unwrap();
            let side1 = image.track(track as usize * 2 + 1).unwrap();
            assert_eq!((side0.track_number, side0.head), (track, 0));
            assert_eq!((side1.track_number, side1.head), (track, 1));
        }
    }

    #[test]
    fn test_check_formatted_image_is_clean() {
        let image = DskImage::format(9, 40, 1, DiskLayout::Data, false);
        let warnings = image.check().expect("check should pass");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_check_rejects_unknown_first_sector() {
        let mut image = DskImage::format(9, 2, 1, DiskLayout::Data, false);
        for sect in image.tracks[0].sectors.iter_mut() {
            sect.sector_id += 0x10;
        }
        let result = image.check();
        assert!(matches!(result, Err(DskError::BadFirstSector { id: 0xD1 })));
    }

    #[test]
    fn test_check_warns_on_odd_sector_count() {
        let mut image = DskImage::format(9, 2, 1, DiskLayout::Data, false);
        image.tracks[1] = Track::format(1, 0, 0xC1, 8);
        image.tracks[1].data.resize(9 * 512, 0xE5);
        let warnings = image.check().expect("check should pass");
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnexpectedSectorCount { track: 1, count: 8 })));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::IrregularSectorSpread { track: 1, .. })));
    }

    #[test]
    fn test_format_track_appends_past_end() {
        let mut image = DskImage::format(9, 2, 1, DiskLayout::Data, false);
        assert_eq!(image.track_count(), 2);
        image.format_track(2, 2, 0, 0xC1, 9);
        assert_eq!(image.track_count(), 3);
        assert_eq!(image.tracks().len(), 3);
        assert_eq!(image.track(2).unwrap().track_number, 2);
    }

    #[test]
    fn test_format_track_rewrites_in_place() {
        let mut image = DskImage::format(9, 2, 1, DiskLayout::Data, false);
        image.tracks[1].data.fill(0x42);
        image.format_track(1, 1, 0, 0xC1, 9);
        assert_eq!(image.track_count(), 2);
        assert!(image.tracks[1].data.iter().all(|&b| b == 0xE5));
    }
}
