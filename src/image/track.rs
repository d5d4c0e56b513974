//! Track data structure.

use crate::format::{FILLER_BYTE, GAP3_LENGTH, MAX_SECTORS_PER_TRACK, SECTOR_SIZE};
use crate::image::sector::SectorDescriptor;

/// One physical track: fixed header fields, up to 29 sector descriptors and
/// the concatenated sector payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Physical track number
    pub track_number: u8,
    /// Physical head number (0 or 1)
    pub head: u8,
    /// Nominal sector size code for the whole track
    pub sector_size_code: u8,
    /// Number of live sector descriptors
    pub sector_count: u8,
    /// GAP#3 length
    pub gap3: u8,
    /// Filler byte used when the track was formatted
    pub filler_byte: u8,
    /// Sector descriptor table; only the first `sector_count` are live
    pub sectors: [SectorDescriptor; MAX_SECTORS_PER_TRACK],
    /// Concatenated sector payloads
    pub data: Vec<u8>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            track_number: 0,
            head: 0,
            sector_size_code: 2,
            sector_count: 0,
            gap3: GAP3_LENGTH,
            filler_byte: FILLER_BYTE,
            sectors: [SectorDescriptor::default(); MAX_SECTORS_PER_TRACK],
            data: Vec::new(),
        }
    }
}

impl Track {
    /// Format a track in place: skip-4 interleaved sector ids starting at
    /// `min_sector_id`, 512-byte sectors, data filled with the filler byte.
    pub fn format(track_number: u8, head: u8, min_sector_id: u8, sector_count: u8) -> Self {
        let sector_count = sector_count.min(MAX_SECTORS_PER_TRACK as u8);
        let mut track = Track {
            track_number,
            head,
            sector_count,
            ..Track::default()
        };
        // Skip-4 interleave: even slots take ids min, min+1, ... and odd
        // slots the same run shifted up by 4.
        let mut slot = 0usize;
        let mut seq = 0u8;
        while slot < sector_count as usize {
            track.sectors[slot] = SectorDescriptor::new(track_number, head, seq + min_sector_id);
            seq += 1;
            slot += 1;
            if slot < sector_count as usize {
                track.sectors[slot] =
                    SectorDescriptor::new(track_number, head, seq + min_sector_id + 4);
                slot += 1;
            }
        }
        track.data = vec![FILLER_BYTE; SECTOR_SIZE * sector_count as usize];
        track
    }

    /// Whether this track holds no sectors (unformatted or failed to decode)
    pub fn is_empty(&self) -> bool {
        self.sector_count == 0
    }

    /// The live sector descriptors
    pub fn live_sectors(&self) -> &[SectorDescriptor] {
        let count = (self.sector_count as usize).min(MAX_SECTORS_PER_TRACK);
        &self.sectors[..count]
    }

    /// Sum of the stored sizes over the live descriptors
    pub fn declared_data_size(&self) -> usize {
        self.live_sectors().iter().map(|s| s.stored_size()).sum()
    }

    /// Nominal payload length implied by the track-wide size code
    pub fn nominal_data_size(&self) -> usize {
        self.sector_size_code as usize * 0x100 * self.sector_count as usize
    }

    /// Lowest sector id among the live descriptors, 0xFF when empty
    pub fn min_sector_id(&self) -> u8 {
        self.live_sectors()
            .iter()
            .map(|s| s.sector_id)
            .min()
            .unwrap_or(0xFF)
    }

    /// Highest sector id among the live descriptors, 0 when empty
    pub fn max_sector_id(&self) -> u8 {
        self.live_sectors()
            .iter()
            .map(|s| s.sector_id)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_track_is_empty() {
        let track = Track::default();
        assert!(track.is_empty());
        assert_eq!(track.min_sector_id(), 0xFF);
        assert_eq!(track.declared_data_size(), 0);
    }

    #[test]
    fn test_format_interleave_order() {
        let track = Track::format(0, 0, 0xC1, 9);
        let ids: Vec<u8> = track.live_sectors().iter().map(|s| s.sector_id).collect();
        assert_eq!(
            ids,
            vec![0xC1, 0xC6, 0xC2, 0xC7, 0xC3, 0xC8, 0xC4, 0xC9, 0xC5]
        );
    }

    #[test]
    fn test_format_fills_data() {
        let track = Track::format(7, 0, 0x41, 9);
        assert_eq!(track.data.len(), 9 * 512);
        assert!(track.data.iter().all(|&b| b == FILLER_BYTE));
        assert_eq!(track.track_number, 7);
        assert_eq!(track.min_sector_id(), 0x41);
        assert_eq!(track.max_sector_id(), 0x49);
    }

    #[test]
    fn test_data_sizes_agree_after_format() {
        let track = Track::format(0, 0, 0xC1, 9);
        assert_eq!(track.declared_data_size(), track.nominal_data_size());
    }
}
