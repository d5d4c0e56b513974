//! DSK file writer.

use crate::error::Result;
use crate::format::{SizeTable, MAX_SECTORS_PER_TRACK, PLAIN_SIZE_TABLE_SIZE, TRACK_MARKER_SIZE,
    TRACK_INFO_MARKER};
use crate::image::{DskImage, SectorDescriptor, Track};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a DSK file to disk
pub fn write_dsk<P: AsRef<Path>>(image: &DskImage, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    write_image(image, &mut file)
}

/// Encode a DSK image to any byte sink.
///
/// Exact inverse of [`read_image`](crate::io::reader::read_image): the same
/// size-table padding rules apply, so a well-formed image round-trips
/// byte-identically.
pub fn write_image<W: Write>(image: &DskImage, w: &mut W) -> Result<()> {
    w.write_all(&image.signature)?;
    w.write_all(&image.creator)?;
    w.write_all(&[image.track_count, image.head_count])?;
    w.write_all(&image.data_size.to_le_bytes())?;

    match &image.size_table {
        SizeTable::Plain => w.write_all(&[0u8; PLAIN_SIZE_TABLE_SIZE])?,
        SizeTable::Extended(table) => {
            w.write_all(table)?;
            let padding = 0x100usize.saturating_sub(52 + table.len());
            w.write_all(&vec![0u8; padding])?;
        }
    }

    for track in image.tracks() {
        write_track(track, w)?;
    }
    Ok(())
}

/// Write a single track: 256-byte info block followed by the payloads
fn write_track<W: Write>(track: &Track, w: &mut W) -> Result<()> {
    let mut marker = [0u8; TRACK_MARKER_SIZE];
    marker[..TRACK_INFO_MARKER.len()].copy_from_slice(TRACK_INFO_MARKER);
    w.write_all(&marker)?;

    w.write_all(&[track.track_number, track.head, 0, 0])?;
    w.write_all(&[
        track.sector_size_code,
        track.sector_count,
        track.gap3,
        track.filler_byte,
    ])?;

    // All 29 descriptor slots are always written; dead slots are zeros
    let live = (track.sector_count as usize).min(MAX_SECTORS_PER_TRACK);
    for slot in 0..MAX_SECTORS_PER_TRACK {
        if slot < live {
            write_sector_descriptor(&track.sectors[slot], w)?;
        } else {
            write_sector_descriptor(&SectorDescriptor::default(), w)?;
        }
    }

    w.write_all(&track.data)?;
    Ok(())
}

/// Write one 8-byte sector descriptor
fn write_sector_descriptor<W: Write>(sect: &SectorDescriptor, w: &mut W) -> Result<()> {
    w.write_all(&[sect.track, sect.head, sect.sector_id, sect.size_code])?;
    w.write_all(&sect.unused.to_le_bytes())?;
    w.write_all(&sect.declared_size.to_le_bytes())?;
    Ok(())
}

impl DskImage {
    /// Encode the image into a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        write_image(self, &mut bytes)?;
        Ok(bytes)
    }

    /// Decode an image from a byte slice
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        crate::io::reader::read_image(&mut &bytes[..])
    }
}
