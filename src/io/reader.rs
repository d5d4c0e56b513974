//! DSK file reader.

use crate::error::{DskError, Result};
use crate::format::{
    detect_format, DskFormat, SizeTable, CREATOR_SIZE, MAX_SECTORS_PER_TRACK,
    PLAIN_SIZE_TABLE_SIZE, SIGNATURE_SIZE, TRACK_MARKER_SIZE,
};
use crate::image::{DskImage, SectorDescriptor, Track};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read a DSK file from disk
pub fn read_dsk<P: AsRef<Path>>(path: P) -> Result<DskImage> {
    let mut file = File::open(path)?;
    read_image(&mut file)
}

/// Decode a DSK image from any byte source.
///
/// The signature selects plain vs extended decoding. Individual tracks that
/// fail to decode are replaced with empty tracks rather than aborting the
/// whole image; many archived DSKs are truncated or slightly malformed and
/// still need to be usable.
pub fn read_image<R: Read>(r: &mut R) -> Result<DskImage> {
    let mut signature = [0u8; SIGNATURE_SIZE];
    r.read_exact(&mut signature)?;
    let format = detect_format(&signature).ok_or_else(|| {
        DskError::UnsupportedFormat(String::from_utf8_lossy(&signature[..16]).into_owned())
    })?;

    let mut creator = [0u8; CREATOR_SIZE];
    r.read_exact(&mut creator)?;
    let track_count = read_u8(r)?;
    let head_count = read_u8(r)?;
    let data_size = read_u16_le(r)?;

    let size_table = match format {
        DskFormat::Standard => {
            let mut reserved = [0u8; PLAIN_SIZE_TABLE_SIZE];
            r.read_exact(&mut reserved)?;
            SizeTable::Plain
        }
        DskFormat::Extended => {
            let len = head_count as usize * track_count as usize;
            let mut table = vec![0u8; len];
            r.read_exact(&mut table)?;
            // Info block is padded up to offset 0x100
            let padding = 0x100usize.saturating_sub(52 + len);
            skip(r, padding)?;
            SizeTable::Extended(table)
        }
    };

    let total_tracks = track_count as usize * head_count as usize;
    let mut tracks = Vec::with_capacity(total_tracks);
    for index in 0..total_tracks {
        match read_track(r) {
            Ok(track) => tracks.push(track),
            Err(err) => {
                log::warn!("track {index} failed to decode, keeping it empty: {err}");
                tracks.push(Track::default());
            }
        }
    }

    Ok(DskImage {
        signature,
        creator,
        track_count,
        head_count,
        data_size,
        size_table,
        tracks,
    })
}

/// Read a single track: 256-byte info block followed by the sector payloads
fn read_track<R: Read>(r: &mut R) -> Result<Track> {
    let mut marker = [0u8; TRACK_MARKER_SIZE];
    r.read_exact(&mut marker)?;
    if !marker.starts_with(b"Track-Info") {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "missing Track-Info marker").into());
    }

    let mut track = Track {
        track_number: read_u8(r)?,
        head: read_u8(r)?,
        ..Track::default()
    };
    skip(r, 2)?; // unused
    track.sector_size_code = read_u8(r)?;
    track.sector_count = read_u8(r)?;
    track.gap3 = read_u8(r)?;
    track.filler_byte = read_u8(r)?;

    // All 29 descriptor slots are always present on disk
    let live = (track.sector_count as usize).min(MAX_SECTORS_PER_TRACK);
    let mut declared_total = 0usize;
    for slot in 0..MAX_SECTORS_PER_TRACK {
        let sect = read_sector_descriptor(r)?;
        if slot < live {
            declared_total += sect.declared_size as usize;
            track.sectors[slot] = sect;
        }
    }

    // The declared sizes are the truth; the nominal track-wide size only
    // wins when the descriptors declare less than it.
    let data_len = declared_total.max(track.nominal_data_size());
    if declared_total > track.nominal_data_size() {
        log::warn!(
            "track {}: declared sector data {} exceeds nominal size {}, enlarging",
            track.track_number,
            declared_total,
            track.nominal_data_size()
        );
    }
    track.data = vec![0u8; data_len];
    r.read_exact(&mut track.data)?;
    Ok(track)
}

/// Read one 8-byte sector descriptor
fn read_sector_descriptor<R: Read>(r: &mut R) -> Result<SectorDescriptor> {
    Ok(SectorDescriptor {
        track: read_u8(r)?,
        head: read_u8(r)?,
        sector_id: read_u8(r)?,
        size_code: read_u8(r)?,
        unused: read_u16_le(r)?,
        declared_size: read_u16_le(r)?,
    })
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16_le<R: Read>(r: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn skip<R: Read>(r: &mut R, count: usize) -> Result<()> {
    io::copy(&mut r.take(count as u64), &mut io::sink())?;
    Ok(())
}
