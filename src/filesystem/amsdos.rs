//! AMSDOS file store: format, list, read, import, delete and raw
//! sector-level copy on top of a [`DskImage`].

use crate::error::{DskError, Result, Warning};
use crate::filesystem::bitmap::AllocationBitmap;
use crate::filesystem::directory::{DirEntry, Directory};
use crate::filesystem::header::{try_parse_header, AmsdosHeader};
use crate::filesystem::AmsdosName;
use crate::format::{
    DiskLayout, BLOCK_SIZE, DIR_ENTRY_COUNT, DIR_ENTRY_SIZE, FILLER_BYTE, HEADER_SIZE, MAX_BLOCK,
    MAX_FILE_SIZE, SECTORS_PER_TRACK, SECTOR_SIZE, USER_DELETED,
};
use crate::image::DskImage;
use std::fs;
use std::path::Path;

/// Import mode for [`AmsdosDisk::put_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// ASCII file, stored headerless and padded to a 128-byte boundary
    Ascii,
    /// Protected BASIC, stored like ASCII
    Protected,
    /// Binary file with a loader header
    Binary,
}

impl SaveMode {
    /// Loader-header type byte for this mode
    pub fn file_type(&self) -> u8 {
        match self {
            SaveMode::Ascii => 0,
            SaveMode::Protected => 1,
            SaveMode::Binary => 2,
        }
    }
}

/// Options for importing a file into the store
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Import mode; forced to binary when a load or exec address is given
    pub mode: SaveMode,
    /// Load address written into a synthesized header
    pub load_address: u16,
    /// Execution address written into a synthesized header
    pub exec_address: u16,
    /// User number for the catalogue entries and header
    pub user: u8,
    /// Set the system attribute on the catalogue entries
    pub system: bool,
    /// Set the read-only attribute on the catalogue entries
    pub read_only: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mode: SaveMode::Binary,
            load_address: 0,
            exec_address: 0,
            user: 0,
            system: false,
            read_only: false,
        }
    }
}

/// A DSK image together with its AMSDOS catalogue cache and allocation
/// bitmap.
///
/// The three are constructed together when an image is opened or formatted.
/// The bitmap is derived from the catalogue and rebuilt before every
/// allocation; the catalogue cache is written through on every mutation, so
/// it stays in lockstep with the image bytes.
#[derive(Debug, Clone)]
pub struct AmsdosDisk {
    image: DskImage,
    catalogue: Directory,
    bitmap: AllocationBitmap,
}

impl AmsdosDisk {
    /// Format a new disk and mount it
    pub fn format(
        sectors_per_track: u8,
        track_count: u8,
        head_count: u8,
        layout: DiskLayout,
        extended: bool,
    ) -> Result<Self> {
        Self::from_image(DskImage::format(
            sectors_per_track,
            track_count,
            head_count,
            layout,
            extended,
        ))
    }

    /// Mount an already decoded image
    pub fn from_image(image: DskImage) -> Result<Self> {
        let mut disk = Self {
            image,
            catalogue: Directory::default(),
            bitmap: AllocationBitmap::default(),
        };
        disk.refresh_catalogue()?;
        Ok(disk)
    }

    /// Open a DSK file and mount it
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_image(DskImage::open(path)?)
    }

    /// Save the whole image back to a DSK file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)
    }

    /// The underlying image
    pub fn image(&self) -> &DskImage {
        &self.image
    }

    /// Give up the mount and return the image
    pub fn into_image(self) -> DskImage {
        self.image
    }

    /// Validate the image geometry (see [`DskImage::check`])
    pub fn check(&self) -> Result<Vec<Warning>> {
        self.image.check()
    }

    /// The cached catalogue
    pub fn catalogue(&self) -> &Directory {
        &self.catalogue
    }

    // ---- catalogue access ------------------------------------------------

    /// Physical position of a catalogue entry: sector id within the
    /// directory track, plus the byte offset of the entry inside that
    /// sector's payload.
    fn entry_location(&self, index: usize) -> Result<(usize, usize)> {
        let min_sect = self.image.first_sector_id();
        let sector_id = (index as u8 >> 4).wrapping_add(min_sect);
        let track = self.image.track_offset();
        let pos = self.image.data_position(track, sector_id, true)?;
        Ok((track, pos + ((index & 15) << 5)))
    }

    /// Decode one entry straight from the image bytes
    fn read_dir_entry(&self, index: usize) -> Result<DirEntry> {
        let (track, offset) = self.entry_location(index)?;
        let data = &self
            .image
            .track(track)
            .ok_or(DskError::InvalidTrack { track: track as u8 })?
            .data;
        let bytes: &[u8; DIR_ENTRY_SIZE] = data
            .get(offset..offset + DIR_ENTRY_SIZE)
            .ok_or(DskError::CatalogueExceeded)?
            .try_into()
            .map_err(|_| DskError::CatalogueExceeded)?;
        Ok(DirEntry::decode(bytes))
    }

    /// Write one entry through to the image bytes and the cache
    fn write_dir_entry(&mut self, index: usize, entry: &DirEntry) -> Result<()> {
        let (track, offset) = self.entry_location(index)?;
        let data = &mut self
            .image
            .track_mut(track)
            .ok_or(DskError::InvalidTrack { track: track as u8 })?
            .data;
        let slot = data
            .get_mut(offset..offset + DIR_ENTRY_SIZE)
            .ok_or(DskError::CatalogueExceeded)?;
        slot.copy_from_slice(&entry.encode());
        self.catalogue.set_entry(index, *entry);
        Ok(())
    }

    /// Re-read all 64 catalogue entries from the image into the cache
    pub fn refresh_catalogue(&mut self) -> Result<()> {
        for index in 0..DIR_ENTRY_COUNT {
            let entry = self.read_dir_entry(index)?;
            self.catalogue.set_entry(index, entry);
        }
        Ok(())
    }

    /// Find the first live entry carrying this name.
    ///
    /// The attribute bits are cleared on both sides of the comparison, so
    /// system or read-only files still match by name.
    pub fn file_exists(&self, name: &AmsdosName) -> Option<usize> {
        (0..DIR_ENTRY_COUNT).find(|&index| {
            let entry = self.catalogue.entry(index);
            !entry.is_deleted() && entry.matches_name(name)
        })
    }

    /// Indices of the first entry of each live file, in catalogue order
    pub fn file_indices(&self) -> Vec<usize> {
        let mut seen: Vec<([u8; 8], [u8; 3])> = Vec::new();
        let mut indices = Vec::new();
        for index in 0..DIR_ENTRY_COUNT {
            let entry = self.catalogue.entry(index);
            if entry.is_deleted() {
                continue;
            }
            let key = (entry.name, entry.ext);
            if !seen.contains(&key) {
                seen.push(key);
                indices.push(index);
            }
        }
        indices
    }

    /// Display name of the file whose chain starts at `index`
    pub fn entry_name(&self, index: usize) -> Option<String> {
        let entry = self.catalogue.entry(index);
        if entry.is_deleted() || entry.extent_index != 0 {
            return None;
        }
        Some(entry.display_name())
    }

    /// Size of the file whose chain starts at `index`, as the catalogue
    /// shows it (`"NN KiB"`), summed over every extent of the chain
    pub fn entry_size_string(&self, index: usize) -> Option<String> {
        let entry = self.catalogue.entry(index);
        if entry.is_deleted() || entry.extent_index != 0 {
            return None;
        }
        Some(format!("{} KiB", self.file_size_kib(entry)))
    }

    /// Total pages of every live entry sharing this entry's name, rounded
    /// up to whole KiB
    fn file_size_kib(&self, first: &DirEntry) -> usize {
        let pages: usize = self
            .catalogue
            .iter()
            .filter(|e| !e.is_deleted() && e.same_file(first))
            .map(|e| e.page_count as usize)
            .sum();
        (pages + 7) >> 3
    }

    /// Rebuild the bitmap from the catalogue and return the number of
    /// referenced blocks
    pub fn used_blocks(&mut self) -> usize {
        self.bitmap.rebuild(&self.catalogue)
    }

    // ---- block access ----------------------------------------------------

    /// Append formatted tracks until `track` exists
    fn ensure_track(&mut self, track: usize) {
        let min_sect = self.image.first_sector_id();
        let heads = self.image.head_count().max(1) as usize;
        while self.image.tracks().len() <= track {
            let index = self.image.tracks().len();
            let track_number = (index / heads) as u8;
            let head = (index % heads) as u8;
            self.image
                .format_track(index, track_number, head, min_sect, SECTORS_PER_TRACK as u8);
        }
    }

    /// Write one 1024-byte block (two sectors) from `data[offset..]`
    fn write_block(&mut self, block: usize, data: &[u8], offset: usize) -> Result<()> {
        let min_sect = self.image.first_sector_id();
        let (mut track, mut sector) = self.image.block_position(block);
        let mut offset = offset;
        for _ in 0..2 {
            if sector > 8 {
                track += 1;
                sector = 0;
            }
            self.ensure_track(track);
            let pos = self.image.data_position(track, sector as u8 + min_sect, true)?;
            let chunk = SECTOR_SIZE.min(data.len().saturating_sub(offset));
            if chunk > 0 {
                let track_data = &mut self
                    .image
                    .track_mut(track)
                    .ok_or(DskError::InvalidTrack { track: track as u8 })?
                    .data;
                let slot = track_data
                    .get_mut(pos..pos + chunk)
                    .ok_or(DskError::InvalidSector {
                        track: track as u8,
                        id: sector as u8 + min_sect,
                    })?;
                slot.copy_from_slice(&data[offset..offset + chunk]);
            }
            offset += SECTOR_SIZE;
            sector += 1;
        }
        Ok(())
    }

    /// Read one 1024-byte block (two sectors)
    fn read_block(&self, block: usize) -> Result<Vec<u8>> {
        let min_sect = self.image.first_sector_id();
        let (mut track, mut sector) = self.image.block_position(block);
        let mut bytes = Vec::with_capacity(BLOCK_SIZE);
        for _ in 0..2 {
            if sector > 8 {
                track += 1;
                sector = 0;
            }
            let pos = self.image.data_position(track, sector as u8 + min_sect, true)?;
            let track_data = &self
                .image
                .track(track)
                .ok_or(DskError::InvalidTrack { track: track as u8 })?
                .data;
            let chunk = track_data
                .get(pos..pos + SECTOR_SIZE)
                .ok_or(DskError::InvalidSector {
                    track: track as u8,
                    id: sector as u8 + min_sect,
                })?;
            bytes.extend_from_slice(chunk);
            sector += 1;
        }
        Ok(bytes)
    }

    // ---- import ----------------------------------------------------------

    /// Import a host file, naming it after the path's 8.3 normalization
    pub fn put_file<P: AsRef<Path>>(&mut self, path: P, options: &ImportOptions) -> Result<()> {
        let data = fs::read(&path)?;
        let name = AmsdosName::from_path(&path);
        self.put_bytes(&name, &data, options)
    }

    /// Import a byte blob under the given name.
    ///
    /// A loader header is detected at offset 0 through its checksum; when
    /// absent one is synthesized from the options. ASCII and protected
    /// imports are stored headerless, padded to a 128-byte boundary with
    /// the 0x1A end-of-file marker; binary imports carry their (possibly
    /// synthesized) header.
    pub fn put_bytes(
        &mut self,
        name: &AmsdosName,
        data: &[u8],
        options: &ImportOptions,
    ) -> Result<()> {
        if data.len() > MAX_FILE_SIZE {
            return Err(DskError::FileTooLarge { size: data.len() });
        }
        self.refresh_catalogue()?;

        let mut mode = options.mode;
        let existing = try_parse_header(data);
        if existing.is_none() && (options.load_address != 0 || options.exec_address != 0) {
            mode = SaveMode::Binary;
        }

        let mut buffer = data.to_vec();
        let mut length = data.len();
        match mode {
            SaveMode::Ascii | SaveMode::Protected => {
                if existing.is_some() {
                    buffer.drain(..HEADER_SIZE);
                    length -= HEADER_SIZE;
                }
                if length % 128 != 0 {
                    let padded = (length + 127) & !127;
                    buffer.resize(padded, 0x1A);
                }
            }
            SaveMode::Binary => {
                if existing.is_none() {
                    let header = AmsdosHeader::new(
                        name,
                        length as u32,
                        options.load_address,
                        options.exec_address,
                        options.user,
                        mode,
                    );
                    buffer.splice(..0, header.to_bytes());
                    length += HEADER_SIZE;
                }
            }
        }

        self.copy_file(&buffer, name, length, options)
    }

    /// Allocate directory entries and blocks for a prepared buffer and
    /// write it out.
    ///
    /// On a full disk or full directory the error is returned immediately;
    /// entries and blocks already claimed are not rolled back. This mirrors
    /// the firmware's at-least-once behaviour and keeps partially written
    /// chains visible for inspection.
    fn copy_file(
        &mut self,
        data: &[u8],
        name: &AmsdosName,
        length: usize,
        options: &ImportOptions,
    ) -> Result<()> {
        self.bitmap.rebuild(&self.catalogue);

        // The block writer always moves whole sectors; keep the tail in
        // bounds.
        let mut buffer = data.to_vec();
        let padded = length.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
        if buffer.len() < padded {
            buffer.resize(padded, 0);
        }

        let mut position = 0usize;
        let mut extent = 0u8;
        while position < length {
            let dir_index = self
                .catalogue
                .first_free()
                .ok_or(DskError::DirectoryFull)?;

            let mut entry = DirEntry::new(name);
            entry.user = options.user;
            if options.read_only {
                entry.ext[0] |= 0x80;
            }
            if options.system {
                entry.ext[1] |= 0x80;
            }
            entry.extent_index = extent;
            extent = extent.wrapping_add(1);

            let pages = ((length - position + 127) >> 7).min(128);
            entry.page_count = pages as u8;

            for slot in 0..entry.block_count() {
                let block = self
                    .bitmap
                    .allocate(MAX_BLOCK)
                    .ok_or(DskError::DiskFull)?;
                entry.blocks[slot] = block;
                self.write_block(block as usize, &buffer, position)?;
                position += BLOCK_SIZE;
            }
            self.write_dir_entry(dir_index, &entry)?;
        }
        Ok(())
    }

    // ---- export ----------------------------------------------------------

    /// Read a whole file by name.
    ///
    /// Returns the stored bytes, header included when the file carries one.
    /// If the first block starts with a valid header, its declared size
    /// plus the header length is the authoritative total, unless the raw
    /// data is shorter.
    pub fn get_file(&mut self, name: &AmsdosName) -> Result<Vec<u8>> {
        self.refresh_catalogue()?;
        let index = self
            .file_exists(name)
            .ok_or_else(|| DskError::FileNotFound(name.to_string()))?;

        let first = *self.catalogue.entry(index);
        let mut bytes = Vec::new();
        let mut declared_total = 0usize;
        let mut first_block = true;
        let mut i = index;
        loop {
            let entry = *self.catalogue.entry(i);
            for slot in 0..entry.block_count() {
                let block = self.read_block(entry.blocks[slot] as usize)?;
                if first_block {
                    if let Some(header) = try_parse_header(&block) {
                        declared_total = header.payload_size() + HEADER_SIZE;
                    }
                    first_block = false;
                }
                bytes.extend_from_slice(&block);
            }
            i += 1;
            if i >= DIR_ENTRY_COUNT {
                return Err(DskError::CatalogueExceeded);
            }
            if !self.catalogue.entry(i).same_file(&first) {
                break;
            }
        }

        if declared_total == 0 || declared_total > bytes.len() {
            declared_total = bytes.len();
        }
        bytes.truncate(declared_total);
        Ok(bytes)
    }

    /// Read a file by catalogue index for display: a detected header is
    /// stripped from the returned bytes, and the logical size excludes
    /// trailing 0xE5 filler left over from formatting.
    pub fn view_file(&mut self, index: usize) -> Result<(Vec<u8>, usize)> {
        self.refresh_catalogue()?;
        let first = *self.catalogue.entry(index);
        let mut bytes = Vec::new();
        let mut declared_size = 0usize;
        let mut first_block = true;
        let mut i = index;
        loop {
            let entry = *self.catalogue.entry(i);
            for slot in 0..entry.block_count() {
                let mut block = self.read_block(entry.blocks[slot] as usize)?;
                if first_block {
                    if let Some(header) = try_parse_header(&block) {
                        block.drain(..HEADER_SIZE);
                        declared_size = header.payload_size();
                    }
                    first_block = false;
                }
                bytes.extend_from_slice(&block);
            }
            i += 1;
            if i >= DIR_ENTRY_COUNT {
                return Err(DskError::CatalogueExceeded);
            }
            if !self.catalogue.entry(i).same_file(&first) {
                break;
            }
        }

        let mut logical_size = if declared_size == 0 {
            bytes.len()
        } else {
            declared_size
        };
        for (i, &byte) in bytes.iter().enumerate().rev() {
            if byte == FILLER_BYTE {
                logical_size = i;
            } else {
                break;
            }
        }
        Ok((bytes, logical_size))
    }

    /// Mark every entry of the chain starting at `index` deleted.
    ///
    /// Block contents are left in place; the next bitmap rebuild simply
    /// stops referencing them.
    pub fn remove_file(&mut self, index: usize) -> Result<()> {
        self.refresh_catalogue()?;
        let first = *self.catalogue.entry(index);
        if first.is_deleted() {
            return Err(DskError::FileNotFound(first.display_name()));
        }
        let mut i = index;
        while i < DIR_ENTRY_COUNT && self.catalogue.entry(i).same_file(&first) {
            let mut entry = *self.catalogue.entry(i);
            entry.user = USER_DELETED;
            self.write_dir_entry(i, &entry)?;
            i += 1;
        }
        Ok(())
    }

    // ---- raw sector streams ----------------------------------------------

    /// Write a byte blob as a raw sector stream starting at an explicit
    /// physical position, bypassing the catalogue entirely.
    ///
    /// Sectors past id 8 wrap to the next track; tracks past the formatted
    /// area are appended on the fly. Returns the position just after the
    /// last sector written.
    pub fn copy_raw_file(
        &mut self,
        data: &[u8],
        track: usize,
        sector: usize,
    ) -> Result<(usize, usize)> {
        let min_sect = self.image.first_sector_id();
        let mut track = track;
        let mut sector = sector;
        let mut position = 0usize;
        while position < data.len() {
            if sector > 8 {
                track += 1;
                sector = 0;
            }
            self.ensure_track(track);
            let pos = self.image.data_position(track, sector as u8 + min_sect, true)?;
            let chunk = SECTOR_SIZE.min(data.len() - position);
            let track_data = &mut self
                .image
                .track_mut(track)
                .ok_or(DskError::InvalidTrack { track: track as u8 })?
                .data;
            let slot = track_data
                .get_mut(pos..pos + chunk)
                .ok_or(DskError::InvalidSector {
                    track: track as u8,
                    id: sector as u8 + min_sect,
                })?;
            slot.copy_from_slice(&data[position..position + chunk]);
            position += chunk;
            sector += 1;
        }
        Ok((track, sector))
    }

    /// Read `length` bytes as a raw sector stream starting at an explicit
    /// physical position. Returns the position just after the last sector
    /// read, along with the bytes.
    pub fn extract_raw_file(
        &self,
        length: usize,
        track: usize,
        sector: usize,
    ) -> Result<(usize, usize, Vec<u8>)> {
        let min_sect = self.image.first_sector_id();
        let mut track = track;
        let mut sector = sector;
        let mut bytes = Vec::with_capacity(length);
        while bytes.len() < length {
            if sector > 8 {
                track += 1;
                sector = 0;
            }
            let pos = self.image.data_position(track, sector as u8 + min_sect, true)?;
            let track_data = &self
                .image
                .track(track)
                .ok_or(DskError::InvalidTrack { track: track as u8 })?
                .data;
            let chunk = track_data
                .get(pos..pos + SECTOR_SIZE)
                .ok_or(DskError::InvalidSector {
                    track: track as u8,
                    id: sector as u8 + min_sect,
                })?;
            bytes.extend_from_slice(chunk);
            sector += 1;
        }
        bytes.truncate(length);
        Ok((track, sector, bytes))
    }
}
