//! DSK container variants, authoring layouts and format constants.

/// Format constants
pub mod constants;

pub use constants::*;

/// DSK container variant, detected from the image signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DskFormat {
    /// Standard DSK with one disk-wide nominal track size
    Standard,
    /// Extended DSK with a per-track size table
    Extended,
}

impl DskFormat {
    /// Get the signature bytes for this variant
    pub fn signature(&self) -> &'static [u8] {
        match self {
            DskFormat::Standard => STANDARD_DSK_SIGNATURE,
            DskFormat::Extended => EXTENDED_DSK_SIGNATURE,
        }
    }

    /// Get a human-readable name for this variant
    pub fn name(&self) -> &'static str {
        match self {
            DskFormat::Standard => "Standard DSK",
            DskFormat::Extended => "Extended DSK",
        }
    }
}

/// Authoring layout: selects the sector numbering base when formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskLayout {
    /// Data-only layout, sectors numbered from 0xC1
    Data,
    /// Bootable vendor layout, sectors numbered from 0x41
    Vendor,
}

impl DiskLayout {
    /// First sector id written by this layout
    pub fn first_sector_id(&self) -> u8 {
        match self {
            DiskLayout::Data => 0xC1,
            DiskLayout::Vendor => 0x41,
        }
    }
}

/// Per-track size information carried by the disk info block.
///
/// Plain images reserve a fixed 0xCC-byte area that carries no usable
/// information; extended images store one byte per track (size in 256-byte
/// units) followed by padding up to offset 0x100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeTable {
    /// Standard image, no per-track sizes
    Plain,
    /// Extended image with `head_count * track_count` size bytes
    Extended(Vec<u8>),
}

impl SizeTable {
    /// Whether this is the extended variant
    pub fn is_extended(&self) -> bool {
        matches!(self, SizeTable::Extended(_))
    }
}

/// Detect the container variant from the first signature bytes
pub fn detect_format(signature: &[u8]) -> Option<DskFormat> {
    if signature.len() < 16 {
        return None;
    }
    if signature.starts_with(b"EXTENDED CPC DSK") {
        Some(DskFormat::Extended)
    } else if signature.starts_with(b"MV -") {
        Some(DskFormat::Standard)
    } else {
        None
    }
}
