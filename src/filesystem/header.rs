//! AMSDOS loader header codec.
//!
//! Every AMSDOS binary file starts with a 128-byte header carrying the load
//! and execution addresses and a 16-bit additive checksum. The checksum is
//! the gate: a blob whose stored checksum does not match the computed one is
//! simply not a header, and its 128 bytes belong to the payload.

use crate::filesystem::{AmsdosName, SaveMode};
use crate::format::HEADER_SIZE;

/// Number of leading header bytes covered by the checksum
const CHECKSUM_SPAN: usize = 67;

/// Decoded AMSDOS loader header.
///
/// The two reserved areas are not represented; they are written as zeros
/// when a header is synthesized, and parsed headers keep their raw bytes in
/// the payload anyway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmsdosHeader {
    /// User number
    pub user: u8,
    /// File name, 15 bytes (padded 8.3 form plus slack)
    pub filename: [u8; 15],
    /// Cassette block number
    pub block_num: u8,
    /// Last-block flag
    pub last_block: u8,
    /// File type: 0 BASIC, 1 protected BASIC, 2 binary, 3 protected binary
    pub file_type: u8,
    /// Payload size in bytes
    pub size: u16,
    /// Load address
    pub load_address: u16,
    /// First-block flag
    pub first_block: u8,
    /// Logical payload size
    pub logical_size: u16,
    /// Execution address
    pub exec_address: u16,
    /// Payload size duplicate
    pub size2: u16,
    /// Third length byte, making the declared size 24-bit
    pub big_length: u8,
    /// Stored checksum over the first 67 header bytes
    pub checksum: u16,
}

impl AmsdosHeader {
    /// Synthesize a header for a payload that does not carry one.
    ///
    /// The low 16 bits of `size` land in the three size fields; the
    /// overflow byte goes into `big_length`, so the full 64 KiB file size
    /// is still representable.
    pub fn new(
        name: &AmsdosName,
        size: u32,
        load_address: u16,
        exec_address: u16,
        user: u8,
        mode: SaveMode,
    ) -> Self {
        let mut filename = [0u8; 15];
        filename[..8].copy_from_slice(&name.name);
        filename[8] = b'.';
        filename[9..12].copy_from_slice(&name.ext);
        let short = size as u16;
        let mut header = Self {
            user,
            filename,
            file_type: mode.file_type(),
            size: short,
            load_address,
            logical_size: short,
            exec_address,
            size2: short,
            big_length: (size >> 16) as u8,
            ..Self::default()
        };
        header.checksum = checksum16(&header.to_bytes()[..CHECKSUM_SPAN]);
        header
    }

    /// Declared payload size, `big_length` overflow included
    pub fn payload_size(&self) -> usize {
        self.size as usize + ((self.big_length as usize) << 16)
    }

    /// Encode to the 128-byte on-disk form, reserved areas zeroed.
    ///
    /// The stored checksum field is written as-is; callers recompute it
    /// after changing any covered field.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = self.user;
        bytes[1..16].copy_from_slice(&self.filename);
        bytes[16] = self.block_num;
        bytes[17] = self.last_block;
        bytes[18] = self.file_type;
        bytes[19..21].copy_from_slice(&self.size.to_le_bytes());
        bytes[21..23].copy_from_slice(&self.load_address.to_le_bytes());
        bytes[23] = self.first_block;
        bytes[24..26].copy_from_slice(&self.logical_size.to_le_bytes());
        bytes[26..28].copy_from_slice(&self.exec_address.to_le_bytes());
        // 28..64 reserved
        bytes[64..66].copy_from_slice(&self.size2.to_le_bytes());
        bytes[66] = self.big_length;
        bytes[67..69].copy_from_slice(&self.checksum.to_le_bytes());
        // 69..128 reserved
        bytes
    }

    /// Decode from the 128-byte on-disk form without validating the checksum
    fn decode(bytes: &[u8]) -> Self {
        let mut filename = [0u8; 15];
        filename.copy_from_slice(&bytes[1..16]);
        Self {
            user: bytes[0],
            filename,
            block_num: bytes[16],
            last_block: bytes[17],
            file_type: bytes[18],
            size: u16::from_le_bytes([bytes[19], bytes[20]]),
            load_address: u16::from_le_bytes([bytes[21], bytes[22]]),
            first_block: bytes[23],
            logical_size: u16::from_le_bytes([bytes[24], bytes[25]]),
            exec_address: u16::from_le_bytes([bytes[26], bytes[27]]),
            size2: u16::from_le_bytes([bytes[64], bytes[65]]),
            big_length: bytes[66],
            checksum: u16::from_le_bytes([bytes[67], bytes[68]]),
        }
    }

    /// Human-readable file type
    pub fn type_name(&self) -> &'static str {
        match self.file_type {
            0 => "BASIC",
            1 => "BASIC(P)",
            2 => "BINARY",
            3 => "BINARY(P)",
            _ => "UNKNOWN",
        }
    }
}

/// 16-bit additive checksum over a byte slice
pub fn checksum16(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(b as u16))
}

/// Try to parse a loader header at the start of a byte blob.
///
/// Returns `None` when the blob is shorter than 128 bytes or the stored
/// checksum does not match the checksum computed over the header bytes.
pub fn try_parse_header(bytes: &[u8]) -> Option<AmsdosHeader> {
    if bytes.len() < HEADER_SIZE {
        return None;
    }
    let header = AmsdosHeader::decode(bytes);
    if header.checksum == checksum16(&bytes[..CHECKSUM_SPAN]) {
        Some(header)
    } else {
        None
    }
}
