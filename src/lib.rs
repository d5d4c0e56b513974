/*!
# amsdsk

A Rust library for reading and writing CPCEMU DSK disk images with AMSDOS
filesystem support.

## Features

- Read and write Standard and Extended DSK images, byte-identically
- Format new data or vendor layout disks, single or double head
- AMSDOS catalogue handling: list, read, import, delete
- Loader header detection and synthesis with checksum validation
- Raw sector streams for firmware and ROM images that bypass the catalogue
- Idiomatic Rust API with comprehensive error handling

## Quick Start

```rust,no_run
use amsdsk::{AmsdosDisk, AmsdosName, DiskLayout, ImportOptions};

// Format a fresh single-sided 40-track data disk
let mut disk = AmsdosDisk::format(9, 40, 1, DiskLayout::Data, false)?;

// Import a binary with a load address
let options = ImportOptions {
    load_address: 0x8000,
    exec_address: 0x8000,
    ..ImportOptions::default()
};
disk.put_file("loader.bin", &options)?;

// List the catalogue
for index in disk.file_indices() {
    println!(
        "{} {}",
        disk.entry_name(index).unwrap_or_default(),
        disk.entry_size_string(index).unwrap_or_default()
    );
}

// Read a file back
let bytes = disk.get_file(&AmsdosName::parse("LOADER.BIN"))?;

// Save the image
disk.save("disk.dsk")?;

// Open an existing image and validate its geometry
let disk = AmsdosDisk::open("disk.dsk")?;
for warning in disk.check()? {
    eprintln!("warning: {warning}");
}
# drop(bytes);
# Ok::<(), amsdsk::DskError>(())
```

## DSK Format

The container is the CPCEMU DSK family used by Amstrad CPC emulators and
archives: a 256-byte disk info block, then one 256-byte track info block
(with up to 29 sector descriptors) plus sector payloads per track. The
extended variant replaces the disk-wide nominal track size with a per-track
size table. The embedded filesystem is the AMSDOS flavour of CP/M: a
64-entry catalogue in the first two 1 KiB blocks, files chained across
directory entries in 128-byte pages.

## Modules

- `format`: signatures, layout constants, container/layout enums
- `image`: core data structures (`DskImage`, `Track`, `SectorDescriptor`)
  and geometry math
- `io`: DSK decoding and encoding
- `filesystem`: AMSDOS catalogue, allocation bitmap, loader header and the
  file store
- `error`: error types and `Result` alias
*/

#![warn(missing_docs)]

/// Error types and Result alias
pub mod error;
/// AMSDOS filesystem layer
pub mod filesystem;
/// DSK format constants and enums
pub mod format;
/// Core image data structures
pub mod image;
/// I/O operations for reading and writing DSK files
pub mod io;

// Re-export common types
pub use error::{DskError, Result, Warning};
pub use filesystem::{
    try_parse_header, AllocationBitmap, AmsdosDisk, AmsdosHeader, AmsdosName, DirEntry, Directory,
    ImportOptions, SaveMode,
};
pub use format::{DiskLayout, DskFormat, SizeTable};
pub use image::{DskImage, SectorDescriptor, Track};
pub use io::{read_dsk, write_dsk};
