//! This crate provides a lean streaming reader for DICOM data files:
//! it turns a byte stream into a lazy sequence of raw data element records,
//! without building a data set object model,
//! without converting values to native types,
//! and without descending into sequence elements
//! (which it detects and reports as unsupported).
//!
//! It is meant as a low-level building block
//! for tools which only need to walk over a file's elements,
//! such as indexers, filters and dataset builders.
//!
//! # Reading a file
//!
//! [`DicomFile`] owns the stream for one traversal
//! and takes care of the standard file structure:
//! the optional 128-byte preamble,
//! the file meta group (always in Explicit VR Little Endian),
//! and the switch to the transfer syntax announced there
//! for the remainder of the stream.
//!
//! ```no_run
//! use dicom_rawread::DicomFile;
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = DicomFile::open("0001.dcm")?;
//! for element in file.elements()? {
//!     let element = element?;
//!     println!(
//!         "{} {} ({} bytes)",
//!         element.tag(),
//!         element.vr().map(|vr| vr.name()).unwrap_or("--"),
//!         element.length(),
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Reading an arbitrary stream
//!
//! [`ElementReader`] is the underlying tokenizer.
//! It reads from any `Read + Seek` source under one fixed [`Encoding`],
//! with an optional stop predicate
//! and an optional deferred read threshold
//! above which values are skipped rather than brought into memory:
//!
//! ```no_run
//! use dicom_rawread::{ElementReader, Encoding, Endianness};
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = std::io::Cursor::new(std::fs::read("dataset.raw")?);
//! let reader = ElementReader::new(source, Encoding::new(Endianness::Little, false))
//!     .defer_size(1 << 20);
//! for element in reader {
//!     let element = element?;
//!     if element.is_deferred() {
//!         println!("{}: {} bytes at {}", element.tag(), element.length(), element.value_offset());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The dictionaries consumed for implicit VR resolution
//! and for transfer syntax lookup are pluggable:
//! see [`DataDictionary`] and [`transfer_syntax::registry`].

pub mod dictionary;
pub mod file;
pub mod header;
pub mod read;
pub mod tags;
pub mod transfer_syntax;
mod util;

pub use crate::dictionary::{DataDictionary, StandardDataDictionary};
pub use crate::file::{DicomElements, DicomFile, ReadOptions};
pub use crate::header::{ElementNumber, GroupNumber, Length, Tag, VR};
pub use crate::read::{ElementReader, RawElement};
pub use crate::transfer_syntax::{Encoding, Endianness, TransferSyntax};
pub use crate::util::parse_byte_size;

/// The error type for a whole-file traversal.
pub type ReadError = crate::file::Error;
/// The error type for a single-pass element read.
pub type ParseError = crate::read::Error;
