//! This module contains the lean element reader,
//! a low-level abstraction for going through a DICOM data set
//! one element at a time.
//!
//! [`ElementReader`] converts a byte stream
//! into a lazy sequence of [`RawElement`] records
//! under one fixed [`Encoding`],
//! without interpreting values
//! and without descending into sequence elements.
//! Each pull performs exactly one header read
//! plus one value read or skip.

use std::io::{Read, Seek, SeekFrom};

use byteordered::byteorder::{BigEndian, ByteOrder, LittleEndian};
use byteordered::Endianness;
use snafu::{Backtrace, ResultExt, Snafu};

use crate::dictionary::{DataDictionary, StandardDataDictionary};
use crate::header::{Length, Tag, VR};
use crate::tags;
use crate::transfer_syntax::Encoding;
use crate::util::read_fully;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not read element header"))]
    ReadHeader {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not read extended length of element {}", tag))]
    ReadLength {
        tag: Tag,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not retrieve stream position"))]
    GetPosition {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not reposition stream to the start of element {}", tag))]
    RewindHeader {
        tag: Tag,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not peek the tag following element {}", tag))]
    PeekTag {
        tag: Tag,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not read {} value bytes of element {}", len, tag))]
    ReadValue {
        tag: Tag,
        len: u32,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not skip {} value bytes of element {}", len, tag))]
    SkipValue {
        tag: Tag,
        len: u32,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    /// Reading past an element of this kind is impossible
    /// without the recursive data set logic
    /// which this reader deliberately does not have.
    #[snafu(display("Unsupported sequence or undefined-length element {}", tag))]
    UnsupportedSequence { tag: Tag, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A raw data element record:
/// the element's tag, value representation (when known),
/// specified length, raw value bytes,
/// and the stream position at which the value begins.
///
/// The value is absent if and only if reading it was deferred
/// because its length exceeds the reader's threshold;
/// in that case it can still be fetched later
/// by reading `length` bytes at `value_offset`
/// from the original stream.
#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    tag: Tag,
    vr: Option<VR>,
    len: Length,
    value: Option<Vec<u8>>,
    value_offset: u64,
}

impl RawElement {
    /// Retrieve the element's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Retrieve the element's value representation.
    ///
    /// This is `None` when the data set is in implicit VR
    /// and the dictionary does not know the tag.
    #[inline]
    pub fn vr(&self) -> Option<VR> {
        self.vr
    }

    /// Retrieve the value length as specified by the element header.
    #[inline]
    pub fn length(&self) -> Length {
        self.len
    }

    /// Retrieve the raw value bytes,
    /// unless the value read was deferred.
    #[inline]
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// Retrieve the stream position at which the value begins.
    #[inline]
    pub fn value_offset(&self) -> u64 {
        self.value_offset
    }

    /// Check whether the value read was deferred.
    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.value.is_none()
    }

    /// Move the raw value bytes out of the record, discarding the rest.
    #[inline]
    pub fn into_value(self) -> Option<Vec<u8>> {
        self.value
    }
}

/// A lean streaming reader of raw data elements.
///
/// The reader is a pull-based iterator over one pass of a data set:
/// it holds a byte source,
/// the element encoding of the pass,
/// an optional stop predicate,
/// and an optional deferred read threshold.
/// The produced sequence is forward-only and non-restartable,
/// and iteration is fused after the first failure.
///
/// # Example
///
/// ```no_run
/// use dicom_rawread::{ElementReader, Encoding, Endianness};
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let source = std::io::Cursor::new(std::fs::read("dataset.raw")?);
/// let reader = ElementReader::new(source, Encoding::new(Endianness::Little, true));
/// for element in reader {
///     let element = element?;
///     println!("{} {}", element.tag(), element.length());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ElementReader<S, P = fn(Tag) -> bool, D = StandardDataDictionary> {
    source: S,
    encoding: Encoding,
    dict: D,
    stop_when: Option<P>,
    defer_size: Option<u64>,
    hard_break: bool,
}

impl<S> ElementReader<S>
where
    S: Read + Seek,
{
    /// Create a new element reader over the given source,
    /// starting at its current position,
    /// with the given element encoding.
    ///
    /// The reader uses the standard dictionary,
    /// no stop predicate,
    /// and an unlimited deferred read threshold.
    pub fn new(source: S, encoding: Encoding) -> Self {
        ElementReader {
            source,
            encoding,
            dict: StandardDataDictionary,
            stop_when: None,
            defer_size: None,
            hard_break: false,
        }
    }
}

impl<S, P, D> ElementReader<S, P, D> {
    /// Install a stop predicate:
    /// when it returns `true` for an element's tag,
    /// the sequence ends without yielding that element
    /// and the stream is repositioned to the start of its header,
    /// so that a following pass can decode it again.
    ///
    /// The predicate is checked before any of the element's value bytes
    /// are consumed.
    pub fn stop_when<P2>(self, predicate: P2) -> ElementReader<S, P2, D>
    where
        P2: FnMut(Tag) -> bool,
    {
        ElementReader {
            source: self.source,
            encoding: self.encoding,
            dict: self.dict,
            stop_when: Some(predicate),
            defer_size: self.defer_size,
            hard_break: self.hard_break,
        }
    }

    /// Set the deferred read threshold, in bytes.
    ///
    /// Values strictly longer than the threshold are skipped over
    /// instead of being brought into memory;
    /// the respective records carry no value
    /// but still report the value's length and offset.
    pub fn defer_size(mut self, size: u64) -> Self {
        self.defer_size = Some(size);
        self
    }

    /// Use the given dictionary for implicit VR resolution.
    pub fn with_dictionary<D2>(self, dict: D2) -> ElementReader<S, P, D2>
    where
        D2: DataDictionary,
    {
        ElementReader {
            source: self.source,
            encoding: self.encoding,
            dict,
            stop_when: self.stop_when,
            defer_size: self.defer_size,
            hard_break: self.hard_break,
        }
    }

    /// Retrieve the element encoding of this pass.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Unwrap the reader, releasing the byte source.
    ///
    /// The source is left exactly where the traversal stopped.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S, P, D> Iterator for ElementReader<S, P, D>
where
    S: Read + Seek,
    P: FnMut(Tag) -> bool,
    D: DataDictionary,
{
    type Item = Result<RawElement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.hard_break {
            return None;
        }
        match self.read_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.hard_break = true;
                None
            }
            Err(e) => {
                self.hard_break = true;
                Some(Err(e))
            }
        }
    }
}

impl<S, P, D> ElementReader<S, P, D>
where
    S: Read + Seek,
    P: FnMut(Tag) -> bool,
    D: DataDictionary,
{
    fn read_element(&mut self) -> Result<Option<RawElement>> {
        // fixed 8-byte header part;
        // anything shorter marks the end of the sequence
        let mut head = [0u8; 8];
        let filled = read_fully(&mut self.source, &mut head).context(ReadHeaderSnafu)?;
        if filled < head.len() {
            if filled > 0 {
                tracing::debug!("ignoring {} trailing bytes at end of stream", filled);
            }
            return Ok(None);
        }

        let byte_order = self.encoding.byte_order;
        let tag = Tag(
            read_u16(byte_order, &head[0..2]),
            read_u16(byte_order, &head[2..4]),
        );

        let (mut vr, len, header_len) = if self.encoding.explicit_vr {
            let vr = VR::from_binary([head[4], head[5]]).unwrap_or_else(|| {
                tracing::warn!(
                    "element {} has unknown VR code {:?}, assuming UN",
                    tag,
                    String::from_utf8_lossy(&head[4..6]),
                );
                VR::UN
            });
            match vr {
                // PS3.5 7.1.2:
                // for VRs of AE, AS, AT, CS, DA, DS, DT, FL, FD, IS, LO, LT,
                // PN, SH, SL, SS, ST, TM, UI, UL and US the Value Length
                // Field is the 16-bit unsigned integer following the two
                // byte VR Field.
                VR::AE
                | VR::AS
                | VR::AT
                | VR::CS
                | VR::DA
                | VR::DS
                | VR::DT
                | VR::FL
                | VR::FD
                | VR::IS
                | VR::LO
                | VR::LT
                | VR::PN
                | VR::SH
                | VR::SL
                | VR::SS
                | VR::ST
                | VR::TM
                | VR::UI
                | VR::UL
                | VR::US => {
                    let len = u32::from(read_u16(byte_order, &head[6..8]));
                    (Some(vr), Length(len), 8_usize)
                }
                // for all other VRs, the remaining 16 bits are reserved
                // and the Value Length Field is a 32-bit unsigned integer
                // in the following 4 bytes
                _ => {
                    let mut buf = [0u8; 4];
                    self.source
                        .read_exact(&mut buf)
                        .context(ReadLengthSnafu { tag })?;
                    (Some(vr), Length(read_u32(byte_order, &buf)), 12_usize)
                }
            }
        } else {
            (None, Length(read_u32(byte_order, &head[4..8])), 8_usize)
        };

        let value_offset = self.source.stream_position().context(GetPositionSnafu)?;

        if let Some(stop_when) = self.stop_when.as_mut() {
            if stop_when(tag) {
                // un-read the whole header,
                // leaving the stream at the position where it began
                self.source
                    .seek(SeekFrom::Current(-(header_len as i64)))
                    .context(RewindHeaderSnafu { tag })?;
                return Ok(None);
            }
        }

        if vr.is_none() {
            vr = match self.dict.vr_by_tag(tag) {
                Some(found) => Some(found),
                None => self.peek_sequence_item(tag, value_offset)?,
            };
        }

        if vr == Some(VR::SQ) || len.is_undefined() {
            return UnsupportedSequenceSnafu { tag }.fail();
        }

        let len = len.0;
        let value = match self.defer_size {
            Some(threshold) if u64::from(len) > threshold => {
                self.source
                    .seek(SeekFrom::Current(i64::from(len)))
                    .context(SkipValueSnafu { tag, len })?;
                None
            }
            _ => {
                let mut data = vec![0; len as usize];
                self.source
                    .read_exact(&mut data)
                    .context(ReadValueSnafu { tag, len })?;
                Some(data)
            }
        };

        Ok(Some(RawElement {
            tag,
            vr,
            len: Length(len),
            value,
            value_offset,
        }))
    }

    /// Check whether the bytes ahead hold an item header tag,
    /// in which case the element under resolution is a sequence.
    /// The stream position is restored unconditionally.
    fn peek_sequence_item(&mut self, tag: Tag, value_offset: u64) -> Result<Option<VR>> {
        let mut buf = [0u8; 4];
        let filled = read_fully(&mut self.source, &mut buf).context(PeekTagSnafu { tag })?;
        self.source
            .seek(SeekFrom::Start(value_offset))
            .context(PeekTagSnafu { tag })?;
        if filled < buf.len() {
            return Ok(None);
        }

        let byte_order = self.encoding.byte_order;
        let next = Tag(
            read_u16(byte_order, &buf[0..2]),
            read_u16(byte_order, &buf[2..4]),
        );
        if next == tags::ITEM {
            Ok(Some(VR::SQ))
        } else {
            Ok(None)
        }
    }
}

fn read_u16(byte_order: Endianness, bytes: &[u8]) -> u16 {
    match byte_order {
        Endianness::Little => LittleEndian::read_u16(bytes),
        Endianness::Big => BigEndian::read_u16(bytes),
    }
}

fn read_u32(byte_order: Endianness, bytes: &[u8]) -> u32 {
    match byte_order {
        Endianness::Little => LittleEndian::read_u32(bytes),
        Endianness::Big => BigEndian::read_u32(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EXPLICIT_LE: Encoding = Encoding::new(Endianness::Little, true);
    const IMPLICIT_LE: Encoding = Encoding::new(Endianness::Little, false);
    const EXPLICIT_BE: Encoding = Encoding::new(Endianness::Big, true);

    /// A dictionary which knows nothing,
    /// for exercising unresolved implicit VR paths.
    struct NoDictionary;

    impl DataDictionary for NoDictionary {
        fn vr_by_tag(&self, _: Tag) -> Option<VR> {
            None
        }
    }

    // manually crafting some DICOM data elements
    #[rustfmt::skip]
    const RAW_EXPLICIT_LE: &[u8] = &[
        0x08, 0x00, 0x18, 0x00,     // (0008,0018) (LE) SOP Instance UID
            b'U', b'I',             // VR: UI (UID)
            0x04, 0x00,             // Length: 4 bytes (LE)
                b'1', b'.', b'2', b'3',
        0x10, 0x00, 0x10, 0x00,     // (0010,0010) (LE) Patient's Name
            b'P', b'N',             // VR: PN (Person Name)
            0x08, 0x00,             // Length: 8 bytes (LE)
                b'D', b'O', b'E', b'^', b'J', b'O', b'H', b'N',
        0xE0, 0x7F, 0x10, 0x00,     // (7FE0,0010) (LE) Pixel Data
            b'O', b'B',             // VR: OB (Other Byte), long form
            0x00, 0x00,             // 2 reserved bytes
            0x08, 0x00, 0x00, 0x00, // Length: 8 bytes (LE, 32-bit)
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
    ];

    #[rustfmt::skip]
    const RAW_IMPLICIT_LE: &[u8] = &[
        0x08, 0x00, 0x18, 0x00,     // (0008,0018) (LE) SOP Instance UID
            0x04, 0x00, 0x00, 0x00, // Length: 4 bytes (LE, 32-bit)
                b'1', b'.', b'2', b'3',
        0x09, 0x00, 0x01, 0x00,     // (0009,0001) (LE) private attribute
            0x06, 0x00, 0x00, 0x00, // Length: 6 bytes (LE, 32-bit)
                b'a', b'b', b'c', b'd', b'e', b'f',
    ];

    #[test]
    fn reads_explicit_vr_little_endian_elements() {
        let reader = ElementReader::new(Cursor::new(RAW_EXPLICIT_LE), EXPLICIT_LE);
        let elements: Vec<_> = reader.map(Result::unwrap).collect();
        assert_eq!(elements.len(), 3);

        assert_eq!(elements[0].tag(), Tag(0x0008, 0x0018));
        assert_eq!(elements[0].vr(), Some(VR::UI));
        assert_eq!(elements[0].length(), Length(4));
        assert_eq!(elements[0].value(), Some(&b"1.23"[..]));
        assert_eq!(elements[0].value_offset(), 8);

        assert_eq!(elements[1].tag(), Tag(0x0010, 0x0010));
        assert_eq!(elements[1].vr(), Some(VR::PN));
        assert_eq!(elements[1].value(), Some(&b"DOE^JOHN"[..]));
        assert_eq!(elements[1].value_offset(), 20);

        // long form header is 12 bytes wide
        assert_eq!(elements[2].tag(), Tag(0x7FE0, 0x0010));
        assert_eq!(elements[2].vr(), Some(VR::OB));
        assert_eq!(elements[2].length(), Length(8));
        assert_eq!(elements[2].value_offset(), 40);
        assert_eq!(
            elements[2].value(),
            Some(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08][..])
        );
    }

    #[test]
    fn value_round_trip_at_reported_offset() {
        let reader = ElementReader::new(Cursor::new(RAW_EXPLICIT_LE), EXPLICIT_LE);
        for element in reader {
            let element = element.unwrap();
            let offset = element.value_offset() as usize;
            let len = element.length().get().unwrap() as usize;
            assert_eq!(
                element.value().unwrap(),
                &RAW_EXPLICIT_LE[offset..offset + len]
            );
        }
    }

    #[test]
    fn resolves_implicit_vr_through_the_dictionary() {
        let reader = ElementReader::new(Cursor::new(RAW_IMPLICIT_LE), IMPLICIT_LE);
        let elements: Vec<_> = reader.map(Result::unwrap).collect();
        assert_eq!(elements.len(), 2);

        assert_eq!(elements[0].vr(), Some(VR::UI));
        assert_eq!(elements[0].value(), Some(&b"1.23"[..]));

        // not in the dictionary, and the value is not an item marker
        assert_eq!(elements[1].vr(), None);
        assert_eq!(elements[1].value(), Some(&b"abcdef"[..]));
        assert_eq!(elements[1].value_offset(), 20);
    }

    #[test]
    fn unresolved_vr_leaves_the_cursor_at_the_value() {
        // the peek after a dictionary miss must not consume value bytes:
        // a known element follows and must still decode correctly
        let reader = ElementReader::new(Cursor::new(RAW_IMPLICIT_LE), IMPLICIT_LE)
            .with_dictionary(NoDictionary);
        let elements: Vec<_> = reader.map(Result::unwrap).collect();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].vr(), None);
        assert_eq!(elements[0].value(), Some(&b"1.23"[..]));
        assert_eq!(elements[0].value_offset(), 8);
        assert_eq!(elements[1].value(), Some(&b"abcdef"[..]));
        assert_eq!(elements[1].value_offset(), 20);
    }

    #[test]
    fn item_marker_after_unknown_tag_means_sequence() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x09, 0x00, 0x01, 0x00,     // (0009,0001) unknown to the dictionary
                0xFF, 0xFF, 0xFF, 0xFF, // undefined length
            0xFE, 0xFF, 0x00, 0xE0,     // (FFFE,E000) item header follows
                0x00, 0x00, 0x00, 0x00,
        ];
        let mut reader = ElementReader::new(Cursor::new(raw), IMPLICIT_LE);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedSequence { tag, .. } if tag == Tag(0x0009, 0x0001)
        ));
        // iteration is fused after a failure
        assert!(reader.next().is_none());
    }

    #[test]
    fn sequence_vr_is_not_supported() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x08, 0x00, 0x40, 0x11,     // (0008,1140) Referenced Image Sequence
                b'S', b'Q',             // VR: SQ
                0x00, 0x00,             // 2 reserved bytes
                0x00, 0x00, 0x00, 0x00, // Length: 0
        ];
        let mut reader = ElementReader::new(Cursor::new(raw), EXPLICIT_LE);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::UnsupportedSequence { .. }));
    }

    #[test]
    fn undefined_length_is_not_supported() {
        // explicit VR, undefined length on a non-sequence VR
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0xE0, 0x7F, 0x10, 0x00,     // (7FE0,0010) Pixel Data
                b'O', b'B',
                0x00, 0x00,
                0xFF, 0xFF, 0xFF, 0xFF, // undefined length
        ];
        let mut reader = ElementReader::new(Cursor::new(raw), EXPLICIT_LE);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedSequence { tag, .. } if tag == Tag(0x7FE0, 0x0010)
        ));
    }

    #[test]
    fn stop_predicate_rewinds_to_the_header_start() {
        let mut reader = ElementReader::new(Cursor::new(RAW_EXPLICIT_LE), EXPLICIT_LE)
            .stop_when(|tag: Tag| tag.group() == 0x7FE0);
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.tag(), Tag(0x0008, 0x0018));
        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.tag(), Tag(0x0010, 0x0010));
        assert!(reader.next().is_none());

        // the long form header (12 bytes) was fully un-read
        let source = reader.into_inner();
        assert_eq!(source.position(), 28);
    }

    #[test]
    fn stop_predicate_rewinds_short_form_headers_too() {
        let mut reader = ElementReader::new(Cursor::new(RAW_EXPLICIT_LE), EXPLICIT_LE)
            .stop_when(|tag: Tag| tag.group() == 0x0010);
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.tag(), Tag(0x0008, 0x0018));
        assert!(reader.next().is_none());

        let source = reader.into_inner();
        assert_eq!(source.position(), 12);
    }

    #[test]
    fn long_values_are_deferred_past_the_threshold() {
        let reader =
            ElementReader::new(Cursor::new(RAW_EXPLICIT_LE), EXPLICIT_LE).defer_size(6);
        let elements: Vec<_> = reader.map(Result::unwrap).collect();

        // 4 bytes: materialized
        assert_eq!(elements[0].value(), Some(&b"1.23"[..]));
        // 8 bytes: deferred, but length and offset are still reported
        assert!(elements[1].is_deferred());
        assert_eq!(elements[1].length(), Length(8));
        assert_eq!(elements[1].value_offset(), 20);
        assert!(elements[2].is_deferred());

        // deferred values can be fetched back from the original bytes
        let offset = elements[1].value_offset() as usize;
        assert_eq!(&RAW_EXPLICIT_LE[offset..offset + 8], b"DOE^JOHN");
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        // a value exactly as long as the threshold is materialized
        let reader =
            ElementReader::new(Cursor::new(RAW_EXPLICIT_LE), EXPLICIT_LE).defer_size(8);
        let elements: Vec<_> = reader.map(Result::unwrap).collect();
        assert_eq!(elements[1].value(), Some(&b"DOE^JOHN"[..]));
        assert_eq!(elements[2].value().map(<[u8]>::len), Some(8));
    }

    #[test]
    fn reads_explicit_vr_big_endian_elements() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x00, 0x08, 0x00, 0x18,     // (0008,0018) (BE) SOP Instance UID
                b'U', b'I',
                0x00, 0x04,             // Length: 4 bytes (BE)
                    b'1', b'.', b'2', b'3',
            0x00, 0x28, 0x00, 0x10,     // (0028,0010) (BE) Rows
                b'U', b'S',
                0x00, 0x02,             // Length: 2 bytes (BE)
                    0x01, 0x00,         // 256 (BE)
        ];
        let reader = ElementReader::new(Cursor::new(raw), EXPLICIT_BE);
        let elements: Vec<_> = reader.map(Result::unwrap).collect();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].tag(), Tag(0x0008, 0x0018));
        assert_eq!(elements[0].value(), Some(&b"1.23"[..]));
        assert_eq!(elements[1].tag(), Tag(0x0028, 0x0010));
        assert_eq!(elements[1].value(), Some(&[0x01, 0x00][..]));
    }

    #[test]
    fn short_trailing_bytes_end_the_sequence_cleanly() {
        let mut data = RAW_IMPLICIT_LE.to_vec();
        data.extend_from_slice(&[0x00, 0x01, 0x02]);
        let mut reader = ElementReader::new(Cursor::new(data), IMPLICIT_LE);
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn empty_stream_yields_nothing() {
        let mut reader = ElementReader::new(Cursor::new(&[][..]), EXPLICIT_LE);
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_extended_length_is_an_error() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0xE0, 0x7F, 0x10, 0x00,     // (7FE0,0010) Pixel Data
                b'O', b'B',
                0x00, 0x00,
                0x08, 0x00,             // 32-bit length cut short
        ];
        let mut reader = ElementReader::new(Cursor::new(raw), EXPLICIT_LE);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::ReadLength { .. }));
    }

    #[test]
    fn truncated_value_is_an_error() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x08, 0x00, 0x18, 0x00,     // (0008,0018) SOP Instance UID
                b'U', b'I',
                0x08, 0x00,             // Length: 8, but only 2 bytes follow
                    b'1', b'.',
        ];
        let mut reader = ElementReader::new(Cursor::new(raw), EXPLICIT_LE);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::ReadValue { tag, len: 8, .. } if tag == Tag(0x0008, 0x0018)
        ));
    }
}
