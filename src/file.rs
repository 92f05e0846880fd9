//! Scoped file access for lean element reading.
//!
//! [`DicomFile`] owns the byte stream of one DICOM file for the duration of
//! a traversal. Opening it detects the optional 128-byte preamble, and
//! [`DicomFile::elements`] drives the two-pass read: the file meta group is
//! read in Explicit VR Little Endian up to the first element outside group
//! 0002, the transfer syntax UID announced there selects the element
//! encoding of the main data set, and reading resumes in that mode at the
//! exact position where the meta pass stopped.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use snafu::{Backtrace, OptionExt, ResultExt, Snafu};

use crate::header::Tag;
use crate::read::{self, ElementReader, RawElement};
use crate::tags;
use crate::transfer_syntax::{registry, EXPLICIT_VR_LITTLE_ENDIAN};
use crate::util::read_fully;

const DICM_MAGIC_CODE: [u8; 4] = [b'D', b'I', b'C', b'M'];

/// The length of the file preamble, in bytes.
pub const PREAMBLE_LENGTH: usize = 128;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The file could not be opened for reading.
    #[snafu(display("Could not open file '{}'", path.display()))]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    /// An I/O failure occurred while checking for the file preamble.
    #[snafu(display("Could not read file preamble"))]
    ReadPreamble {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    /// The handle was closed before the traversal.
    #[snafu(display("File handle is already closed"))]
    Closed { backtrace: Backtrace },
    /// A data element could not be read.
    #[snafu(display("Could not read data set element"))]
    ReadElement {
        #[snafu(backtrace)]
        source: read::Error,
    },
    /// The file meta group ended without announcing a transfer syntax,
    /// so the encoding of the main data set is unknown.
    #[snafu(display("File meta group carries no transfer syntax UID"))]
    MissingTransferSyntax { backtrace: Backtrace },
    /// The transfer syntax UID value is not text.
    #[snafu(display("Transfer syntax UID is not valid text"))]
    InvalidTransferSyntaxUid {
        source: std::str::Utf8Error,
        backtrace: Backtrace,
    },
    /// The announced transfer syntax is not in the registry.
    #[snafu(display("Unsupported transfer syntax '{}'", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Detect and consume the optional file preamble.
///
/// The check reads 128 bytes plus the 4-byte magic code tentatively.
/// If the magic code matches, the preamble is returned and the stream is
/// left right after it. Otherwise the stream is repositioned to where it
/// was and `None` is returned; a missing preamble is a legal variant, not
/// an error.
pub fn read_preamble<S>(source: &mut S) -> std::io::Result<Option<Box<[u8; PREAMBLE_LENGTH]>>>
where
    S: ?Sized + Read + Seek,
{
    let start = source.stream_position()?;
    let mut buf = [0u8; PREAMBLE_LENGTH + 4];
    let filled = read_fully(source, &mut buf)?;
    if filled == buf.len() && buf[PREAMBLE_LENGTH..] == DICM_MAGIC_CODE {
        let mut preamble = Box::new([0u8; PREAMBLE_LENGTH]);
        preamble.copy_from_slice(&buf[..PREAMBLE_LENGTH]);
        Ok(Some(preamble))
    } else {
        source.seek(SeekFrom::Start(start))?;
        Ok(None)
    }
}

/// The set of options for a data set traversal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct ReadOptions {
    /// The deferred read threshold for main data set values, in bytes.
    ///
    /// The threshold does not apply to the file meta pass,
    /// whose values must be available for the transfer syntax hand-off.
    pub defer_size: Option<u64>,
}

impl ReadOptions {
    /// Create the default traversal options.
    pub fn new() -> Self {
        Default::default()
    }

    /// Replace the deferred read threshold.
    pub fn defer_size(mut self, size: u64) -> Self {
        self.defer_size = Some(size);
        self
    }
}

/// A scoped handle to a DICOM file.
///
/// The handle is the sole owner of the underlying stream.
/// It is released when the handle is dropped, on every exit path,
/// or earlier through [`close`](DicomFile::close).
/// A traversal borrows the handle mutably for its whole lifetime,
/// so concurrent traversals of one handle are rejected at compile time;
/// independent handles over the same path are fine.
///
/// # Example
///
/// ```no_run
/// use dicom_rawread::DicomFile;
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut file = DicomFile::open("0001.dcm")?;
/// for element in file.elements()? {
///     let element = element?;
///     println!("{} {}", element.tag(), element.length());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DicomFile {
    source: Option<BufReader<File>>,
    preamble: Option<Box<[u8; PREAMBLE_LENGTH]>>,
}

impl DicomFile {
    /// Open a DICOM file for element reading.
    ///
    /// The preamble check happens here:
    /// after this call the stream is positioned at the file meta group
    /// (or at the first element, for streams without a preamble).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<DicomFile> {
        let path = path.as_ref();
        let file = File::open(path).context(OpenFileSnafu { path })?;
        let mut source = BufReader::new(file);
        let preamble = read_preamble(&mut source).context(ReadPreambleSnafu)?;
        tracing::debug!(
            "opened '{}' (preamble: {})",
            path.display(),
            preamble.is_some()
        );
        Ok(DicomFile {
            source: Some(source),
            preamble,
        })
    }

    /// Retrieve the file preamble, if one was present.
    pub fn preamble(&self) -> Option<&[u8; PREAMBLE_LENGTH]> {
        self.preamble.as_deref()
    }

    /// Check whether the handle still owns its stream.
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Release the underlying stream.
    ///
    /// Closing is idempotent: calling this on a closed handle is a no-op.
    /// Dropping the handle has the same effect.
    pub fn close(&mut self) {
        self.source.take();
    }

    /// Traverse the file's data elements:
    /// first the file meta group, then the main data set,
    /// as one lazy sequence.
    ///
    /// The sequence is forward-only and non-restartable;
    /// open a new handle to traverse the file again.
    pub fn elements(&mut self) -> Result<DicomElements<'_>> {
        self.elements_with(ReadOptions::default())
    }

    /// Traverse the file's data elements with the given options.
    pub fn elements_with(&mut self, options: ReadOptions) -> Result<DicomElements<'_>> {
        let source = self.source.as_mut().context(ClosedSnafu)?;
        Ok(DicomElements::new(source, options))
    }
}

type PassReader<'a> = ElementReader<&'a mut BufReader<File>, fn(Tag) -> bool>;

fn outside_meta_group(tag: Tag) -> bool {
    tag.group() != 0x0002
}

#[derive(Debug)]
enum Phase<'a> {
    /// Reading the file meta group in Explicit VR Little Endian.
    Meta(PassReader<'a>),
    /// Reading the main data set in the announced encoding.
    Main(PassReader<'a>),
    /// Traversal over, by exhaustion or failure.
    Done,
}

/// The combined element sequence of one file traversal:
/// the file meta group records followed by the main data set records.
///
/// The iterator watches the meta pass for the transfer syntax UID element
/// and switches the element encoding accordingly before the main pass.
/// It is fused after the first failure.
#[derive(Debug)]
pub struct DicomElements<'a> {
    phase: Phase<'a>,
    ts_uid: Option<String>,
    defer_size: Option<u64>,
}

impl<'a> DicomElements<'a> {
    fn new(source: &'a mut BufReader<File>, options: ReadOptions) -> Self {
        let meta = ElementReader::new(source, EXPLICIT_VR_LITTLE_ENDIAN.encoding())
            .stop_when(outside_meta_group as fn(Tag) -> bool);
        DicomElements {
            phase: Phase::Meta(meta),
            ts_uid: None,
            defer_size: options.defer_size,
        }
    }

    /// Record the transfer syntax UID when it comes up in the meta group.
    fn watch_meta_element(&mut self, element: &RawElement) -> Result<()> {
        if element.tag() != tags::TRANSFER_SYNTAX_UID {
            return Ok(());
        }
        if let Some(value) = element.value() {
            let text = std::str::from_utf8(value).context(InvalidTransferSyntaxUidSnafu)?;
            let uid = text.trim_end_matches(|c| c == ' ' || c == '\0');
            self.ts_uid = Some(uid.to_string());
        }
        Ok(())
    }

    /// Resolve the announced transfer syntax and start the main pass
    /// at the current stream position.
    fn begin_main_pass(&mut self, source: &'a mut BufReader<File>) -> Result<PassReader<'a>> {
        let uid = self.ts_uid.take().context(MissingTransferSyntaxSnafu)?;
        let ts = registry()
            .get(&uid)
            .with_context(|| UnsupportedTransferSyntaxSnafu { uid: uid.clone() })?;
        if ts.is_deflated() {
            tracing::warn!(
                "data set is encoded as {}; the stream must be inflated before reading",
                ts.name()
            );
        }
        tracing::debug!("main data set encoding: {}", ts.name());

        let mut reader = ElementReader::new(source, ts.encoding());
        if let Some(threshold) = self.defer_size {
            reader = reader.defer_size(threshold);
        }
        Ok(reader)
    }
}

impl<'a> Iterator for DicomElements<'a> {
    type Item = Result<RawElement>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.phase {
                Phase::Meta(reader) => match reader.next() {
                    Some(Ok(element)) => {
                        if let Err(e) = self.watch_meta_element(&element) {
                            self.phase = Phase::Done;
                            return Some(Err(e));
                        }
                        return Some(Ok(element));
                    }
                    Some(Err(e)) => {
                        self.phase = Phase::Done;
                        return Some(Err(e).context(ReadElementSnafu));
                    }
                    None => {
                        // meta pass over: hand the source over to the main
                        // pass in the encoding that the meta group announced
                        if let Phase::Meta(reader) =
                            std::mem::replace(&mut self.phase, Phase::Done)
                        {
                            match self.begin_main_pass(reader.into_inner()) {
                                Ok(main) => self.phase = Phase::Main(main),
                                Err(e) => return Some(Err(e)),
                            }
                        }
                    }
                },
                Phase::Main(reader) => match reader.next() {
                    Some(Ok(element)) => return Some(Ok(element)),
                    Some(Err(e)) => {
                        self.phase = Phase::Done;
                        return Some(Err(e).context(ReadElementSnafu));
                    }
                    None => {
                        self.phase = Phase::Done;
                        return None;
                    }
                },
                Phase::Done => return None,
            }
        }
    }
}
