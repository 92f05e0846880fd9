//! Transfer syntax descriptors and the global transfer syntax registry.
//!
//! A transfer syntax determines how the elements of a data set are laid out
//! on the wire: whether value representations are explicit, and in which
//! byte order multi-byte integers appear. The registry maps a transfer
//! syntax UID, as carried by the file meta group, to its descriptor. It is
//! initialized once and never mutated afterwards.

use std::collections::HashMap;

use lazy_static::lazy_static;

pub use byteordered::Endianness;

/// The element encoding mode of one data set pass:
/// the byte order of multi-byte integers
/// and whether element headers carry an explicit value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    /// The byte order of data.
    pub byte_order: Endianness,
    /// Whether element headers carry an explicit value representation.
    pub explicit_vr: bool,
}

impl Encoding {
    /// Create an encoding mode descriptor.
    #[inline]
    pub const fn new(byte_order: Endianness, explicit_vr: bool) -> Self {
        Encoding {
            byte_order,
            explicit_vr,
        }
    }
}

/// A DICOM transfer syntax descriptor:
/// the transfer syntax' unique identifier,
/// its human readable name,
/// and the element encoding it mandates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSyntax {
    /// The unique identifier of the transfer syntax.
    uid: &'static str,
    /// The name of the transfer syntax.
    name: &'static str,
    /// The byte order of data.
    byte_order: Endianness,
    /// Whether the transfer syntax mandates an explicit value representation,
    /// or the VR is implicit.
    explicit_vr: bool,
    /// Whether the data set bytes are deflate-compressed.
    deflated: bool,
}

impl TransferSyntax {
    /// Create a new transfer syntax descriptor.
    pub const fn new(
        uid: &'static str,
        name: &'static str,
        byte_order: Endianness,
        explicit_vr: bool,
        deflated: bool,
    ) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order,
            explicit_vr,
            deflated,
        }
    }

    /// Obtain this transfer syntax' unique identifier.
    pub fn uid(&self) -> &'static str {
        self.uid
    }

    /// Obtain the transfer syntax' name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Obtain the element encoding mode mandated by this transfer syntax.
    pub fn encoding(&self) -> Encoding {
        Encoding::new(self.byte_order, self.explicit_vr)
    }

    /// Whether the data set bytes are deflate-compressed.
    /// Inflating them is outside the scope of this crate;
    /// element reading over the compressed stream
    /// only makes sense after inflation.
    pub fn is_deflated(&self) -> bool {
        self.deflated
    }
}

/// Implicit VR Little Endian: Default Transfer Syntax for DICOM
pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new(
    "1.2.840.10008.1.2",
    "Implicit VR Little Endian",
    Endianness::Little,
    false,
    false,
);

/// Explicit VR Little Endian
pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new(
    "1.2.840.10008.1.2.1",
    "Explicit VR Little Endian",
    Endianness::Little,
    true,
    false,
);

/// Deflated Explicit VR Little Endian
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new(
    "1.2.840.10008.1.2.1.99",
    "Deflated Explicit VR Little Endian",
    Endianness::Little,
    true,
    true,
);

/// Explicit VR Big Endian (retired)
pub const EXPLICIT_VR_BIG_ENDIAN: TransferSyntax = TransferSyntax::new(
    "1.2.840.10008.1.2.2",
    "Explicit VR Big Endian",
    Endianness::Big,
    true,
    false,
);

/// Retrieve the default transfer syntax,
/// which a data set is assumed to follow
/// when no transfer syntax is negotiated or specified.
pub fn default() -> TransferSyntax {
    IMPLICIT_VR_LITTLE_ENDIAN
}

/// Data type for a registry of DICOM transfer syntaxes, keyed by UID.
#[derive(Debug)]
pub struct TransferSyntaxRegistry {
    m: HashMap<&'static str, TransferSyntax>,
}

impl TransferSyntaxRegistry {
    /// Obtain a transfer syntax descriptor by its respective UID.
    ///
    /// The lookup is robust to the trailing space or null padding
    /// which UID values carry on the wire.
    pub fn get<U: AsRef<str>>(&self, uid: U) -> Option<&TransferSyntax> {
        let ts_uid = uid.as_ref().trim_end_matches(|c| c == ' ' || c == '\0');
        self.m.get(ts_uid)
    }
}

lazy_static! {
    static ref REGISTRY: TransferSyntaxRegistry = TransferSyntaxRegistry {
        m: initialize_entries(),
    };
}

/// Retrieve the global transfer syntax registry.
pub fn registry() -> &'static TransferSyntaxRegistry {
    &REGISTRY
}

fn initialize_entries() -> HashMap<&'static str, TransferSyntax> {
    let mut m = HashMap::new();

    for ts in &[
        IMPLICIT_VR_LITTLE_ENDIAN,
        EXPLICIT_VR_LITTLE_ENDIAN,
        DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
        EXPLICIT_VR_BIG_ENDIAN,
    ] {
        m.insert(ts.uid(), *ts);
    }

    m
}
