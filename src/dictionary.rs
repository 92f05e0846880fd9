//! Attribute dictionary interface for value representation lookup.
//!
//! When a data set is encoded in implicit VR, the value representation of
//! each element is not present on the wire and must be resolved externally.
//! The [`DataDictionary`] trait is the seam where that resolution is
//! plugged in. [`StandardDataDictionary`] is a compact built-in
//! implementation covering the attributes most commonly found in practice;
//! applications with broader needs can bring their own dictionary.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::header::{Tag, VR};
use crate::tags;

/// A dictionary of known DICOM attributes,
/// used to resolve the value representation of an element
/// identified only by its tag.
pub trait DataDictionary {
    /// Fetch the value representation registered for the given tag.
    fn vr_by_tag(&self, tag: Tag) -> Option<VR>;
}

impl<T: ?Sized> DataDictionary for &T
where
    T: DataDictionary,
{
    fn vr_by_tag(&self, tag: Tag) -> Option<VR> {
        (**self).vr_by_tag(tag)
    }
}

/// A built-in dictionary of commonly used standard attributes.
///
/// This table is intentionally small: it knows the file meta group and a
/// selection of frequent patient, study, series and image attributes.
/// Tags of the form `(GGGG,0000)` resolve to `UL` by the group length rule
/// of PS3.5 section 7.2.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StandardDataDictionary;

impl DataDictionary for StandardDataDictionary {
    fn vr_by_tag(&self, tag: Tag) -> Option<VR> {
        if tag.element() == 0x0000 {
            return Some(VR::UL);
        }
        ENTRY_MAP.get(&tag).copied()
    }
}

// The dictionary records as (tag, VR) pairs.
const ENTRIES: &[(Tag, VR)] = &[
    (tags::FILE_META_INFORMATION_VERSION, VR::OB),
    (tags::MEDIA_STORAGE_SOP_CLASS_UID, VR::UI),
    (tags::MEDIA_STORAGE_SOP_INSTANCE_UID, VR::UI),
    (tags::TRANSFER_SYNTAX_UID, VR::UI),
    (tags::IMPLEMENTATION_CLASS_UID, VR::UI),
    (tags::IMPLEMENTATION_VERSION_NAME, VR::SH),
    (tags::SOURCE_APPLICATION_ENTITY_TITLE, VR::AE),
    (tags::SPECIFIC_CHARACTER_SET, VR::CS),
    (tags::SOP_CLASS_UID, VR::UI),
    (tags::SOP_INSTANCE_UID, VR::UI),
    (tags::STUDY_DATE, VR::DA),
    (tags::STUDY_TIME, VR::TM),
    (tags::MODALITY, VR::CS),
    (tags::REFERRING_PHYSICIAN_NAME, VR::PN),
    (tags::REFERENCED_IMAGE_SEQUENCE, VR::SQ),
    (tags::PATIENT_NAME, VR::PN),
    (tags::PATIENT_ID, VR::LO),
    (tags::PATIENT_BIRTH_DATE, VR::DA),
    (tags::PATIENT_SEX, VR::CS),
    (tags::STUDY_INSTANCE_UID, VR::UI),
    (tags::SERIES_INSTANCE_UID, VR::UI),
    (tags::STUDY_ID, VR::SH),
    (tags::SERIES_NUMBER, VR::IS),
    (tags::INSTANCE_NUMBER, VR::IS),
    (tags::SAMPLES_PER_PIXEL, VR::US),
    (tags::PHOTOMETRIC_INTERPRETATION, VR::CS),
    (tags::ROWS, VR::US),
    (tags::COLUMNS, VR::US),
    (tags::BITS_ALLOCATED, VR::US),
    (tags::BITS_STORED, VR::US),
    (tags::HIGH_BIT, VR::US),
    (tags::PIXEL_REPRESENTATION, VR::US),
    (tags::REQUEST_ATTRIBUTES_SEQUENCE, VR::SQ),
    // in implicit VR, pixel data is interpreted as OW (PS3.5 section A.1)
    (tags::PIXEL_DATA, VR::OW),
];

lazy_static! {
    static ref ENTRY_MAP: HashMap<Tag, VR> = ENTRIES.iter().copied().collect();
}
