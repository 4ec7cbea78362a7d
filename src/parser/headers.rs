//! Header-to-field resolution. The source tables label columns loosely
//! ("SEC.", "CLASS #", "TYPE", ...) and column order varies between tables,
//! so each cell arrives paired with its raw header text and is matched
//! against a fixed allow-list here.

use crate::ingest::RawSectionPiece;

/// Canonical section attributes the pipeline recognizes. A raw header that
/// resolves to none of these is dropped; adding a new column type is a code
/// change, not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalKey {
    SectionNumber,
    ClassNumber,
    SectionType,
    Days,
    Time,
    Location,
    Instructor,
    Comment,
}

/// Ordered match tokens. Resolution is first-substring-wins, so the order
/// is part of the contract.
const MATCHERS: &[(CanonicalKey, &str)] = &[
    (CanonicalKey::SectionNumber, "sec"),
    (CanonicalKey::ClassNumber, "class #"),
    (CanonicalKey::SectionType, "type"),
    (CanonicalKey::Days, "day"),
    (CanonicalKey::Time, "time"),
    (CanonicalKey::Location, "location"),
    (CanonicalKey::Instructor, "instructor"),
    (CanonicalKey::Comment, "comment"),
];

/// Resolve a raw column header to its canonical key, or None for headers
/// outside the allow-list.
pub fn resolve(raw_header: &str) -> Option<CanonicalKey> {
    let header = raw_header.to_lowercase();
    MATCHERS
        .iter()
        .find(|(_, token)| header.contains(token))
        .map(|(key, _)| *key)
}

/// One section's canonical fields. Every field is always present, defaulted
/// to the empty string, so downstream extraction never deals with missing
/// keys.
#[derive(Debug, Clone, Default)]
pub struct CanonicalFields {
    pub section_type: String,
    pub section_number: String,
    pub class_number: String,
    pub instructor: String,
    pub days: String,
    pub time: String,
    pub location: String,
    pub comment: String,
}

impl CanonicalFields {
    /// Build from raw pieces. Pieces whose headers resolve to the same key
    /// overwrite earlier ones; unresolved headers are discarded.
    pub fn from_pieces(pieces: &[RawSectionPiece]) -> Self {
        let mut fields = CanonicalFields::default();
        for piece in pieces {
            let Some(key) = resolve(&piece.raw_key) else {
                continue;
            };
            let slot = match key {
                CanonicalKey::SectionType => &mut fields.section_type,
                CanonicalKey::SectionNumber => &mut fields.section_number,
                CanonicalKey::ClassNumber => &mut fields.class_number,
                CanonicalKey::Instructor => &mut fields.instructor,
                CanonicalKey::Days => &mut fields.days,
                CanonicalKey::Time => &mut fields.time,
                CanonicalKey::Location => &mut fields.location,
                CanonicalKey::Comment => &mut fields.comment,
            };
            *slot = piece.value.clone();
        }
        fields
    }
}
