pub mod course;
pub mod days;
pub mod department;
pub mod instructor;

use crate::ingest::RawSectionPiece;
use crate::parser::headers::CanonicalFields;
use crate::parser::time::{self, TimeRange};

use days::DayCode;
use instructor::Instructor;

/// Closed set of section types found in the source. Blank raw values mark
/// administrative rows linked to a primary section, which the source never
/// labels; those and anything unrecognized become `Add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionType {
    Lab,
    Lec,
    Sem,
    Sup,
    Act,
    #[default]
    Add,
}

impl SectionType {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "lab" => SectionType::Lab,
            "lec" => SectionType::Lec,
            "sem" => SectionType::Sem,
            "sup" => SectionType::Sup,
            "act" => SectionType::Act,
            _ => SectionType::Add,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::Lab => "lab",
            SectionType::Lec => "lec",
            SectionType::Sem => "sem",
            SectionType::Sup => "sup",
            SectionType::Act => "act",
            SectionType::Add => "add",
        }
    }
}

/// One raw section after header resolution and field typing.
#[derive(Debug, Clone)]
pub struct ResolvedSection {
    pub section_type: SectionType,
    pub section_number: String,
    pub class_number: String,
    pub instructor: Instructor,
    pub days: Vec<DayCode>,
    pub time: TimeRange,
    pub location: String,
    pub comment: String,
}

/// Resolve one section's raw pieces into typed fields. Every canonical
/// field participates regardless of which columns the source table carried;
/// a missing time column resolves to the sentinel range like any other
/// unparseable time.
pub fn resolve_section(pieces: &[RawSectionPiece]) -> ResolvedSection {
    let fields = CanonicalFields::from_pieces(pieces);

    ResolvedSection {
        section_type: SectionType::from_raw(&fields.section_type),
        instructor: instructor::extract(&fields.instructor),
        days: days::extract(&fields.days),
        time: time::resolve(&fields.time),
        section_number: fields.section_number,
        class_number: fields.class_number,
        location: fields.location,
        comment: fields.comment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(raw_key: &str, value: &str) -> RawSectionPiece {
        RawSectionPiece {
            raw_key: raw_key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn section_type_recognizes_known_values() {
        assert_eq!(SectionType::from_raw("LEC"), SectionType::Lec);
        assert_eq!(SectionType::from_raw(" lab "), SectionType::Lab);
        assert_eq!(SectionType::from_raw("Sem"), SectionType::Sem);
    }

    #[test]
    fn blank_and_unknown_types_become_add() {
        assert_eq!(SectionType::from_raw(""), SectionType::Add);
        assert_eq!(SectionType::from_raw(" "), SectionType::Add);
        assert_eq!(SectionType::from_raw("weird"), SectionType::Add);
    }

    #[test]
    fn resolves_full_section() {
        let pieces = vec![
            piece("SEC.", "01"),
            piece("CLASS #", "12345"),
            piece("TYPE", "LEC"),
            piece("DAYS", "TuTh"),
            piece("TIME", "11:00-12:15pm"),
            piece("LOCATION", "ECS-302"),
            piece("INSTRUCTOR", "Smith J"),
            piece("COMMENT", "Permission required"),
        ];
        let s = resolve_section(&pieces);
        assert_eq!(s.section_type, SectionType::Lec);
        assert_eq!(s.section_number, "01");
        assert_eq!(s.class_number, "12345");
        assert_eq!(s.days, vec![DayCode::Tu, DayCode::Th]);
        assert_eq!(s.time.start.raw_minutes, 660);
        assert_eq!(s.time.end.raw_minutes, 735);
        assert_eq!(s.instructor.last_name, "Smith");
        assert_eq!(s.instructor.first_name, "J");
        assert_eq!(s.location, "ECS-302");
        assert_eq!(s.comment, "Permission required");
    }

    #[test]
    fn missing_columns_resolve_to_defaults() {
        let s = resolve_section(&[piece("SEC.", "02")]);
        assert_eq!(s.section_number, "02");
        assert_eq!(s.section_type, SectionType::Add);
        assert!(s.days.is_empty());
        assert_eq!(s.time.start.raw, "error");
        assert_eq!(s.location, "");
        assert_eq!(s.instructor, instructor::Instructor::default());
    }
}
