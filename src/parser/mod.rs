pub mod dedup;
pub mod extract;
pub mod headers;
pub mod time;

use rayon::prelude::*;

use crate::ingest::{RawDepartment, RawGroup, Semester, TermSchedule};
use dedup::{GroupDedup, GroupIdSource};
use extract::course;
use extract::days::DayCode;
use extract::department::{self, DepartmentParts};
use extract::instructor::Instructor;
use extract::SectionType;
use time::TimeRange;

/// One schedule section in final, typed form. Immutable once built;
/// storage and export are projections of this.
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    pub semester: Semester,
    pub year: i32,
    pub dept_abbr: String,
    pub dept_title: String,
    pub course_number: String,
    pub course_title: String,
    pub units: String,
    pub group_id: String,
    pub section_type: SectionType,
    pub section_number: String,
    pub class_number: String,
    pub instructor: Instructor,
    pub days: Vec<DayCode>,
    pub time: TimeRange,
    pub location: String,
    pub comment: String,
}

/// Course-level context shared by every record a group emits.
struct CourseScope<'a> {
    semester: Semester,
    year: i32,
    parts: &'a DepartmentParts,
    course_number: String,
    course_title: &'a str,
    units: String,
}

/// Flatten one term's raw tree into records: department → course → group →
/// section. Departments are independent, so they fan out across the rayon
/// pool; within a group the raw section order is kept so the first of two
/// duplicate rows is the one that survives.
pub fn flatten_term(term: &TermSchedule, ids: &GroupIdSource) -> Vec<ParsedRecord> {
    term.departments
        .par_iter()
        .flat_map(|dept| flatten_department(term.semester, term.year, dept, ids))
        .collect()
}

fn flatten_department(
    semester: Semester,
    year: i32,
    dept: &RawDepartment,
    ids: &GroupIdSource,
) -> Vec<ParsedRecord> {
    let parts = department::extract(&dept.dept);

    let mut records = Vec::new();
    for raw_course in &dept.courses {
        let scope = CourseScope {
            semester,
            year,
            parts: &parts,
            course_number: course::extract_number(&raw_course.course_number),
            course_title: &raw_course.course_title,
            units: course::extract_units(&raw_course.units),
        };
        for group in &raw_course.groups {
            flatten_group(&scope, group, ids, &mut records);
        }
    }
    records
}

fn flatten_group(
    scope: &CourseScope,
    group: &RawGroup,
    ids: &GroupIdSource,
    out: &mut Vec<ParsedRecord>,
) {
    let group_id = ids.next_id();
    let mut dedup = GroupDedup::new();

    for pieces in &group.sections {
        let section = extract::resolve_section(pieces);
        if !dedup.admit(&section.section_number, &section.class_number) {
            continue;
        }

        out.push(ParsedRecord {
            semester: scope.semester,
            year: scope.year,
            dept_abbr: scope.parts.abbr.clone(),
            dept_title: scope.parts.title.clone(),
            course_number: scope.course_number.clone(),
            course_title: scope.course_title.to_string(),
            units: scope.units.clone(),
            group_id: group_id.clone(),
            section_type: section.section_type,
            section_number: section.section_number,
            class_number: section.class_number,
            instructor: section.instructor,
            days: section.days,
            time: section.time,
            location: section.location,
            comment: section.comment,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::time::Meridiem;

    fn fixture() -> TermSchedule {
        let json = std::fs::read_to_string("tests/fixtures/fall_2020.json").unwrap();
        serde_json::from_str(&json).unwrap()
    }

    fn flatten(term: &TermSchedule) -> Vec<ParsedRecord> {
        flatten_term(term, &GroupIdSource::new())
    }

    #[test]
    fn drops_same_group_duplicate() {
        let term = fixture();
        // 5 raw sections, one of which repeats its group's composite key.
        let records = flatten(&term);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn department_and_course_fields_propagate() {
        let records = flatten(&fixture());
        let lec = &records[0];
        assert_eq!(lec.semester, Semester::Fall);
        assert_eq!(lec.year, 2020);
        assert_eq!(lec.dept_abbr, "CECS");
        assert_eq!(lec.dept_title, "Computer Engineering and Computer Science");
        assert_eq!(lec.course_number, "491A");
        assert_eq!(lec.course_title, "Senior Project I");
        assert_eq!(lec.units, "3");
    }

    #[test]
    fn section_fields_resolved() {
        let records = flatten(&fixture());
        let lec = &records[0];
        assert_eq!(lec.section_type, SectionType::Lec);
        assert_eq!(lec.section_number, "01");
        assert_eq!(lec.class_number, "12345");
        assert_eq!(lec.days, vec![DayCode::Tu, DayCode::Th]);
        assert_eq!(lec.time.start.meridiem, Meridiem::Am);
        assert_eq!(lec.time.start.raw_minutes, 660);
        assert_eq!(lec.time.end.raw_minutes, 735);
        assert_eq!(lec.instructor.last_name, "Monsef");
        assert_eq!(lec.instructor.first_name, "H");
    }

    #[test]
    fn group_ids_shared_within_a_group_only() {
        let records = flatten(&fixture());
        // First two surviving records are the lecture+lab of group 0.
        assert_eq!(records[0].group_id, records[1].group_id);
        // The next group repeats the composite key but keeps its own id.
        assert_eq!(records[2].class_number, records[0].class_number);
        assert_ne!(records[2].group_id, records[0].group_id);
    }

    #[test]
    fn blank_type_becomes_add() {
        let records = flatten(&fixture());
        let biol = records.last().unwrap();
        assert_eq!(biol.dept_abbr, "BIOL");
        assert_eq!(biol.section_type, SectionType::Add);
        assert_eq!(biol.units, "1-4");
    }

    #[test]
    fn output_order_is_deterministic() {
        let term = fixture();
        let first: Vec<String> = flatten(&term)
            .iter()
            .map(|r| r.class_number.clone())
            .collect();
        let second: Vec<String> = flatten(&term)
            .iter()
            .map(|r| r.class_number.clone())
            .collect();
        assert_eq!(first, second);
    }
}
