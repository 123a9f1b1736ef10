//! CSV loader for catalog, prerequisite and transcript files
//!
//! Every file starts with a header row; fields are looked up by header name
//! (case-insensitive), so column order is free. Double-quoted fields may
//! contain commas.

use super::InMemoryStore;
use crate::core::error::{AdvisorError, Result};
use crate::core::models::{
    Catalog, CourseCatalogEntry, CourseStatus, PrerequisiteGraph, TranscriptRecord,
};
use crate::core::models::semester::{MAX_STUDY_YEAR, SEMESTERS_PER_YEAR};
use std::fs;
use std::path::Path;

/// Highest score on the grading scale
const MAX_SCORE: f64 = 10.0;

/// Load all three files and assemble a store
///
/// # Arguments
/// * `catalog` - Path to the course catalog CSV
/// * `prerequisites` - Path to the prerequisite CSV
/// * `transcripts` - Path to the transcript CSV
///
/// # Errors
/// Returns `DataUnavailable` if a file cannot be read and `InvalidRecord`
/// for the first row that fails validation
pub fn load_store(catalog: &Path, prerequisites: &Path, transcripts: &Path) -> Result<InMemoryStore> {
    let catalog = load_catalog(catalog)?;
    let graph = load_prerequisites(prerequisites, &catalog)?;
    let records = load_transcripts(transcripts)?;
    crate::info!(
        "Loaded {} courses, {} prerequisite edges, {} transcript rows",
        catalog.len(),
        graph.edge_count(),
        records.len()
    );
    Ok(InMemoryStore::new(catalog, graph, records))
}

/// Load the course catalog CSV (`Code,Name,Credits,Type,Note`)
///
/// # Errors
/// Returns an error if the file cannot be read or a row is invalid
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    parse_catalog(&read(path)?, &path.display().to_string())
}

/// Load the prerequisite CSV (`Course,Prerequisites` with `;`-separated codes)
///
/// # Errors
/// Returns an error if the file cannot be read or a row is invalid
pub fn load_prerequisites(path: &Path, catalog: &Catalog) -> Result<PrerequisiteGraph> {
    parse_prerequisites(&read(path)?, &path.display().to_string(), catalog)
}

/// Load the transcript CSV
/// (`Student,Year,Semester,Course,Credits,Score,Status,OnTime,Graduated`)
///
/// # Errors
/// Returns an error if the file cannot be read or a row is invalid
pub fn load_transcripts(path: &Path) -> Result<Vec<TranscriptRecord>> {
    parse_transcripts(&read(path)?, &path.display().to_string())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| AdvisorError::data_unavailable(format!("{}: {e}", path.display())))
}

/// Parse catalog CSV content
///
/// # Errors
/// Returns `InvalidRecord` for missing fields, bad credits or duplicate codes
pub fn parse_catalog(content: &str, source: &str) -> Result<Catalog> {
    let table = Table::parse(content, source)?;
    let mut entries = Vec::new();

    for row in table.rows() {
        let code = row.required("Code")?.to_string();
        let name = row.required("Name")?.to_string();
        let credits = row.number("Credits")?;
        if credits < 0.0 {
            return Err(row.invalid("Credits must not be negative"));
        }
        let course_type = row.optional("Type").unwrap_or_default().to_string();
        let note = row.optional("Note").map(str::to_string);

        entries.push(CourseCatalogEntry {
            code,
            name,
            credits,
            course_type,
            note,
        });
    }

    Catalog::from_entries(entries).map_err(|code| {
        AdvisorError::invalid_record(source, format!("duplicate course code {code}"))
    })
}

/// Parse prerequisite CSV content.
///
/// Codes unknown to the catalog are kept (and warned about) so a partial
/// catalog never silently relaxes a requirement.
///
/// # Errors
/// Returns `InvalidRecord` when a row has no course code
pub fn parse_prerequisites(content: &str, source: &str, catalog: &Catalog) -> Result<PrerequisiteGraph> {
    let table = Table::parse(content, source)?;
    let mut graph = PrerequisiteGraph::new();

    for row in table.rows() {
        let course = row.required("Course")?;
        if !catalog.contains(course) {
            crate::warn!("{}: prerequisite row for unknown course {course}", row.location());
        }
        let Some(list) = row.optional("Prerequisites") else {
            continue;
        };
        for prereq in list.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            if !catalog.contains(prereq) {
                crate::warn!("{}: unknown prerequisite {prereq} for {course}", row.location());
            }
            graph.add_prerequisite(course, prereq);
        }
    }

    Ok(graph)
}

/// Parse transcript CSV content
///
/// # Errors
/// Returns `InvalidRecord` for the first row with a missing or malformed field
pub fn parse_transcripts(content: &str, source: &str) -> Result<Vec<TranscriptRecord>> {
    let table = Table::parse(content, source)?;
    let mut records = Vec::new();

    for row in table.rows() {
        let student_id = row.required("Student")?.to_string();
        let year = row.integer("Year")?;
        let semester = row.integer("Semester")?;
        if year == 0 || year > MAX_STUDY_YEAR {
            return Err(row.invalid(format!("Year must be between 1 and {MAX_STUDY_YEAR}")));
        }
        if semester == 0 || semester > SEMESTERS_PER_YEAR {
            return Err(row.invalid(format!("Semester must be between 1 and {SEMESTERS_PER_YEAR}")));
        }
        let course_code = row.required("Course")?.to_string();
        let credits = row.number("Credits")?;

        let score = match row.optional("Score") {
            None => None,
            Some(raw) => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| row.invalid(format!("Score is not a number: {raw}")))?;
                if !(0.0..=MAX_SCORE).contains(&value) {
                    return Err(row.invalid(format!("Score out of range: {value}")));
                }
                Some(value)
            }
        };

        let status = match (row.optional("Status"), score) {
            (Some(raw), _) => raw.parse::<CourseStatus>().map_err(|e| row.invalid(e))?,
            (None, Some(s)) if s >= crate::core::models::transcript::PASSING_SCORE => {
                CourseStatus::Passed
            }
            (None, Some(_)) => CourseStatus::Failed,
            (None, None) => return Err(row.invalid("Either Score or Status is required")),
        };

        records.push(TranscriptRecord {
            student_id,
            year,
            semester,
            course_code,
            credits,
            score,
            status,
            on_time: row.flag("OnTime")?,
            graduated: row.flag("Graduated")?,
        });
    }

    Ok(records)
}

/// Header plus data lines of one CSV document
struct Table<'a> {
    source: &'a str,
    headers: Vec<String>,
    lines: Vec<(usize, &'a str)>,
}

impl<'a> Table<'a> {
    fn parse(content: &'a str, source: &'a str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines
            .next()
            .ok_or_else(|| AdvisorError::invalid_record(source, "missing header row"))?;

        Ok(Self {
            source,
            headers: parse_csv_line(header_line.trim_start_matches('\u{feff}')),
            lines: lines.collect(),
        })
    }

    fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.lines.iter().map(|&(number, line)| Row {
            source: self.source,
            number,
            headers: &self.headers,
            fields: parse_csv_line(line),
        })
    }
}

/// One data line with header-indexed access
struct Row<'a> {
    source: &'a str,
    number: usize,
    headers: &'a [String],
    fields: Vec<String>,
}

impl Row<'_> {
    fn location(&self) -> String {
        format!("{}:{}", self.source, self.number)
    }

    fn invalid(&self, message: impl Into<String>) -> AdvisorError {
        AdvisorError::invalid_record(self.location(), message)
    }

    /// Field by header name; empty fields read as absent
    fn optional(&self, header: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(header))
            .and_then(|idx| self.fields.get(idx))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn required(&self, header: &str) -> Result<&str> {
        self.optional(header)
            .ok_or_else(|| self.invalid(format!("Missing {header}")))
    }

    fn number(&self, header: &str) -> Result<f64> {
        let raw = self.required(header)?;
        raw.parse()
            .map_err(|_| self.invalid(format!("{header} is not a number: {raw}")))
    }

    fn integer(&self, header: &str) -> Result<u32> {
        let raw = self.required(header)?;
        raw.parse()
            .map_err(|_| self.invalid(format!("{header} is not an integer: {raw}")))
    }

    fn flag(&self, header: &str) -> Result<bool> {
        let raw = self.required(header)?;
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(true),
            "false" | "no" | "n" | "0" => Ok(false),
            _ => Err(self.invalid(format!("{header} is not a boolean: {raw}"))),
        }
    }
}

/// Split a CSV line into trimmed fields, honouring double quotes
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = "Code,Name,Credits,Type,Note\n\
        CT100,Intro to IT,2,required,\n\
        CT101,\"Programming, Basics\",4,required,core\n";

    #[test]
    fn test_parse_csv_line() {
        let fields = parse_csv_line("CT101, \"Programming, Basics\" ,4,,\"say \"\"hi\"\"\"");
        assert_eq!(
            fields,
            vec!["CT101", "Programming, Basics", "4", "", "say \"hi\""]
        );
    }

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(CATALOG, "catalog.csv").expect("valid catalog");
        assert_eq!(catalog.len(), 2);

        let course = catalog.get("CT101").expect("CT101 present");
        assert_eq!(course.name, "Programming, Basics");
        assert_eq!(course.note.as_deref(), Some("core"));
        assert!(catalog.get("CT100").expect("CT100 present").note.is_none());
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_bad_credits() {
        let duplicate = "Code,Name,Credits\nCT100,A,2\nCT100,B,2\n";
        let err = parse_catalog(duplicate, "c.csv").expect_err("duplicate code");
        assert!(err.to_string().contains("duplicate course code CT100"));

        let bad = "Code,Name,Credits\nCT100,A,two\n";
        let err = parse_catalog(bad, "c.csv").expect_err("bad credits");
        assert!(err.to_string().contains("c.csv:2"));
    }

    #[test]
    fn test_parse_prerequisites() {
        let catalog = parse_catalog(CATALOG, "catalog.csv").expect("valid catalog");
        let content = "Course,Prerequisites\nCT101,CT100\nCT100,\n";
        let graph = parse_prerequisites(content, "prereq.csv", &catalog).expect("valid prerequisites");

        assert_eq!(graph.prerequisites("CT101"), vec!["CT100".to_string()]);
        assert!(graph.prerequisites("CT100").is_empty());
    }

    #[test]
    fn test_parse_transcripts() {
        let content = "Student,Year,Semester,Course,Credits,Score,Status,OnTime,Graduated\n\
            B001,1,1,CT100,2,8.5,Đã học,true,true\n\
            B002,1,2,CT101,4,,In progress,false,false\n\
            B003,1,1,CT100,2,3.5,,0,0\n";
        let records = parse_transcripts(content, "t.csv").expect("valid transcripts");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].status, CourseStatus::Passed);
        assert!(records[0].on_time && records[0].graduated);
        assert_eq!(records[1].score, None);
        assert_eq!(records[1].status, CourseStatus::InProgress);
        assert_eq!(records[2].status, CourseStatus::Failed);
    }

    #[test]
    fn test_transcripts_reject_invalid_rows() {
        let header = "Student,Year,Semester,Course,Credits,Score,Status,OnTime,Graduated\n";

        let missing_credits = format!("{header}B001,1,1,CT100,,8,Passed,true,true\n");
        assert!(parse_transcripts(&missing_credits, "t.csv").is_err());

        let bad_semester = format!("{header}B001,1,4,CT100,2,8,Passed,true,true\n");
        assert!(parse_transcripts(&bad_semester, "t.csv").is_err());

        let bad_year = format!("{header}B001,4294967295,3,CT100,2,8,Passed,true,true\n");
        let err = parse_transcripts(&bad_year, "t.csv").expect_err("year out of range");
        assert!(err.to_string().contains("Year must be between 1 and 10"));

        let bad_status = format!("{header}B001,1,1,CT100,2,8,Maybe,true,true\n");
        assert!(parse_transcripts(&bad_status, "t.csv").is_err());

        let no_result = format!("{header}B001,1,1,CT100,2,,,true,true\n");
        assert!(parse_transcripts(&no_result, "t.csv").is_err());
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let err = load_catalog(Path::new("/definitely/not/here.csv")).expect_err("missing file");
        assert!(matches!(err, AdvisorError::DataUnavailable { .. }));
    }
}
