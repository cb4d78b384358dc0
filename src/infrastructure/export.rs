//! CSV result sink.
//!
//! Writes the finalized collection as `course_id,status,details`, one row per
//! ID in ascending order. Exporting the same finalized collection twice
//! produces byte-identical output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::record::CourseRecord;

const HEADER: &str = "course_id,status,details";

/// Write all records to `path`, creating parent directories as needed.
/// Records are expected in ascending ID order (the collection snapshot
/// already is).
pub fn export_csv(path: &Path, records: &[CourseRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{HEADER}")?;
    for record in records {
        write!(writer, "{},{},", record.course_id, record.status)?;
        write_field(&mut writer, &record.detail)?;
        writeln!(writer)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok(())
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_field<W: Write>(writer: &mut W, field: &str) -> std::io::Result<()> {
    if needs_quotes(field) {
        let escaped = field.replace('"', "\"\"");
        write!(writer, "\"{escaped}\"")
    } else {
        write!(writer, "{field}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::CourseStatus;

    fn sample_records() -> Vec<CourseRecord> {
        vec![
            CourseRecord::new(1, CourseStatus::Success, "Operating Systems"),
            CourseRecord::new(2, CourseStatus::Error, "Invalid course, try again"),
            CourseRecord::new(3, CourseStatus::NoContent, "no course found, but no error or redirect"),
            CourseRecord::new(4, CourseStatus::Unresolved, "no record after 5 retry rounds"),
        ]
    }

    #[test]
    fn export_writes_sorted_three_column_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_csv(&path, &sample_records()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "course_id,status,details");
        assert_eq!(lines[1], "1,Success,Operating Systems");
        // Comma in the detail forces quoting.
        assert_eq!(lines[2], "2,Error,\"Invalid course, try again\"");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn export_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let records = sample_records();

        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        export_csv(&first, &records).unwrap();
        export_csv(&second, &records).unwrap();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn quotes_inside_details_are_doubled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.csv");
        let records = vec![CourseRecord::new(
            9,
            CourseStatus::Success,
            "Course \"Advanced\" Topics",
        )];
        export_csv(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"9,Success,"Course ""Advanced"" Topics""#));
    }

    #[test]
    fn parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.csv");
        export_csv(&path, &sample_records()).unwrap();
        assert!(path.exists());
    }
}
