//! Tabular input and output.
//!
//! Every dataset and artifact is a header row followed by one record per
//! row. Numeric output columns are written with fixed precision so that
//! artifacts diff cleanly between runs.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use crate::error::EngineError;

/// A row type written as one output artifact.
pub trait Table: Serialize {
    /// Column names, in the order fields are serialized.
    const HEADERS: &'static [&'static str];
}

/// Read every row of a table from a reader.
///
/// Columns missing from the header fall back to empty strings; extra
/// columns are ignored.
pub fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, EngineError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Read every row of a table file.
pub fn read_table<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, EngineError> {
    let file = File::open(path.as_ref())?;
    read_rows(file)
}

/// Write a header and all rows to a writer.
///
/// The header is always written, even for an empty artifact.
pub fn write_rows<T: Table, W: Write>(writer: W, rows: &[T]) -> Result<(), EngineError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a table file, creating parent directories as needed.
pub fn write_table<T: Table>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), EngineError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_rows(File::create(path)?, rows)
}

/// Serialize a score with two decimal places.
pub fn two_places<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", value))
}

/// Serialize a mean with four decimal places.
pub fn four_places<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.4}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::CostRecord;

    #[derive(Serialize)]
    struct Line {
        name: String,
        #[serde(serialize_with = "two_places")]
        score: f64,
    }

    impl Table for Line {
        const HEADERS: &'static [&'static str] = &["name", "score"];
    }

    fn render(rows: &[Line]) -> String {
        let mut buf = Vec::new();
        write_rows(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_empty_table_still_has_header() {
        assert_eq!(render(&[]), "name,score\n");
    }

    #[test]
    fn test_fixed_precision() {
        let rows = vec![Line {
            name: "F1".to_string(),
            score: 0.8,
        }];
        assert_eq!(render(&rows), "name,score\nF1,0.80\n");
    }

    #[test]
    fn test_read_tolerates_missing_and_extra_columns() {
        let input = "mechanism_family,cost_type,extra\nF1,OpportunityCost,x\n";
        let rows: Vec<CostRecord> = read_rows(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mechanism_family, "F1");
        assert_eq!(rows[0].magnitude, "");
    }
}
