use crate::core::models::{Composition, CompositionError, PdEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EntryIoError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("JSON parsing error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Invalid formula on line {line} of '{path}': {source}")]
    Formula {
        path: String,
        line: usize,
        source: CompositionError,
    },
}

/// One row of an entries CSV file: `name,formula,energy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryRecord {
    #[serde(default)]
    name: String,
    formula: String,
    energy: f64,
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Reads entries from `path`, choosing the format by extension.
///
/// `.json` files hold an array of serialized [`PdEntry`] values; anything else is read
/// as CSV with the header `name,formula,energy`.
pub fn read_entries(path: &Path) -> Result<Vec<PdEntry>, EntryIoError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let entries = if is_json {
        read_entries_json(path)?
    } else {
        read_entries_csv(path)?
    };
    debug!("Read {} entries from '{}'.", entries.len(), path.display());
    Ok(entries)
}

/// Reads a CSV entries file. An empty `name` defaults to the formula as written.
pub fn read_entries_csv(path: &Path) -> Result<Vec<PdEntry>, EntryIoError> {
    let csv_error = |e: csv::Error| EntryIoError::Csv {
        path: path_string(path),
        source: e,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut entries = Vec::new();
    for result in reader.records() {
        let raw = result.map_err(csv_error)?;
        let line = raw.position().map_or(0, |p| p.line() as usize);
        let record: EntryRecord = raw.deserialize(Some(&headers)).map_err(csv_error)?;
        let composition: Composition = record.formula.parse().map_err(|e| EntryIoError::Formula {
            path: path_string(path),
            line,
            source: e,
        })?;
        let name = if record.name.is_empty() {
            record.formula
        } else {
            record.name
        };
        entries.push(PdEntry {
            name,
            composition,
            energy: record.energy,
        });
    }
    Ok(entries)
}

pub fn read_entries_json(path: &Path) -> Result<Vec<PdEntry>, EntryIoError> {
    let content = std::fs::read_to_string(path).map_err(|e| EntryIoError::Io {
        path: path_string(path),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| EntryIoError::Json {
        path: path_string(path),
        source: e,
    })
}

/// Writes entries as CSV; compositions are written with [`Composition::formula`].
pub fn write_entries_csv(path: &Path, entries: &[PdEntry]) -> Result<(), EntryIoError> {
    let csv_error = |e: csv::Error| EntryIoError::Csv {
        path: path_string(path),
        source: e,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for entry in entries {
        writer
            .serialize(EntryRecord {
                name: entry.name.clone(),
                formula: entry.composition.formula(),
                energy: entry.energy,
            })
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|e| EntryIoError::Io {
        path: path_string(path),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn csv_entries_are_read_with_default_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "name,formula,energy").unwrap();
        writeln!(file, "sodium,Na,-1.0").unwrap();
        writeln!(file, ",O2,-10.0").unwrap();
        writeln!(file, "# a comment line").unwrap();
        writeln!(file, " , Na2O , -10.0").unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "sodium");
        assert_eq!(entries[1].name, "O2");
        assert_eq!(entries[2].name, "Na2O");
        assert_eq!(entries[2].composition, "Na2O".parse().unwrap());
        assert_eq!(entries[2].energy, -10.0);
    }

    #[test]
    fn invalid_formula_reports_its_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.csv");
        std::fs::write(&path, "name,formula,energy\nNa,Na,-1.0\nbad,Xx2O,-3.0\n").unwrap();

        match read_entries(&path) {
            Err(EntryIoError::Formula { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a formula error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_a_csv_error_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        let err = read_entries(&path).unwrap_err();
        assert!(matches!(err, EntryIoError::Csv { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn written_csv_can_be_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let entries = vec![
            PdEntry::new("Na".parse().unwrap(), -1.0),
            PdEntry::new("NaNbO3".parse().unwrap(), -35.0).with_name("perovskite"),
        ];
        write_entries_csv(&path, &entries).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("name,formula,energy"));
        assert_eq!(read_entries(&path).unwrap(), entries);
    }

    #[test]
    fn json_entries_are_read_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.json");
        std::fs::write(
            &path,
            r#"[{"name":"Na","composition":{"Na":1.0},"energy":-1.0}]"#,
        )
        .unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries, vec![PdEntry::new("Na".parse().unwrap(), -1.0)]);
    }
}
