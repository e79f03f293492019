//! Detector class-name file reading.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read detector class names.
///
/// # File Format
/// - One class name per line, line `i` names class `i`
/// - Surrounding whitespace is trimmed
/// - Trailing blank lines are ignored; interior blank lines keep their index
///
/// # Errors
/// - Returns error if file cannot be read
/// - Returns error if file contains invalid UTF-8
pub fn read_labels(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::LabelsRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    let mut labels = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| Error::LabelsRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        labels.push(line.trim().to_string());
    }

    while labels.last().is_some_and(String::is_empty) {
        labels.pop();
    }

    Ok(labels)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_labels_keeps_positions() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "person").unwrap();
        writeln!(file).unwrap();
        writeln!(file, " cat ").unwrap();
        writeln!(file).unwrap();

        let labels = read_labels(file.path()).unwrap();
        assert_eq!(labels, vec!["person", "", "cat"]);
    }

    #[test]
    fn test_read_labels_file_not_found() {
        let result = read_labels(Path::new("nonexistent.names"));
        assert!(matches!(result, Err(Error::LabelsRead { .. })));
    }
}
