//! Input loading: existence check, encoding resolution, schema check, parse.
use crate::encoding::EncodingResolver;
use crate::error::PipelineError;
use crate::record::{Record, COLUMNS};
use std::fs;
use std::path::Path;

/// Records parsed from the input plus what the loader learned about the file.
#[derive(Debug)]
pub struct LoadedInput {
    pub records: Vec<Record>,
    pub encoding: &'static str,
    pub headers: Vec<String>,
}

/// Load and validate the input CSV. Nothing is written on failure.
pub fn load_input(
    path: &Path,
    resolver: &dyn EncodingResolver,
) -> Result<LoadedInput, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = resolver
        .decode(&bytes)
        .map_err(|err| PipelineError::UndecodableInput {
            path: path.to_path_buf(),
            tried: err.tried,
        })?;
    let encoding = decoded.encoding.name();
    tracing::debug!(encoding, bytes = bytes.len(), "input decoded");

    let (headers, records) = parse_records(&decoded.text).map_err(|err| match err {
        ParseError::Schema(err) => err,
        ParseError::Csv(source) => PipelineError::MalformedInput {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(LoadedInput {
        records,
        encoding,
        headers,
    })
}

enum ParseError {
    Schema(PipelineError),
    Csv(csv::Error),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Csv(err)
    }
}

fn parse_records(text: &str) -> Result<(Vec<String>, Vec<Record>), ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut indices = [0usize; COLUMNS.len()];
    let mut missing = Vec::new();
    for (slot, column) in indices.iter_mut().zip(COLUMNS) {
        match headers.iter().position(|header| header == column) {
            Some(idx) => *slot = idx,
            None => missing.push(column.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(ParseError::Schema(PipelineError::SchemaMismatch {
            missing,
            found: headers,
        }));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cells = indices.map(|idx| row.get(idx).unwrap_or_default().to_string());
        records.push(Record::from_cells(cells));
    }
    Ok((headers, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TrialDecode;

    const HEADER: &str = "RF filter keywords,Keyword colors,Risk Score,Customer,Permutations,Notes\n";

    fn write_input(dir: &Path, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.join("input.csv");
        fs::write(&path, bytes).expect("write input");
        path
    }

    #[test]
    fn parses_rows_in_order_with_quoted_newlines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let body = format!(
            "{HEADER}alpha,red,10,acme,,\"line one\nline two\"\n  ,blue,20,globex,kept,\nbeta,\"a, b\",30,initech,,\n"
        );
        let path = write_input(dir.path(), body.as_bytes());

        let loaded = load_input(&path, &TrialDecode::default()).expect("load");
        assert_eq!(loaded.encoding, "UTF-8");
        assert_eq!(loaded.records.len(), 3);
        assert_eq!(loaded.records[0].rf_filter_keywords, "alpha");
        assert_eq!(loaded.records[0].notes, "line one\nline two");
        assert_eq!(loaded.records[1].permutations, "kept");
        assert_eq!(loaded.records[2].keyword_colors, "a, b");
    }

    #[test]
    fn column_order_in_input_is_irrelevant() {
        let dir = tempfile::tempdir().expect("tempdir");
        let body = "Notes,Extra,Customer,Permutations,Risk Score,Keyword colors,RF filter keywords\n\
                    n1,x,acme,,5,green,kw\n";
        let path = write_input(dir.path(), body.as_bytes());

        let loaded = load_input(&path, &TrialDecode::default()).expect("load");
        let record = &loaded.records[0];
        assert_eq!(record.rf_filter_keywords, "kw");
        assert_eq!(record.customer, "acme");
        assert_eq!(record.notes, "n1");
        assert_eq!(loaded.headers.len(), 7);
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let body = format!("{HEADER}kw,red\n");
        let path = write_input(dir.path(), body.as_bytes());

        let loaded = load_input(&path, &TrialDecode::default()).expect("load");
        assert_eq!(loaded.records[0].keyword_colors, "red");
        assert_eq!(loaded.records[0].notes, "");
    }

    #[test]
    fn missing_customer_reports_found_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let body = "RF filter keywords,Keyword colors,Risk Score,Permutations,Notes\nkw,red,1,,\n";
        let path = write_input(dir.path(), body.as_bytes());

        let err = load_input(&path, &TrialDecode::default()).expect_err("schema mismatch");
        match err {
            PipelineError::SchemaMismatch { missing, found } => {
                assert_eq!(missing, vec!["Customer".to_string()]);
                assert_eq!(found.len(), 5);
                assert!(found.contains(&"Risk Score".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_input(&dir.path().join("nope.csv"), &TrialDecode::default())
            .expect_err("missing file");
        assert!(matches!(err, PipelineError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_a_read_failure_not_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_input(dir.path(), &TrialDecode::default()).expect_err("directory");
        assert!(matches!(err, PipelineError::Read { .. }), "{err}");
    }

    #[test]
    fn windows_1252_input_decodes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"caf\xe9,red,1,Soci\xe9t\xe9,,\n");
        let path = write_input(dir.path(), &bytes);

        let loaded = load_input(&path, &TrialDecode::default()).expect("load");
        assert_eq!(loaded.encoding, "windows-1252");
        assert_eq!(loaded.records[0].rf_filter_keywords, "café");
        assert_eq!(loaded.records[0].customer, "Société");
    }
}
