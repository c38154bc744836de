//! Product catalog ingest and normalization.
//!
//! Turns a product CSV (at minimum `model_number` + `description`
//! columns) into catalog entries whose pricing terms are already parsed,
//! so later quotations are a pure lookup + fold with no re-parsing.
//!
//! Design goals, mirrored from the rest of the pipeline:
//! - strict schema for required columns (clear errors + exit code 2)
//! - row-level validation (skip bad rows, but report what happened)
//! - deterministic behavior

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::PriceTerms;
use crate::error::AppError;
use crate::pricing::parser::parse_description;

const COL_MODEL: &str = "model_number";
const COL_DESCRIPTION: &str = "description";

/// One catalog row, with pricing terms derived at load time.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub model: String,
    /// Raw description text, kept for display. `None` when the cell was
    /// empty; such rows still quote (to zero, with a diagnostic).
    pub description: Option<String>,
    pub terms: PriceTerms,
    /// Parse warnings for this row (e.g. a dropped zero-step stroke rule).
    pub warnings: Vec<String>,
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: usable entries plus row diagnostics.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl Catalog {
    /// Row lookup by exact model identifier match.
    pub fn find(&self, model: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.model == model)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.model.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load a catalog CSV from disk.
pub fn load_catalog(path: &Path) -> Result<Catalog, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open catalog '{}': {e}", path.display()),
        )
    })?;
    read_catalog(file)
}

/// Read and normalize a catalog from any reader.
pub fn read_catalog<R: Read>(reader: R) -> Result<Catalog, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read catalog headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let model_idx = *header_map.get(COL_MODEL).ok_or_else(|| {
        AppError::new(2, format!("Catalog is missing required column '{COL_MODEL}'."))
    })?;
    let desc_idx = *header_map.get(COL_DESCRIPTION).ok_or_else(|| {
        AppError::new(
            2,
            format!("Catalog is missing required column '{COL_DESCRIPTION}'."),
        )
    })?;

    let mut entries: Vec<CatalogEntry> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in csv_reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV line
        // numbers are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let model = match record.get(model_idx).filter(|m| !m.is_empty()) {
            Some(m) => m.to_string(),
            None => {
                row_errors.push(RowError {
                    line,
                    message: "Missing model number.".to_string(),
                });
                continue;
            }
        };

        if entries.iter().any(|e| e.model == model) {
            row_errors.push(RowError {
                line,
                message: format!("Duplicate model number '{model}'; first occurrence wins."),
            });
            continue;
        }

        let description = record
            .get(desc_idx)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let (terms, warnings) = match &description {
            Some(text) => {
                let out = parse_description(text);
                (out.terms, out.warnings)
            }
            None => (PriceTerms::default(), Vec::new()),
        };

        entries.push(CatalogEntry {
            model,
            description,
            terms,
            warnings,
        });
    }

    if entries.is_empty() {
        return Err(AppError::new(
            3,
            "No usable rows in the catalog (need model_number + description).",
        ));
    }

    Ok(Catalog {
        entries,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix
    // on the first header (e.g. "\u{feff}model_number"). Strip it so
    // schema validation does not report a missing column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "model_number,description\n\
        JX524,单价:1000 行程100-500 每加行程50毫米加20元\n\
        JX522,单价:600 鱼眼接头加25元\n";

    #[test]
    fn reads_rows_and_parses_terms_at_load() {
        let catalog = read_catalog(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.rows_read, 2);
        assert!(catalog.row_errors.is_empty());

        let entry = catalog.find("JX524").unwrap();
        assert_eq!(entry.terms.base_price, Some(1000));
        assert!(entry.terms.stroke_rule.is_some());
        assert!(entry.description.as_deref().unwrap().contains("单价"));
    }

    #[test]
    fn lookup_is_exact_match() {
        let catalog = read_catalog(Cursor::new(SAMPLE)).unwrap();
        assert!(catalog.find("JX52").is_none());
        assert!(catalog.find("jx524").is_none());
    }

    #[test]
    fn missing_model_number_becomes_row_error() {
        let data = "model_number,description\n,单价:100\nJX520,单价:200\n";
        let catalog = read_catalog(Cursor::new(data)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.row_errors.len(), 1);
        assert_eq!(catalog.row_errors[0].line, 2);
    }

    #[test]
    fn empty_description_is_kept_with_empty_terms() {
        let data = "model_number,description\nJX520,\n";
        let catalog = read_catalog(Cursor::new(data)).unwrap();
        let entry = catalog.find("JX520").unwrap();
        assert!(entry.description.is_none());
        assert_eq!(entry.terms, PriceTerms::default());
    }

    #[test]
    fn duplicate_model_keeps_first_occurrence() {
        let data = "model_number,description\nJX520,单价:100\nJX520,单价:999\n";
        let catalog = read_catalog(Cursor::new(data)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find("JX520").unwrap().terms.base_price, Some(100));
        assert_eq!(catalog.row_errors.len(), 1);
    }

    #[test]
    fn bom_and_case_in_headers_are_tolerated() {
        let data = "\u{feff}Model_Number,Description\nJX520,单价:100\n";
        let catalog = read_catalog(Cursor::new(data)).unwrap();
        assert_eq!(catalog.find("JX520").unwrap().terms.base_price, Some(100));
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let data = "model_number,price\nJX520,100\n";
        let err = read_catalog(Cursor::new(data)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let data = "model_number,description\n";
        let err = read_catalog(Cursor::new(data)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn zero_step_rule_warning_is_carried_on_entry() {
        let data = "model_number,description\nJX520,单价:100 行程100-500 每加行程0毫米加20元\n";
        let catalog = read_catalog(Cursor::new(data)).unwrap();
        let entry = catalog.find("JX520").unwrap();
        assert!(entry.terms.stroke_rule.is_none());
        assert_eq!(entry.warnings.len(), 1);
    }
}
