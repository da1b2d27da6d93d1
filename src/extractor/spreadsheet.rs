use crate::error::{AskError, AskResult};
use crate::models::Document;
use calamine::{Data, Reader};
use std::io::Cursor;
use std::path::Path;

/// Flattens workbooks (xlsx, xlsm, xlsb, xls, ods) into one text blob
pub struct SpreadsheetReader;

impl SpreadsheetReader {
    /// Flatten every sheet of an in-memory workbook.
    ///
    /// Cells are space-separated within a row and rows newline-separated,
    /// sheets in workbook order. Anything calamine cannot open is reported
    /// as [`AskError::FormatUnsupported`].
    pub fn extract_text(bytes: &[u8]) -> AskResult<String> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| AskError::FormatUnsupported(e.to_string()))?;

        let mut lines = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
                AskError::FormatUnsupported(format!("sheet '{}': {}", sheet_name, e))
            })?;

            for row in range.rows() {
                let cells: Vec<String> = row
                    .iter()
                    .filter(|cell| !matches!(cell, Data::Empty))
                    .map(cell_to_string)
                    .collect();
                // The used range also spans rows that hold no cells at all
                if !cells.is_empty() {
                    lines.push(cells.join(" "));
                }
            }
        }

        Ok(lines.join("\n"))
    }

    /// Build the single document for an uploaded workbook, keyed by file name
    pub fn to_document(file_name: &str, bytes: &[u8]) -> AskResult<Document> {
        let id = upload_name(file_name)?;
        if bytes.is_empty() {
            return Err(AskError::input(format!("uploaded file '{}' is empty", id)));
        }
        let content = Self::extract_text(bytes)?;
        Ok(Document::with_id(id, content))
    }

    /// Read a workbook from disk; the document id is the bare file name
    pub async fn read_path(path: &Path) -> AskResult<Document> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AskError::input(format!("no file name in {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        tokio::task::spawn_blocking(move || Self::to_document(&file_name, &bytes))
            .await
            .map_err(|e| AskError::FormatUnsupported(format!("spreadsheet parser failed: {}", e)))?
    }
}

/// Strip any client-side directory from an upload name
fn upload_name(file_name: &str) -> AskResult<String> {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        return Err(AskError::input("uploaded file has no name"));
    }
    Ok(name.to_string())
}

/// Render one cell according to its type.
///
/// Formula cells arrive as their cached result, so a text result is used as
/// text and a numeric result as a number.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_cell_to_string_by_type() {
        assert_eq!(cell_to_string(&Data::String("  Paris ".into())), "Paris");
        assert_eq!(cell_to_string(&Data::Float(42.0)), "42");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(-7)), "-7");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_extract_text_rows_and_sheets() {
        let bytes = xlsx(&[
            (
                "Cities",
                vec![
                    vec![text("A1", "City"), text("B1", "Country")],
                    vec![text("A2", "Paris"), text("B2", "France")],
                ],
            ),
            (
                "Stats",
                vec![vec![
                    text("A1", "Population"),
                    number("B1", "2161000"),
                    boolean("C1", true),
                ]],
            ),
        ]);

        let text = SpreadsheetReader::extract_text(&bytes).unwrap();
        assert_eq!(text, "City Country\nParis France\nPopulation 2161000 true");
    }

    #[test]
    fn test_extract_text_skips_rows_without_values() {
        let bytes = xlsx(&[(
            "Sparse",
            vec![
                vec![text("A1", "a")],
                vec![],
                vec![text("A3", "c"), text("C3", "d")],
            ],
        )]);

        let text = SpreadsheetReader::extract_text(&bytes).unwrap();
        assert_eq!(text, "a\nc d");
    }

    #[test]
    fn test_extract_text_formula_cells_use_cached_value() {
        let bytes = xlsx(&[(
            "Sheet1",
            vec![vec![
                number("A1", "2"),
                numeric_formula("B1", "A1*2", "4"),
                text_formula("C1", "CONCAT(\"a\",\"b\")", "ab"),
            ]],
        )]);

        let text = SpreadsheetReader::extract_text(&bytes).unwrap();
        assert_eq!(text, "2 4 ab");
    }

    #[test]
    fn test_extract_text_rejects_non_workbook() {
        let result = SpreadsheetReader::extract_text(b"name,age\nJohn,30\n");
        assert!(matches!(result, Err(AskError::FormatUnsupported(_))));
    }

    #[test]
    fn test_to_document_uses_file_name_as_id() {
        let bytes = xlsx(&[("Sheet1", vec![vec![text("A1", "hello")]])]);
        let doc = SpreadsheetReader::to_document("C:\\uploads\\report.xlsx", &bytes).unwrap();
        assert_eq!(doc.id.as_deref(), Some("report.xlsx"));
        assert_eq!(doc.content, "hello");
    }

    #[test]
    fn test_to_document_rejects_empty_upload() {
        let result = SpreadsheetReader::to_document("report.xlsx", &[]);
        assert!(matches!(result, Err(AskError::InputInvalid(_))));
        let result = SpreadsheetReader::to_document("", b"data");
        assert!(matches!(result, Err(AskError::InputInvalid(_))));
    }

    #[tokio::test]
    async fn test_read_path_missing_file_is_io_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = SpreadsheetReader::read_path(&temp_dir.path().join("missing.xlsx")).await;
        assert!(matches!(result, Err(AskError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_path_builds_document() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("cities.xlsx");
        std::fs::write(&path, xlsx(&[("S", vec![vec![text("A1", "Paris")]])])).unwrap();

        let doc = SpreadsheetReader::read_path(&path).await.unwrap();
        assert_eq!(doc.id.as_deref(), Some("cities.xlsx"));
        assert_eq!(doc.content, "Paris");
    }
}
