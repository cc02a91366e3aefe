//! Bounded textual rendering of spreadsheet documents.
//!
//! Turns a parsed document into the plain-text blob embedded in analysis
//! prompts: per-sheet sections with dimensions, flattened row data and
//! aggregate statistics for numeric columns. A malformed sheet degrades to
//! an inline notice; the rest of the document is still rendered.

use super::model::{CellValue, Sheet, SpreadsheetDocument};
use crate::error::{CuadreError, Result};

/// Formats one document under a display filename.
///
/// # Errors
///
/// Returns `InvalidInput` when the document has no sheets at all. Per-sheet
/// failures do not abort the document; they become inline notices.
pub fn format_document(document: &SpreadsheetDocument, filename: &str) -> Result<String> {
    if document.sheets.is_empty() {
        return Err(CuadreError::invalid_input(format!(
            "El archivo '{filename}' no contiene hojas"
        )));
    }

    let mut lines = Vec::new();
    lines.push(format!("=== ANÁLISIS DE ARCHIVO: {filename} ===\n"));

    for sheet in &document.sheets {
        lines.push(format!("\n--- HOJA: {} ---", sheet.name));
        match format_sheet(sheet) {
            Ok(sheet_lines) => lines.extend(sheet_lines),
            Err(err) => {
                tracing::warn!(sheet = %sheet.name, error = %err, "failed to format sheet");
                lines.push(format!("Error al procesar la hoja '{}': {}", sheet.name, err));
            }
        }
    }

    Ok(lines.join("\n"))
}

/// Formats several files independently, joined by a full-width rule.
///
/// A failing file degrades to an inline error block; the remaining files
/// are still rendered.
pub fn format_documents(files: &[(SpreadsheetDocument, String)]) -> String {
    let mut blocks = Vec::new();

    for (document, filename) in files {
        match format_document(document, filename) {
            Ok(text) => blocks.push(text),
            Err(err) => {
                tracing::warn!(file = %filename, error = %err, "failed to format file");
                blocks.push(format!("Error procesando {filename}: {err}"));
            }
        }
        blocks.push(format!("\n{}\n", "=".repeat(80)));
    }

    blocks.join("\n")
}

fn format_sheet(sheet: &Sheet) -> Result<Vec<String>> {
    validate_cells(sheet)?;

    let grid = drop_empty_rows_and_columns(&sheet.rows);
    if grid.is_empty() {
        return Ok(vec![
            "Esta hoja está vacía o no contiene datos válidos.".to_string(),
        ]);
    }

    let width = grid[0].len();
    let mut lines = Vec::new();
    lines.push(format!(
        "Dimensiones: {} filas x {} columnas",
        grid.len(),
        width
    ));
    lines.push("\nDatos:".to_string());

    for (row_idx, row) in grid.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(col_idx, cell)| format!("Col{}: {}", col_idx + 1, format_cell(cell)))
            .collect();
        if !cells.is_empty() {
            lines.push(format!("Fila {}: {}", row_idx + 1, cells.join(" | ")));
        }
    }

    let mut stats_lines = Vec::new();
    for col_idx in 0..width {
        if let Some(values) = numeric_column_values(&grid, col_idx) {
            let sum: f64 = values.iter().sum();
            let mean = sum / values.len() as f64;
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            stats_lines.push(format!(
                "  Columna {}: Suma={}, Promedio={}, Min={}, Max={}",
                col_idx + 1,
                format_thousands(sum),
                format_thousands(mean),
                format_thousands(min),
                format_thousands(max)
            ));
        }
    }

    if !stats_lines.is_empty() {
        lines.push("\nResumen estadístico para columnas numéricas:".to_string());
        lines.extend(stats_lines);
    }

    Ok(lines)
}

fn validate_cells(sheet: &Sheet) -> Result<()> {
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if let CellValue::Number(n) = cell {
                if !n.is_finite() {
                    return Err(CuadreError::invalid_input(format!(
                        "valor numérico no finito en fila {}, columna {}",
                        row_idx + 1,
                        col_idx + 1
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Structural cleanup: drops rows and columns that are entirely empty,
/// keeping the original order of what remains. Ragged rows are padded with
/// empty cells so every kept row has the same width.
fn drop_empty_rows_and_columns(rows: &[Vec<CellValue>]) -> Vec<Vec<CellValue>> {
    let kept_rows: Vec<&Vec<CellValue>> = rows
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    let width = kept_rows.iter().map(|row| row.len()).max().unwrap_or(0);
    let kept_columns: Vec<usize> = (0..width)
        .filter(|&col| {
            kept_rows
                .iter()
                .any(|row| row.get(col).is_some_and(|cell| !cell.is_empty()))
        })
        .collect();

    kept_rows
        .iter()
        .map(|row| {
            kept_columns
                .iter()
                .map(|&col| row.get(col).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect()
}

/// Returns the column's non-empty values when every one of them is numeric
/// (and there is at least one), `None` otherwise.
fn numeric_column_values(grid: &[Vec<CellValue>], col_idx: usize) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for row in grid {
        match &row[col_idx] {
            CellValue::Number(n) => values.push(*n),
            CellValue::Empty => {}
            CellValue::Text(_) => return None,
        }
    }
    if values.is_empty() { None } else { Some(values) }
}

fn format_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        CellValue::Number(n) => format_thousands(*n),
        CellValue::Text(t) => t.clone(),
        CellValue::Empty => String::new(),
    }
}

/// Renders a value with exactly two decimals and thousands separators
/// ("1,234.56").
fn format_thousands(value: f64) -> String {
    let rendered = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rendered
        .split_once('.')
        .unwrap_or((rendered.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::model::{CellValue, Sheet, SpreadsheetDocument};

    fn sheet(name: &str, rows: Vec<Vec<CellValue>>) -> Sheet {
        Sheet::new(name, rows)
    }

    fn doc(sheets: Vec<Sheet>) -> SpreadsheetDocument {
        SpreadsheetDocument::new(sheets)
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0.00");
        assert_eq!(format_thousands(100.0), "100.00");
        assert_eq!(format_thousands(1234.5), "1,234.50");
        assert_eq!(format_thousands(1234567.891), "1,234,567.89");
        assert_eq!(format_thousands(-9876.5), "-9,876.50");
    }

    #[test]
    fn test_sample_grid_rendering() {
        let document = doc(vec![sheet(
            "Hoja1",
            vec![
                vec!["Concepto".into(), "Debe".into(), "Haber".into()],
                vec!["Caja".into(), 100.into(), 0.into()],
            ],
        )]);

        let text = format_document(&document, "libro.xlsx").unwrap();
        assert!(text.contains("=== ANÁLISIS DE ARCHIVO: libro.xlsx ==="));
        assert!(text.contains("--- HOJA: Hoja1 ---"));
        assert!(text.contains("Dimensiones: 2 filas x 3 columnas"));
        assert!(text.contains("Fila 1: Col1: Concepto | Col2: Debe | Col3: Haber"));
        assert!(text.contains("Fila 2: Col1: Caja | Col2: 100 | Col3: 0"));
    }

    #[test]
    fn test_every_non_empty_cell_appears_exactly_once() {
        let document = doc(vec![sheet(
            "Datos",
            vec![
                vec!["Banca".into(), "Central".into()],
                vec!["Sucursal".into(), "Norte".into()],
            ],
        )]);

        let text = format_document(&document, "f.xlsx").unwrap();
        for needle in [
            "Fila 1: Col1: Banca | Col2: Central",
            "Fila 2: Col1: Sucursal | Col2: Norte",
        ] {
            assert_eq!(
                text.matches(needle).count(),
                1,
                "expected exactly one occurrence of {needle}"
            );
        }
    }

    #[test]
    fn test_empty_cells_are_skipped_within_kept_rows() {
        let document = doc(vec![sheet(
            "Hoja1",
            vec![
                vec!["a".into(), CellValue::Empty, "c".into()],
                vec!["d".into(), "e".into(), "f".into()],
            ],
        )]);

        let text = format_document(&document, "f.xlsx").unwrap();
        // Column 2 survives cleanup (it has "e"), so the gap in row 1 stays a gap
        assert!(text.contains("Fila 1: Col1: a | Col3: c"));
        assert!(text.contains("Fila 2: Col1: d | Col2: e | Col3: f"));
    }

    #[test]
    fn test_cleanup_drops_whole_empty_rows_and_columns() {
        let document = doc(vec![sheet(
            "Hoja1",
            vec![
                vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
                vec!["x".into(), CellValue::Empty, "y".into()],
                vec!["z".into(), CellValue::Empty, "w".into()],
            ],
        )]);

        let text = format_document(&document, "f.xlsx").unwrap();
        // Row 1 and column 2 are gone; indices are renumbered on the kept grid
        assert!(text.contains("Dimensiones: 2 filas x 2 columnas"));
        assert!(text.contains("Fila 1: Col1: x | Col2: y"));
        assert!(text.contains("Fila 2: Col1: z | Col2: w"));
    }

    #[test]
    fn test_all_empty_sheet_yields_notice_not_error() {
        let document = doc(vec![sheet(
            "Vacía",
            vec![vec![CellValue::Empty, CellValue::Empty], vec![]],
        )]);

        let text = format_document(&document, "f.xlsx").unwrap();
        assert!(text.contains("Esta hoja está vacía o no contiene datos válidos."));
    }

    #[test]
    fn test_numeric_column_statistics() {
        let document = doc(vec![sheet(
            "Montos",
            vec![
                vec!["Caja".into(), 100.into()],
                vec!["Banco".into(), 300.into()],
            ],
        )]);

        let text = format_document(&document, "f.xlsx").unwrap();
        assert!(text.contains("Resumen estadístico para columnas numéricas:"));
        assert!(
            text.contains("  Columna 2: Suma=400.00, Promedio=200.00, Min=100.00, Max=300.00")
        );
        // Column 1 is textual, no stats line for it
        assert!(!text.contains("Columna 1: Suma="));
    }

    #[test]
    fn test_mixed_column_is_not_numeric() {
        let document = doc(vec![sheet(
            "Mixta",
            vec![vec![10.into()], vec!["diez".into()]],
        )]);

        let text = format_document(&document, "f.xlsx").unwrap();
        assert!(!text.contains("Resumen estadístico"));
    }

    #[test]
    fn test_malformed_sheet_degrades_inline_and_rest_continue() {
        let document = doc(vec![
            sheet("Rota", vec![vec![CellValue::Number(f64::NAN)]]),
            sheet("Sana", vec![vec!["ok".into()]]),
        ]);

        let text = format_document(&document, "f.xlsx").unwrap();
        assert!(text.contains("Error al procesar la hoja 'Rota'"));
        assert!(text.contains("Fila 1: Col1: ok"));
    }

    #[test]
    fn test_document_without_sheets_is_an_error() {
        let err = format_document(&doc(vec![]), "vacio.xlsx").unwrap_err();
        assert!(matches!(err, CuadreError::InvalidInput(_)));
    }

    #[test]
    fn test_multi_file_separator_and_per_file_degradation() {
        let good = doc(vec![sheet("Hoja1", vec![vec!["a".into()]])]);
        let bad = doc(vec![]);

        let text = format_documents(&[
            (good, "bueno.xlsx".to_string()),
            (bad, "malo.xlsx".to_string()),
        ]);

        assert!(text.contains("=== ANÁLISIS DE ARCHIVO: bueno.xlsx ==="));
        assert!(text.contains("Error procesando malo.xlsx"));
        assert_eq!(text.matches(&"=".repeat(80)).count(), 2);
    }
}
