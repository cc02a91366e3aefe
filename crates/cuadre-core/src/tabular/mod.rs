//! Spreadsheet document model and tabular text formatting.

pub mod formatter;
pub mod model;

pub use formatter::{format_document, format_documents};
pub use model::{CellValue, Sheet, SpreadsheetDocument};
