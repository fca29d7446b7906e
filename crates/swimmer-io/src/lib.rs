//! Source loading for swimmer plots.
//!
//! A source holds three named tables (`styles`, `settings`, `data`) either as a JSON document or
//! as worksheets of a spreadsheet workbook. The format is chosen once from the file extension.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use swimmer_table::TableError;

mod json;
mod workbook;

pub use json::read_json;
pub use swimmer_core::SourceTables;
pub use workbook::{read_workbook_bytes, read_workbook_path};

/// Names of the tables every source must provide.
pub const STYLES_SHEET: &str = "styles";
pub const SETTINGS_SHEET: &str = "settings";
pub const DATA_SHEET: &str = "data";
pub const REQUIRED_SHEETS: [&str; 3] = [STYLES_SHEET, SETTINGS_SHEET, DATA_SHEET];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported file type `{extension}` for `{path}` (expected .json, .xlsx, .xlsm, .xls, .xlsb or .ods)")]
    UnsupportedFileType { path: PathBuf, extension: String },
    #[error("source has no `{sheet}` table")]
    MissingRequiredSheet { sheet: String },
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{key}` is not a table: {reason}")]
    InvalidJsonShape { key: String, reason: String },
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// How a source file is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    /// Any spreadsheet format calamine can open.
    Workbook,
}

impl SourceFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(SourceFormat::Json),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(SourceFormat::Workbook),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| Error::UnsupportedFileType {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        })
    }
}

/// Load the three source tables from `path`, dispatching on its extension.
pub fn open_source(path: impl AsRef<Path>) -> Result<SourceTables> {
    let path = path.as_ref();
    match SourceFormat::from_path(path)? {
        SourceFormat::Json => {
            let file = File::open(path).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_json(BufReader::new(file))
        }
        SourceFormat::Workbook => read_workbook_path(path),
    }
}
