use serde::Serialize;
use swimmer_table::{Table, Value};

use crate::coerce::{is_falsy, to_number, to_text};
use crate::error::{Error, Result};

pub const DEFAULT_COLUMN_HEIGHT: f64 = 30.0;

const KEY_COLUMN: &str = "key";

/// Drawing attributes of one figure key, from a row of the `styles` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureStyle {
    pub key: String,
    #[serde(rename = "type")]
    pub figure_type: String,
    pub color: String,
    pub label: String,
    pub stroke_dash: f64,
    pub y_modify: f64,
    pub x_modify: f64,
    pub stroke: String,
    pub symbol: String,
    pub symbol_size: f64,
    pub column_height: f64,
    pub stroke_width: f64,
}

/// Figure styles in table order. The first row's key is the reference figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FigureStyles {
    styles: Vec<FigureStyle>,
}

impl FigureStyles {
    pub fn from_table(table: &Table) -> Result<Self> {
        if table.is_empty() {
            return Ok(Self::default());
        }
        if table.column_index(KEY_COLUMN).is_none() {
            return Err(Error::MissingColumn {
                table: "styles",
                column: KEY_COLUMN.to_string(),
            });
        }

        let null = Value::Null;
        let styles = (0..table.row_count())
            .map(|row| {
                let cell = |name: &str| table.value(row, name).unwrap_or(&null);
                let text = |name: &str| to_text(cell(name));
                let number = |name: &str| to_number(cell(name));
                let column_height = cell("column_height");
                FigureStyle {
                    key: text(KEY_COLUMN),
                    figure_type: text("type"),
                    color: text("color"),
                    label: text("label"),
                    stroke_dash: number("stroke_dash"),
                    y_modify: number("y_modify"),
                    x_modify: number("x_modify"),
                    stroke: text("stroke"),
                    symbol: text("symbol"),
                    symbol_size: number("symbol_size"),
                    column_height: if is_falsy(column_height) {
                        DEFAULT_COLUMN_HEIGHT
                    } else {
                        match to_number(column_height) {
                            n if n == 0.0 || n.is_nan() => DEFAULT_COLUMN_HEIGHT,
                            n => n,
                        }
                    },
                    stroke_width: number("stroke-width"),
                }
            })
            .collect();
        Ok(Self { styles })
    }

    /// Key of the first style row, which designates each data row's time zero.
    pub fn reference_key(&self) -> Result<&str> {
        self.styles
            .first()
            .map(|s| s.key.as_str())
            .ok_or(Error::MissingReferenceKey)
    }

    pub fn get(&self, key: &str) -> Option<&FigureStyle> {
        self.styles.iter().find(|s| s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FigureStyle> + '_ {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
