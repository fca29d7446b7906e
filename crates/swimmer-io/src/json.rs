use std::io::Read;
use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value as JsonValue};
use swimmer_core::SourceTables;
use swimmer_table::{Table, Value};

use crate::{Error, Result, DATA_SHEET, SETTINGS_SHEET, STYLES_SHEET};

/// Decode a `{ "styles": [...], "settings": [...], "data": [...] }` document.
///
/// Each table is an array of flat objects. Columns appear in first-seen key order across the
/// rows; a key missing from a row reads as `Null`.
pub fn read_json<R: Read>(reader: R) -> Result<SourceTables> {
    let document: JsonValue = serde_json::from_reader(reader)?;
    let JsonValue::Object(mut root) = document else {
        return Err(Error::InvalidJsonShape {
            key: "<root>".to_string(),
            reason: format!("expected an object, found {}", kind(&document)),
        });
    };

    let mut take = |sheet: &str| -> Result<Table> {
        let rows = root
            .remove(sheet)
            .ok_or_else(|| Error::MissingRequiredSheet {
                sheet: sheet.to_string(),
            })?;
        table_from_json(sheet, rows)
    };
    Ok(SourceTables {
        styles: take(STYLES_SHEET)?,
        settings: take(SETTINGS_SHEET)?,
        data: take(DATA_SHEET)?,
    })
}

fn kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn table_from_json(key: &str, rows: JsonValue) -> Result<Table> {
    let JsonValue::Array(rows) = rows else {
        return Err(Error::InvalidJsonShape {
            key: key.to_string(),
            reason: format!("expected an array of objects, found {}", kind(&rows)),
        });
    };

    let objects = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| match row {
            JsonValue::Object(map) => Ok(map),
            other => Err(Error::InvalidJsonShape {
                key: key.to_string(),
                reason: format!("row {idx} is {}, not an object", kind(&other)),
            }),
        })
        .collect::<Result<Vec<Map<String, JsonValue>>>>()?;

    let mut columns: Vec<Arc<str>> = Vec::new();
    for object in &objects {
        for name in object.keys() {
            if !columns.iter().any(|c| c.as_ref() == name.as_str()) {
                columns.push(Arc::from(name.as_str()));
            }
        }
    }

    let mut table = Table::new(columns.clone())?;
    for mut object in objects {
        let row = columns
            .iter()
            .map(|name| object.remove(name.as_ref()).map(cell).unwrap_or_default())
            .collect();
        table.push_row(row)?;
    }
    debug!(
        "read `{key}`: {} columns, {} rows",
        table.column_count(),
        table.row_count()
    );
    Ok(table)
}

fn cell(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(b),
        JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or_default(),
        JsonValue::String(s) => Value::from(s),
        nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => Value::from(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
        "styles": [{ "key": "ref", "type": "event" }],
        "settings": [{ "measure": "oxDimension", "value": "month" }],
        "data": [
            { "id": "P1", "ref___event": "2024-01-01", "flag": true },
            { "id": "P2", "arm": "B", "ref___event": 45292, "tags": ["x", 1] }
        ]
    }"#;

    #[test]
    fn columns_follow_first_seen_order() {
        let sources = read_json(DOC.as_bytes()).unwrap();
        assert_eq!(
            sources.data.column_names().collect::<Vec<_>>(),
            vec!["id", "ref___event", "flag", "arm", "tags"]
        );
        assert_eq!(sources.data.value(0, "arm"), Some(&Value::Null));
        assert_eq!(sources.data.value(0, "flag"), Some(&Value::Boolean(true)));
        assert_eq!(
            sources.data.value(1, "ref___event"),
            Some(&Value::Number(45292.0))
        );
        assert_eq!(
            sources.data.value(1, "tags"),
            Some(&Value::from(r#"["x",1]"#))
        );
        assert_eq!(sources.styles.row_count(), 1);
    }

    #[test]
    fn missing_table_is_reported() {
        let err = read_json(r#"{ "styles": [], "data": [] }"#.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredSheet { ref sheet } if sheet == "settings"));
    }

    #[test]
    fn shape_errors_name_the_table() {
        let err = read_json(r#"{ "styles": {}, "settings": [], "data": [] }"#.as_bytes())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidJsonShape { ref key, .. } if key == "styles"));

        let err = read_json(r#"{ "styles": [], "settings": [], "data": [1] }"#.as_bytes())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "`data` is not a table: row 0 is a number, not an object"
        );

        assert!(matches!(
            read_json("[]".as_bytes()),
            Err(Error::InvalidJsonShape { .. })
        ));
        assert!(matches!(read_json("{".as_bytes()), Err(Error::Json(_))));
    }
}
