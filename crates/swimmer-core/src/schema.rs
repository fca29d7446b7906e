use crate::error::{Error, Result};

pub const START_SUFFIX: &str = "___start";
pub const END_SUFFIX: &str = "___end";
pub const EVENT_SUFFIX: &str = "___event";

/// Stable 1-based row identifier added by normalization.
pub const ROW_NUMBER_COLUMN: &str = "_rowNumber";

/// What a wide-table column encodes, derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    Metadata,
    Start(String),
    End(String),
    Event(String),
}

impl ColumnRole {
    pub fn classify(name: &str) -> Self {
        if let Some(key) = name.strip_suffix(START_SUFFIX) {
            ColumnRole::Start(key.to_string())
        } else if let Some(key) = name.strip_suffix(END_SUFFIX) {
            ColumnRole::End(key.to_string())
        } else if let Some(key) = name.strip_suffix(EVENT_SUFFIX) {
            ColumnRole::Event(key.to_string())
        } else {
            ColumnRole::Metadata
        }
    }

    /// `true` for `___start`, `___end` and `___event` columns.
    pub fn is_temporal(&self) -> bool {
        !matches!(self, ColumnRole::Metadata)
    }
}

/// Column classification of a wide table, computed once per schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideSchema {
    columns: Vec<(String, ColumnRole)>,
}

impl WideSchema {
    pub fn classify<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = columns
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), ColumnRole::classify(name))
            })
            .collect();
        Self { columns }
    }

    pub fn role(&self, index: usize) -> Option<&ColumnRole> {
        self.columns.get(index).map(|(_, role)| role)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    fn names_where(&self, pred: impl Fn(&ColumnRole) -> bool) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, role)| pred(role))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn start_columns(&self) -> Vec<&str> {
        self.names_where(|r| matches!(r, ColumnRole::Start(_)))
    }

    pub fn end_columns(&self) -> Vec<&str> {
        self.names_where(|r| matches!(r, ColumnRole::End(_)))
    }

    pub fn event_columns(&self) -> Vec<&str> {
        self.names_where(|r| matches!(r, ColumnRole::Event(_)))
    }

    /// Figure keys that have both a `___start` and an `___end` column, in start-column order.
    pub fn interval_keys(&self) -> Vec<&str> {
        let ends: Vec<&str> = self
            .columns
            .iter()
            .filter_map(|(_, role)| match role {
                ColumnRole::End(key) => Some(key.as_str()),
                _ => None,
            })
            .collect();
        self.columns
            .iter()
            .filter_map(|(_, role)| match role {
                ColumnRole::Start(key) if ends.contains(&key.as_str()) => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Column supplying each row's time zero: `<key>___event`, else `<key>___start`.
    pub fn reference_column(&self, reference_key: &str) -> Result<&str> {
        let event = format!("{reference_key}{EVENT_SUFFIX}");
        let start = format!("{reference_key}{START_SUFFIX}");
        self.columns
            .iter()
            .find(|(name, _)| *name == event)
            .or_else(|| self.columns.iter().find(|(name, _)| *name == start))
            .map(|(name, _)| name.as_str())
            .ok_or_else(|| Error::MissingReferenceColumn {
                key: reference_key.to_string(),
            })
    }

    /// Index of the first non-metadata column of the summary side table: the position of
    /// `<key>___start`, else of `<key>___event`.
    pub fn summary_boundary(&self, reference_key: &str) -> Result<usize> {
        let start = format!("{reference_key}{START_SUFFIX}");
        let event = format!("{reference_key}{EVENT_SUFFIX}");
        self.index_of(&start)
            .or_else(|| self.index_of(&event))
            .ok_or_else(|| Error::MissingReferenceColumn {
                key: reference_key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> WideSchema {
        WideSchema::classify([
            "id",
            "arm",
            "ref___event",
            "a___start",
            "a___end",
            "b___start",
            "c___end",
            "m___event",
        ])
    }

    #[test]
    fn classifies_by_suffix() {
        assert_eq!(ColumnRole::classify("id"), ColumnRole::Metadata);
        assert_eq!(
            ColumnRole::classify("tx___start"),
            ColumnRole::Start("tx".to_string())
        );
        assert_eq!(
            ColumnRole::classify("tx___end"),
            ColumnRole::End("tx".to_string())
        );
        assert_eq!(
            ColumnRole::classify("death___event"),
            ColumnRole::Event("death".to_string())
        );
        // Two underscores is not the separator.
        assert_eq!(ColumnRole::classify("tx__start"), ColumnRole::Metadata);
    }

    #[test]
    fn interval_keys_need_both_ends() {
        assert_eq!(schema().interval_keys(), vec!["a"]);
    }

    #[test]
    fn column_groups() {
        let s = schema();
        assert_eq!(s.start_columns(), vec!["a___start", "b___start"]);
        assert_eq!(s.end_columns(), vec!["a___end", "c___end"]);
        assert_eq!(s.event_columns(), vec!["ref___event", "m___event"]);
    }

    #[test]
    fn reference_prefers_event_column() {
        let s = WideSchema::classify(["x___start", "x___event"]);
        assert_eq!(s.reference_column("x").unwrap(), "x___event");
        let s = WideSchema::classify(["x___start", "x___end"]);
        assert_eq!(s.reference_column("x").unwrap(), "x___start");
        assert!(matches!(
            s.reference_column("y"),
            Err(Error::MissingReferenceColumn { ref key }) if key == "y"
        ));
    }

    #[test]
    fn summary_boundary_prefers_start_position() {
        let s = WideSchema::classify(["id", "x___event", "x___start"]);
        assert_eq!(s.summary_boundary("x").unwrap(), 2);
        assert_eq!(schema().summary_boundary("ref").unwrap(), 2);
    }
}
