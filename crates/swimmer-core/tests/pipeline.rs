use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use swimmer_core::{
    normalize, prepare_chart, resolve_row_order, wide_to_long, DateParseOptions, Error, Event,
    Interval, SourceTables, Table, Value, WideSchema,
};

fn styles(keys: &[&str]) -> Table {
    Table::from_rows(
        ["key", "type", "color"],
        keys.iter()
            .map(|k| vec![Value::from(*k), "rect".into(), "#333".into()])
            .collect(),
    )
    .unwrap()
}

fn one_patient() -> SourceTables {
    SourceTables {
        styles: styles(&["ref", "a"]),
        settings: Table::default(),
        data: Table::from_rows(
            ["id", "ref___event", "a___start", "a___end"],
            vec![vec![
                "P1".into(),
                "2024-01-01".into(),
                "2024-01-11".into(),
                "2024-01-21".into(),
            ]],
        )
        .unwrap(),
    }
}

#[test]
fn single_row_end_to_end() {
    let chart = prepare_chart(&one_patient(), &DateParseOptions::default()).unwrap();
    assert_eq!(
        chart.intervals,
        vec![Interval {
            name_of_figure: "a".to_string(),
            start: 10.0,
            end: 20.0,
            row_number: 1,
        }]
    );
    assert_eq!(
        chart.events,
        vec![Event {
            name_of_figure: "ref".to_string(),
            event: 0.0,
            row_number: 1,
        }]
    );
    assert_eq!(chart.row_numbers, vec![1]);
    assert_eq!(chart.row_order[0].max_end, Some(20.0));
}

#[test]
fn missing_reference_column_produces_nothing() {
    let mut sources = one_patient();
    sources.styles = styles(&["visit"]);
    let err = prepare_chart(&sources, &DateParseOptions::default()).unwrap_err();
    assert!(matches!(err, Error::MissingReferenceColumn { ref key } if key == "visit"));
    assert_eq!(
        err.to_string(),
        "reference column not found: expected `visit___event` or `visit___start` in the data table"
    );
}

#[test]
fn start_column_can_serve_as_reference() {
    let data = Table::from_rows(
        ["id", "tx___start", "tx___end", "death___event"],
        vec![
            vec![
                "P1".into(),
                "2024-03-01".into(),
                "2024-03-31".into(),
                "".into(),
            ],
            vec![
                "P2".into(),
                "2024-03-10".into(),
                "2024-03-15".into(),
                "2024-04-09".into(),
            ],
        ],
    )
    .unwrap();
    let normalized = normalize(&data, "tx", 1.0, &DateParseOptions::default()).unwrap();
    let long = wide_to_long(&normalized).unwrap();

    assert_eq!(long.intervals.len(), 2);
    assert_eq!(long.intervals[0].start, 0.0);
    assert_eq!(long.intervals[0].end, 30.0);
    assert_eq!(long.intervals[1].end, 5.0);
    assert!(long.events[0].event.is_nan());
    assert_eq!(long.events[1].event, 30.0);

    let order = resolve_row_order(&long.intervals, &long.events).unwrap();
    let rows: Vec<u32> = order.iter().map(|k| k.row_number).collect();
    assert_eq!(rows, vec![1, 2]);
}

#[test]
fn serial_and_native_dates_mix_with_text() {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let data = Table::from_rows(
        ["ref___event", "a___start", "a___end"],
        vec![vec![
            Value::DateTime(start),
            Value::Number(45_293.0),
            "03.01.2024".into(),
        ]],
    )
    .unwrap();
    let normalized = normalize(&data, "ref", 1.0, &DateParseOptions::default()).unwrap();
    let long = wide_to_long(&normalized).unwrap();
    assert_eq!(long.intervals[0].start, 1.0);
    assert_eq!(long.intervals[0].end, 2.0);
}

#[test]
fn prepared_chart_serializes_for_renderers() {
    let chart = prepare_chart(&one_patient(), &DateParseOptions::default()).unwrap();
    let value = serde_json::to_value(&chart).unwrap();
    assert_eq!(
        value["intervals"],
        json!([{ "nameOfFigure": "a", "start": 10.0, "end": 20.0, "_rowNumber": 1 }])
    );
    assert_eq!(value["rowOrder"], json!([{ "_rowNumber": 1, "max_end": 20.0 }]));
    assert_eq!(value["summary"]["fields"], json!(["id", "_rowNumber"]));
    assert_eq!(
        value["summary"]["records"],
        json!([{ "id": "P1", "_rowNumber": 1 }])
    );
    assert_eq!(value["settings"]["oxDimension"], json!(1.0));
    assert_eq!(value["styles"][0]["type"], json!("rect"));
    assert_eq!(value["timeExtent"], json!([0.0, 20.0]));
}

#[test]
fn unparseable_events_become_null_in_json() {
    let mut sources = one_patient();
    sources.data = Table::from_rows(
        ["id", "ref___event", "x___event"],
        vec![vec!["P1".into(), "2024-01-01".into(), "soon".into()]],
    )
    .unwrap();
    let chart = prepare_chart(&sources, &DateParseOptions::default()).unwrap();
    let value = serde_json::to_value(&chart.events).unwrap();
    assert_eq!(value[1]["event"], json!(null));
}

const KEYS: [&str; 4] = ["a", "b", "c", "d"];

fn wide_columns() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec((0usize..4, 0usize..3), 0..10).prop_map(|picks| {
        let mut columns = vec!["ref___event".to_string()];
        for (key, kind) in picks {
            let suffix = ["___start", "___end", "___event"][kind];
            let name = format!("{}{suffix}", KEYS[key]);
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
        columns
    })
}

/// A reference instant in 2000..2054 as a native date, ISO text or serial day count.
fn reference_cell() -> impl Strategy<Value = Value> {
    (0i64..20_000, 0u32..86_400, 0usize..3).prop_map(|(days, secs, shape)| {
        let dt = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::days(days)
            + chrono::Duration::seconds(i64::from(secs));
        match shape {
            0 => Value::DateTime(dt),
            1 => Value::from(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            // 2000-01-01 is serial 36526.
            _ => Value::Number(36_526.0 + days as f64 + f64::from(secs) / 86_400.0),
        }
    })
}

proptest! {
    #[test]
    fn reference_offset_is_zero_on_every_row(
        rows in prop::collection::vec((reference_cell(), reference_cell()), 1..8),
        divisor in prop::sample::select(vec![1.0, 7.0, 30.4375, 365.25]),
    ) {
        let data = Table::from_rows(
            ["id", "ref___event", "x___event"],
            rows.iter()
                .enumerate()
                .map(|(i, (reference, other))| {
                    vec![Value::from(format!("P{i}")), reference.clone(), other.clone()]
                })
                .collect(),
        )
        .unwrap();
        let normalized = normalize(&data, "ref", divisor, &DateParseOptions::default()).unwrap();
        for row in 0..rows.len() {
            prop_assert_eq!(
                normalized.table().value(row, "ref___event"),
                Some(&Value::Number(0.0))
            );
        }

        let long = wide_to_long(&normalized).unwrap();
        let reference_events: Vec<&Event> = long
            .events
            .iter()
            .filter(|e| e.name_of_figure == "ref")
            .collect();
        prop_assert_eq!(reference_events.len(), rows.len());
        prop_assert!(reference_events.iter().all(|e| e.event == 0.0));
        prop_assert!(long.events.iter().all(|e| e.event.is_finite()));
    }

    #[test]
    fn intervals_only_for_keys_with_both_sides(columns in wide_columns(), rows in 1usize..4) {
        let data = Table::from_rows(
            columns.iter().map(String::as_str),
            (0..rows)
                .map(|_| columns.iter().map(|_| Value::from("2024-02-01")).collect())
                .collect(),
        )
        .unwrap();
        let schema = WideSchema::classify(columns.iter().map(String::as_str));
        let normalized = normalize(&data, "ref", 1.0, &DateParseOptions::default()).unwrap();
        let long = wide_to_long(&normalized).unwrap();

        let keys = schema.interval_keys();
        prop_assert_eq!(long.intervals.len(), keys.len() * rows);
        for interval in &long.intervals {
            prop_assert!(keys.contains(&interval.name_of_figure.as_str()));
        }
        prop_assert_eq!(long.events.len(), schema.event_columns().len() * rows);
    }

    #[test]
    fn row_order_is_monotone_and_deterministic(
        ends in prop::collection::vec(prop::option::of(-50.0f64..50.0), 1..20)
    ) {
        let intervals: Vec<Interval> = ends
            .iter()
            .enumerate()
            .map(|(i, end)| Interval {
                name_of_figure: "a".to_string(),
                start: 0.0,
                end: end.unwrap_or(f64::NAN),
                row_number: i as u32 + 1,
            })
            .collect();
        let first = resolve_row_order(&intervals, &[]).unwrap();
        let second = resolve_row_order(&intervals, &[]).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), intervals.len());

        let defined: Vec<f64> = first.iter().map_while(|k| k.max_end).collect();
        prop_assert!(defined.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(first[defined.len()..].iter().all(|k| k.max_end.is_none()));
    }
}
