use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;

use swimmer_core::{Event, Interval, PreparedChart, SummaryRecord, ROW_NUMBER_COLUMN};

fn offset(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else if value.fract() == 0.0 {
        // `+ 0.0` folds -0 into 0.
        format!("{:.0}", value + 0.0)
    } else {
        let text = format!("{value:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Human-readable listing of a prepared chart, rows in display order.
pub fn write_text_report<W: Write>(
    out: &mut W,
    source: &Path,
    chart: &PreparedChart,
) -> io::Result<()> {
    writeln!(out, "Swimmer chart data")?;
    writeln!(out, "  source: {}", source.display())?;
    writeln!(
        out,
        "  reference: {} (1 unit = {} days)",
        chart.reference_key,
        offset(chart.settings.ox_dimension)
    )?;
    if !chart.settings.label.is_empty() {
        writeln!(out, "  label: {}", chart.settings.label)?;
    }
    writeln!(
        out,
        "  rows: {}  intervals: {}  events: {}",
        chart.row_numbers.len(),
        chart.intervals.len(),
        chart.events.len()
    )?;
    match chart.time_extent {
        Some((lo, hi)) => writeln!(out, "  time extent: {} .. {}", offset(lo), offset(hi))?,
        None => writeln!(out, "  time extent: (none)")?,
    }

    let mut intervals: HashMap<u32, Vec<&Interval>> = HashMap::new();
    for interval in &chart.intervals {
        intervals.entry(interval.row_number).or_default().push(interval);
    }
    let mut events: HashMap<u32, Vec<&Event>> = HashMap::new();
    for event in &chart.events {
        events.entry(event.row_number).or_default().push(event);
    }
    let summaries: HashMap<u32, SummaryRecord<'_>> = chart
        .summary
        .records()
        .filter_map(|record| Some((record.row_number()?, record)))
        .collect();

    let width = chart
        .styles
        .iter()
        .map(|s| s.key.len())
        .chain(chart.intervals.iter().map(|i| i.name_of_figure.len()))
        .chain(chart.events.iter().map(|e| e.name_of_figure.len()))
        .max()
        .unwrap_or(0);

    writeln!(out, "Rows (display order):")?;
    for key in &chart.row_order {
        write!(out, "  #{}", key.row_number)?;
        if let Some(record) = summaries.get(&key.row_number) {
            for (field, value) in record.iter().filter(|(f, _)| *f != ROW_NUMBER_COLUMN) {
                write!(out, "  {field}={value}")?;
            }
        }
        writeln!(out, "  max_end={}", key.max_end.map_or_else(|| "-".to_string(), offset))?;

        for interval in intervals.get(&key.row_number).into_iter().flatten() {
            writeln!(
                out,
                "    {:<width$}  {} .. {}",
                interval.name_of_figure,
                offset(interval.start),
                offset(interval.end)
            )?;
        }
        for event in events.get(&key.row_number).into_iter().flatten() {
            writeln!(
                out,
                "    {:<width$}  @ {}",
                event.name_of_figure,
                offset(event.event)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use swimmer_core::{prepare_chart, DateParseOptions, SourceTables, Table, Value};

    fn chart() -> PreparedChart {
        let sources = SourceTables {
            styles: Table::from_rows(["key"], vec![vec!["ref".into()], vec!["tx".into()]])
                .unwrap(),
            settings: Table::from_rows(
                ["measure", "value"],
                vec![vec!["label".into(), "Days".into()]],
            )
            .unwrap(),
            data: Table::from_rows(
                ["id", "ref___event", "tx___start", "tx___end", "pd___event"],
                vec![
                    vec![
                        "P1".into(),
                        "2024-01-01".into(),
                        "2024-01-02".into(),
                        "2024-01-31".into(),
                        Value::Null,
                    ],
                    vec![
                        "P2".into(),
                        "2024-01-01".into(),
                        "2024-01-01".into(),
                        "2024-01-06".into(),
                        "2024-01-04 12:00".into(),
                    ],
                ],
            )
            .unwrap(),
        };
        prepare_chart(&sources, &DateParseOptions::default()).unwrap()
    }

    #[test]
    fn offsets_print_compactly() {
        assert_eq!(offset(3.0), "3");
        assert_eq!(offset(-2.0), "-2");
        assert_eq!(offset(3.5), "3.5");
        assert_eq!(offset(1.0 / 3.0), "0.333");
        assert_eq!(offset(2.9999), "3");
        assert_eq!(offset(-0.0), "0");
        assert_eq!(offset(f64::NAN), "-");
    }

    #[test]
    fn report_lists_rows_in_display_order() {
        let mut out = Vec::new();
        write_text_report(&mut out, Path::new("trial.json"), &chart()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let expected = "\
Swimmer chart data
  source: trial.json
  reference: ref (1 unit = 1 days)
  label: Days
  rows: 2  intervals: 2  events: 4
  time extent: 0 .. 30
Rows (display order):
  #2  id=P2  max_end=5
    tx   0 .. 5
    ref  @ 0
    pd   @ 3.5
  #1  id=P1  max_end=30
    tx   1 .. 30
    ref  @ 0
    pd   @ -
";
        assert_eq!(text, expected);
    }
}
