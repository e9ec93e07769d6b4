use serde::{Deserialize, Serialize};

use crate::services::csv::{CellValue, DatasetAnalysis, Row};

const PIE_SLICE_LIMIT: usize = 8;
const SERIES_POINT_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Area,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub x_axis: String,
    pub y_axis: String,
    pub points: Vec<ChartPoint>,
}

fn numeric_or_zero(value: Option<&CellValue>) -> f64 {
    value.and_then(CellValue::as_number).unwrap_or(0.0)
}

/// Labels that a browser would key as array indices: canonical decimal
/// integers below `u32::MAX`.
fn array_index(label: &str) -> Option<u32> {
    let canonical = label == "0" || (!label.starts_with('0') && !label.is_empty());
    if !canonical || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    label.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

pub fn chart_points(rows: &[Row], x_axis: &str, y_axis: &str, chart_type: ChartType) -> Vec<ChartPoint> {
    match chart_type {
        ChartType::Pie => {
            let mut slices: Vec<ChartPoint> = Vec::new();
            for row in rows {
                let label = row.get(x_axis).map(ToString::to_string).unwrap_or_else(|| "undefined".to_string());
                let value = numeric_or_zero(row.get(y_axis));
                match slices.iter_mut().find(|slice| slice.label == label) {
                    Some(slice) => slice.value += value,
                    None => slices.push(ChartPoint { label, value }),
                }
            }
            // integer-like labels lead in ascending order, the rest keep first-seen order
            slices.sort_by_key(|slice| {
                let index = array_index(&slice.label);
                (index.is_none(), index)
            });
            slices.truncate(PIE_SLICE_LIMIT);
            slices
        }
        ChartType::Bar | ChartType::Line | ChartType::Area => rows
            .iter()
            .filter_map(|row| Some((row.get(x_axis)?, row.get(y_axis)?)))
            .take(SERIES_POINT_LIMIT)
            .map(|(x, y)| ChartPoint {
                label: x.to_string(),
                value: numeric_or_zero(Some(y)),
            })
            .collect(),
    }
}

/// Builds the dashboard's charts: the selected one, plus a trend line over
/// another numeric column when the dataset has more than one.
pub fn dashboard_charts(
    rows: &[Row],
    analysis: &DatasetAnalysis,
    x_axis: &str,
    y_axis: &str,
    chart_type: ChartType,
) -> Vec<Chart> {
    let mut charts = vec![Chart {
        title: format!("{} by {}", y_axis, x_axis),
        chart_type,
        x_axis: x_axis.to_string(),
        y_axis: y_axis.to_string(),
        points: chart_points(rows, x_axis, y_axis, chart_type),
    }];

    if analysis.numeric_columns.len() > 1 {
        let trend_y = analysis
            .numeric_columns
            .iter()
            .find(|column| column.as_str() != y_axis)
            .unwrap_or(&analysis.numeric_columns[0]);

        charts.push(Chart {
            title: "Trend Analysis".to_string(),
            chart_type: ChartType::Line,
            x_axis: x_axis.to_string(),
            y_axis: trend_y.clone(),
            points: chart_points(rows, x_axis, trend_y, ChartType::Line),
        });
    }

    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::csv::{analyze, parse};

    #[test]
    fn pie_groups_by_label_and_sums() {
        let parsed = parse("region,sales\nnorth,10\nsouth,5\nnorth,2.5\neast,n/a").unwrap();
        let points = chart_points(&parsed.rows, "region", "sales", ChartType::Pie);
        assert_eq!(
            points,
            vec![
                ChartPoint { label: "north".into(), value: 12.5 },
                ChartPoint { label: "south".into(), value: 5.0 },
                ChartPoint { label: "east".into(), value: 0.0 },
            ]
        );
    }

    #[test]
    fn pie_puts_integer_labels_first_in_ascending_order() {
        let parsed = parse("year,units\n2021,3\n2019,1\nx,9\n2020,2\n2019,4\n007,5").unwrap();
        let points = chart_points(&parsed.rows, "year", "units", ChartType::Pie);
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["7", "2019", "2020", "2021", "x"]);
        assert_eq!(points[1].value, 5.0);
    }

    #[test]
    fn array_index_requires_canonical_integers() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("007"), None);
        assert_eq!(array_index("1.5"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index(""), None);
        assert_eq!(array_index("4294967295"), None);
        assert_eq!(array_index("4294967294"), Some(4_294_967_294));
    }

    #[test]
    fn pie_orders_before_capping() {
        let body: Vec<String> = (0..10).map(|i| format!("k{},1", i)).chain(["5,1".to_string()]).collect();
        let parsed = parse(&format!("k,v\n{}", body.join("\n"))).unwrap();
        let points = chart_points(&parsed.rows, "k", "v", ChartType::Pie);
        assert_eq!(points.len(), PIE_SLICE_LIMIT);
        assert_eq!(points[0].label, "5");
        assert_eq!(points[7].label, "k6");
    }

    #[test]
    fn pie_is_capped_at_eight_slices() {
        let body: Vec<String> = (0..12).map(|i| format!("k{},{}", i, i)).collect();
        let parsed = parse(&format!("k,v\n{}", body.join("\n"))).unwrap();
        let points = chart_points(&parsed.rows, "k", "v", ChartType::Pie);
        assert_eq!(points.len(), PIE_SLICE_LIMIT);
        assert_eq!(points[7].label, "k7");
    }

    #[test]
    fn series_take_first_twenty_rows() {
        let body: Vec<String> = (1..=30).map(|i| format!("{},{}", i, i * 2)).collect();
        let parsed = parse(&format!("day,count\n{}", body.join("\n"))).unwrap();
        let points = chart_points(&parsed.rows, "day", "count", ChartType::Bar);
        assert_eq!(points.len(), SERIES_POINT_LIMIT);
        assert_eq!(points[0], ChartPoint { label: "1".into(), value: 2.0 });
        assert_eq!(points[19].label, "20");
    }

    #[test]
    fn unknown_axis_yields_no_series_points() {
        let parsed = parse("a,b\n1,2").unwrap();
        assert!(chart_points(&parsed.rows, "a", "missing", ChartType::Line).is_empty());
    }

    #[test]
    fn trend_chart_uses_another_numeric_column() {
        let parsed = parse("month,revenue,cost\njan,10,4\nfeb,12,5").unwrap();
        let analysis = analyze(&parsed.rows, &parsed.columns);
        let charts = dashboard_charts(&parsed.rows, &analysis, "month", "revenue", ChartType::Area);
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].title, "revenue by month");
        assert_eq!(charts[1].title, "Trend Analysis");
        assert_eq!(charts[1].chart_type, ChartType::Line);
        assert_eq!(charts[1].y_axis, "cost");
    }

    #[test]
    fn single_numeric_column_has_no_trend_chart() {
        let parsed = parse("month,revenue\njan,10").unwrap();
        let analysis = analyze(&parsed.rows, &parsed.columns);
        let charts = dashboard_charts(&parsed.rows, &analysis, "month", "revenue", ChartType::Bar);
        assert_eq!(charts.len(), 1);
    }
}
