use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;

use super::quantity::parse_quantity;

const CHART_SIZE: (u32, u32) = (640, 320);
const PIE_LEGEND_SPLIT: i32 = 460;
const MEDIA_TYPE: &str = "image/svg+xml";

const BAR_TITLE: &str = "Ingredient Prices";
const LINE_TITLE: &str = "Ingredient Calories";
const PIE_TITLE: &str = "Ingredient Quantity Distribution";
const INGREDIENT_AXIS: &str = "Ingredient";
const PRICE_AXIS: &str = "Price ($)";
const CALORIES_AXIS: &str = "Calories";

/// Errors that can occur while preparing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Nothing drawable: no rows, or a pie whose weights sum to zero.
    #[error("empty chart series")]
    EmptySeries,

    /// The plotting backend rejected a drawing operation.
    #[error("chart rendering failed: {0}")]
    Render(String),
}

/// Supported chart kinds, selected by the form codes `"#1"`..`"#3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    /// Any other code yields `None`; callers treat that as "no chart", never
    /// as a fatal error.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "#1" => Some(ChartKind::Bar),
            "#2" => Some(ChartKind::Line),
            "#3" => Some(ChartKind::Pie),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Bar => BAR_TITLE,
            ChartKind::Line => LINE_TITLE,
            ChartKind::Pie => PIE_TITLE,
        }
    }
}

/// One row of chart input: an ingredient's attributes plus the quantity
/// string carried by the association (or the stock count cast to text).
#[derive(Debug, Clone, FromRow)]
pub struct ChartRow {
    pub name: String,
    pub price: f64,
    pub calories: i32,
    pub quantity: String,
}

/// A rendered chart ready for embedding, plus the applied metadata.
#[derive(Debug, Serialize)]
pub struct RenderedChart {
    pub image_base64: String,
    pub media_type: &'static str,
    pub title: &'static str,
    pub x_label: Option<&'static str>,
    pub y_label: Option<&'static str>,
}

/// Wrapper the chart endpoints respond with; `chart` stays `null` for an
/// unknown kind or an empty row set.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub chart: Option<RenderedChart>,
}

/// Parsed pie slice weights, in row order.
pub fn slice_weights(rows: &[ChartRow]) -> Vec<f64> {
    rows.iter()
        .map(|r| parse_quantity(&r.quantity).weight())
        .collect()
}

/// Renders `rows` as the requested chart kind into an SVG encoded for
/// embedding. The backing buffer lives only inside this call: it is encoded
/// and released before returning, on the error paths included.
pub fn prepare_chart(
    kind: ChartKind,
    rows: &[ChartRow],
    labels: Option<&[String]>,
) -> Result<RenderedChart, ChartError> {
    if rows.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        match kind {
            ChartKind::Bar => draw_bar(&root, rows)?,
            ChartKind::Line => draw_line(&root, rows)?,
            ChartKind::Pie => draw_pie(&root, rows, labels)?,
        }
        root.present().map_err(render_err)?;
    }

    let (x_label, y_label) = match kind {
        ChartKind::Bar => (Some(INGREDIENT_AXIS), Some(PRICE_AXIS)),
        ChartKind::Line => (Some(INGREDIENT_AXIS), Some(CALORIES_AXIS)),
        ChartKind::Pie => (None, None),
    };

    Ok(RenderedChart {
        image_base64: BASE64.encode(svg.as_bytes()),
        media_type: MEDIA_TYPE,
        title: kind.title(),
        x_label,
        y_label,
    })
}

fn draw_bar(root: &DrawingArea<SVGBackend<'_>, Shift>, rows: &[ChartRow]) -> Result<(), ChartError> {
    let names: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
    let y_max = axis_max(rows.iter().map(|r| r.price));
    let n = rows.len() as u32;

    let mut chart = ChartBuilder::on(root)
        .caption(BAR_TITLE, ("sans-serif", 20.0))
        .margin(10)
        .x_label_area_size(70)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(INGREDIENT_AXIS)
        .y_desc(PRICE_AXIS)
        .x_labels(rows.len())
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) => names.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_label_style(
            ("sans-serif", 12.0)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.filled())
                .data(rows.iter().enumerate().map(|(i, r)| (i as u32, r.price))),
        )
        .map_err(render_err)?;
    Ok(())
}

fn draw_line(root: &DrawingArea<SVGBackend<'_>, Shift>, rows: &[ChartRow]) -> Result<(), ChartError> {
    let names: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
    let y_max = axis_max(rows.iter().map(|r| f64::from(r.calories)));
    let n = rows.len() as u32;

    let mut chart = ChartBuilder::on(root)
        .caption(LINE_TITLE, ("sans-serif", 20.0))
        .margin(10)
        .x_label_area_size(70)
        .y_label_area_size(50)
        .build_cartesian_2d(0u32..(n - 1).max(1), 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(INGREDIENT_AXIS)
        .y_desc(CALORIES_AXIS)
        .x_labels(rows.len())
        .x_label_formatter(&|x| names.get(*x as usize).cloned().unwrap_or_default())
        .x_label_style(
            ("sans-serif", 12.0)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            rows.iter()
                .enumerate()
                .map(|(i, r)| (i as u32, f64::from(r.calories))),
            &BLUE,
        ))
        .map_err(render_err)?;
    Ok(())
}

fn draw_pie(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    rows: &[ChartRow],
    labels: Option<&[String]>,
) -> Result<(), ChartError> {
    let weights = slice_weights(rows);
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(ChartError::EmptySeries);
    }

    let root = root
        .titled(PIE_TITLE, ("sans-serif", 20.0).into_font())
        .map_err(render_err)?;
    let (pie_area, legend_area) = root.split_horizontally(PIE_LEGEND_SPLIT);

    let (w, h) = pie_area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.38;

    let colors: Vec<RGBColor> = (0..rows.len()).map(slice_color).collect();
    // slice labels stay blank; the legend outside the plot carries the names
    let blank = vec![""; rows.len()];

    let mut pie = Pie::new(&center, &radius, &weights, &colors, &blank);
    pie.percentages(("sans-serif", 14.0).into_font().color(&BLACK));
    pie_area.draw(&pie).map_err(render_err)?;

    if let Some(labels) = labels {
        for (i, label) in labels.iter().enumerate() {
            let y = 10 + (i as i32) * 18;
            legend_area
                .draw(&Rectangle::new(
                    [(0, y), (12, y + 12)],
                    slice_color(i).filled(),
                ))
                .map_err(render_err)?;
            legend_area
                .draw(&Text::new(
                    label.clone(),
                    (18, y + 2),
                    ("sans-serif", 13.0).into_font(),
                ))
                .map_err(render_err)?;
        }
    }
    Ok(())
}

fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

fn slice_color(i: usize) -> RGBColor {
    let (r, g, b) = Palette99::COLORS[i % Palette99::COLORS.len()];
    RGBColor(r, g, b)
}

fn render_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<ChartRow> {
        vec![
            ChartRow {
                name: "Flour".into(),
                price: 2.50,
                calories: 364,
                quantity: "2 cups".into(),
            },
            ChartRow {
                name: "Sugar".into(),
                price: 1.75,
                calories: 387,
                quantity: "1/2 cup".into(),
            },
            ChartRow {
                name: "Butter".into(),
                price: 4.20,
                calories: 717,
                quantity: "a knob".into(),
            },
        ]
    }

    fn decoded(chart: &RenderedChart) -> String {
        let bytes = BASE64.decode(&chart.image_base64).expect("valid base64");
        String::from_utf8(bytes).expect("svg is utf-8")
    }

    #[test]
    fn codes_map_to_kinds() {
        assert_eq!(ChartKind::from_code("#1"), Some(ChartKind::Bar));
        assert_eq!(ChartKind::from_code("#2"), Some(ChartKind::Line));
        assert_eq!(ChartKind::from_code("#3"), Some(ChartKind::Pie));
    }

    #[test]
    fn unknown_codes_map_to_none() {
        assert_eq!(ChartKind::from_code("#9"), None);
        assert_eq!(ChartKind::from_code(""), None);
        assert_eq!(ChartKind::from_code("bar"), None);
    }

    #[test]
    fn bar_chart_carries_fixed_metadata() {
        let chart = prepare_chart(ChartKind::Bar, &sample_rows(), None).expect("bar renders");
        assert_eq!(chart.title, "Ingredient Prices");
        assert_eq!(chart.x_label, Some("Ingredient"));
        assert_eq!(chart.y_label, Some("Price ($)"));
        assert_eq!(chart.media_type, "image/svg+xml");
        let svg = decoded(&chart);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn line_chart_carries_fixed_metadata() {
        let chart = prepare_chart(ChartKind::Line, &sample_rows(), None).expect("line renders");
        assert_eq!(chart.title, "Ingredient Calories");
        assert_eq!(chart.y_label, Some("Calories"));
    }

    #[test]
    fn line_chart_handles_a_single_row() {
        let rows = vec![ChartRow {
            name: "Salt".into(),
            price: 0.99,
            calories: 0,
            quantity: "1 tsp".into(),
        }];
        assert!(prepare_chart(ChartKind::Line, &rows, None).is_ok());
        assert!(prepare_chart(ChartKind::Bar, &rows, None).is_ok());
    }

    #[test]
    fn pie_weights_follow_row_order() {
        let rows = vec![
            ChartRow {
                name: "a".into(),
                price: 0.0,
                calories: 0,
                quantity: "1/2".into(),
            },
            ChartRow {
                name: "b".into(),
                price: 0.0,
                calories: 0,
                quantity: "3".into(),
            },
            ChartRow {
                name: "c".into(),
                price: 0.0,
                calories: 0,
                quantity: "abc".into(),
            },
        ];
        assert_eq!(slice_weights(&rows), vec![0.5, 3.0, 1.0]);
    }

    #[test]
    fn pie_legend_lists_supplied_labels() {
        let rows = sample_rows();
        let labels: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
        let chart = prepare_chart(ChartKind::Pie, &rows, Some(&labels)).expect("pie renders");
        assert_eq!(chart.title, "Ingredient Quantity Distribution");
        assert_eq!(chart.x_label, None);
        let svg = decoded(&chart);
        assert!(svg.contains("Flour"));
        assert!(svg.contains("Butter"));
    }

    #[test]
    fn empty_rows_are_rejected() {
        let err = prepare_chart(ChartKind::Bar, &[], None).unwrap_err();
        assert!(matches!(err, ChartError::EmptySeries));
    }

    #[test]
    fn zero_weight_pie_is_rejected() {
        let rows = vec![ChartRow {
            name: "a".into(),
            price: 1.0,
            calories: 1,
            quantity: "0".into(),
        }];
        let err = prepare_chart(ChartKind::Pie, &rows, None).unwrap_err();
        assert!(matches!(err, ChartError::EmptySeries));
    }

    #[test]
    fn rendering_is_deterministic() {
        let rows = sample_rows();
        let labels: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
        let first = prepare_chart(ChartKind::Pie, &rows, Some(&labels)).expect("pie renders");
        let second = prepare_chart(ChartKind::Pie, &rows, Some(&labels)).expect("pie renders");
        assert_eq!(first.image_base64, second.image_base64);
    }

    #[test]
    fn chart_response_serializes_null_without_a_chart() {
        let json = serde_json::to_string(&ChartResponse { chart: None }).unwrap();
        assert_eq!(json, r#"{"chart":null}"#);
    }
}
