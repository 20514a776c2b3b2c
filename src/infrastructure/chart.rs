//! Price history charts rendered with plotters

use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::domain::price::Observation;
use crate::shared::errors::ChartError;
use crate::shared::utils::file_stem;

const CHART_SIZE: (u32, u32) = (800, 480);
const MAX_X_LABELS: usize = 10;

/// Writes one SVG chart per product into a directory
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    chart_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        Self { chart_dir: chart_dir.into() }
    }

    /// Render the chart to `<chart_dir>/<stem>_chart.svg`. No history, no chart.
    pub fn render(&self, name: &str, history: &[Observation]) -> Result<Option<PathBuf>, ChartError> {
        let Some(svg) = render_svg(name, history)? else {
            return Ok(None);
        };

        fs::create_dir_all(&self.chart_dir)?;
        let path = self.chart_dir.join(format!("{}_chart.svg", file_stem(name)));
        fs::write(&path, svg)?;
        debug!("Rendered chart for {} to {}", name, path.display());
        Ok(Some(path))
    }
}

fn drawing_err<E: Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}

/// Price against observation index, x axis labelled with observation dates.
pub fn render_svg(name: &str, history: &[Observation]) -> Result<Option<String>, ChartError> {
    let (Some(min), Some(max)) = (
        history.iter().map(|o| o.price).min(),
        history.iter().map(|o| o.price).max(),
    ) else {
        return Ok(None);
    };

    let pad = ((max - min) / 10).max(1);
    let x_end = history.len().max(2) - 1;
    let label_of = |i: &usize| history.get(*i).map(|o| o.timestamp.clone()).unwrap_or_default();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Price history: {}", name), ("sans-serif", 24))
            .margin(16)
            .x_label_area_size(56)
            .y_label_area_size(72)
            .build_cartesian_2d(0usize..x_end, min.saturating_sub(pad)..max + pad)
            .map_err(drawing_err)?;

        chart
            .configure_mesh()
            .x_labels(history.len().min(MAX_X_LABELS))
            .x_label_formatter(&label_of)
            .y_desc("Price, ₽")
            .draw()
            .map_err(drawing_err)?;

        chart
            .draw_series(LineSeries::new(
                history.iter().enumerate().map(|(i, o)| (i, o.price)),
                &BLUE,
            ))
            .map_err(drawing_err)?;

        chart
            .draw_series(
                history
                    .iter()
                    .enumerate()
                    .map(|(i, o)| Circle::new((i, o.price), 3, BLUE.filled())),
            )
            .map_err(drawing_err)?;

        root.present().map_err(drawing_err)?;
    }

    Ok(Some(svg))
}
