use crate::{results::BenchmarkResultSet, ChartError};
use std::{fmt::Write as _, fs, path::Path};
use tracing::info;

const COLORS: [&str; 5] = ["red", "blue", "teal", "green", "yellow"];
const X_LABEL: &str = "Driver";
const Y_LABEL: &str = "Time in milliseconds (less is better)";

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: u32 = 5;

/// Bar chart with one bar per driver, rendered as SVG
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarChart {
    pub width: f64,
    pub height: f64,
}

impl Default for BarChart {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

impl BarChart {
    pub fn render(&self, results: &BenchmarkResultSet, title: &str) -> Result<String, ChartError> {
        let max = results.max().ok_or(ChartError::EmptyResults)?;
        // an all-zero set still gets a usable axis
        let max = if max > 0.0 { max } else { 1.0 };

        let plot_width = self.width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = self.height - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_height;
        let slot = plot_width / results.len() as f64;
        let bar_width = slot * 0.8;

        let mut svg = String::new();

        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        )?;
        writeln!(
            svg,
            r#"<rect width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        )?;
        writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="16">{}</text>"#,
            self.width / 2.0,
            MARGIN_TOP / 2.0,
            escape(title)
        )?;

        for tick in 0..=TICKS {
            let value = max * tick as f64 / TICKS as f64;
            let y = baseline - plot_height * tick as f64 / TICKS as f64;

            writeln!(
                svg,
                r#"<line x1="{x0}" y1="{y}" x2="{x1}" y2="{y}" stroke="lightgray"/>"#,
                x0 = MARGIN_LEFT,
                x1 = MARGIN_LEFT + plot_width,
            )?;
            writeln!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="end" font-size="10">{}</text>"#,
                MARGIN_LEFT - 5.0,
                y + 3.0,
                format_value(value)
            )?;
        }

        for (index, (driver, value)) in results.iter().enumerate() {
            let height = plot_height * value.max(0.0) / max;
            let x = MARGIN_LEFT + slot * index as f64 + (slot - bar_width) / 2.0;
            let center = x + bar_width / 2.0;

            writeln!(
                svg,
                r#"<rect x="{x}" y="{}" width="{bar_width}" height="{height}" fill="{}"/>"#,
                baseline - height,
                COLORS[index % COLORS.len()]
            )?;
            writeln!(
                svg,
                r#"<text x="{center}" y="{}" text-anchor="middle" font-size="11">{}</text>"#,
                baseline - height - 4.0,
                format_value(value)
            )?;
            writeln!(
                svg,
                r#"<text x="{center}" y="{}" text-anchor="middle" font-size="11">{}</text>"#,
                baseline + 15.0,
                escape(driver)
            )?;
        }

        writeln!(
            svg,
            r#"<line x1="{x}" y1="{top}" x2="{x}" y2="{baseline}" stroke="black"/>"#,
            x = MARGIN_LEFT,
            top = MARGIN_TOP,
        )?;
        writeln!(
            svg,
            r#"<line x1="{x0}" y1="{baseline}" x2="{x1}" y2="{baseline}" stroke="black"/>"#,
            x0 = MARGIN_LEFT,
            x1 = MARGIN_LEFT + plot_width,
        )?;
        writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">{X_LABEL}</text>"#,
            MARGIN_LEFT + plot_width / 2.0,
            self.height - 15.0
        )?;
        writeln!(
            svg,
            r#"<text x="15" y="{y}" text-anchor="middle" font-size="12" transform="rotate(-90 15 {y})">{Y_LABEL}</text>"#,
            y = MARGIN_TOP + plot_height / 2.0
        )?;
        svg.push_str("</svg>\n");

        Ok(svg)
    }

    pub fn save(
        &self,
        results: &BenchmarkResultSet,
        title: &str,
        path: &Path,
    ) -> Result<(), ChartError> {
        fs::write(path, self.render(results, title)?)?;
        info!("Wrote chart for {} drivers to {}", results.len(), path.display());

        Ok(())
    }
}
