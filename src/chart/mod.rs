//! PNG chart rendering.
//!
//! `render` draws the three-panel chart into a temporary file next to the
//! destination and renames it into place, so a failed render never leaves a
//! truncated image at `output_path`.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::domain::{ChartRequest, QuoteTable};
use crate::error::PipelineError;

pub mod axis;
pub mod fonts;
pub mod panels;

pub use axis::CalendarAxis;
pub use panels::{PanelData, PanelStyle, draw_panels};

/// Output image size in pixels.
pub const IMAGE_SIZE: (u32, u32) = (1600, 1000);

/// Render `table` to a PNG at `request.output_path`, replacing any existing file.
///
/// The parent directory must already exist.
pub fn render(table: &QuoteTable, request: &ChartRequest) -> Result<PathBuf, PipelineError> {
    let output_path = request.output_path.as_path();
    let data = PanelData::from_table(table, &request.ticker, request.market)
        .ok_or_else(|| PipelineError::render(output_path, "no rows to plot"))?;
    let style = PanelStyle::image(fonts::ensure_font(None));

    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let temp = tempfile::Builder::new()
        .prefix(".chart-")
        .suffix(".png")
        .tempfile_in(dir)
        .map_err(|e| PipelineError::render(output_path, e))?
        .into_temp_path();

    {
        let root = BitMapBackend::new(&temp, IMAGE_SIZE).into_drawing_area();
        root.fill(&style.background)
            .map_err(|e| PipelineError::render(output_path, e))?;
        draw_panels(&root, &data, &style).map_err(|e| PipelineError::render(output_path, e))?;
        root.present().map_err(|e| PipelineError::render(output_path, e))?;
    }

    temp.persist(output_path)
        .map_err(|e| PipelineError::render(output_path, e.error))?;

    info!(path = %output_path.display(), rows = table.len(), text = style.text, "rendered chart");
    Ok(output_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Market, QuoteRow};
    use crate::math::add_moving_averages;
    use chrono::{Duration, NaiveDate};

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn sample_table(n: usize) -> QuoteTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.3).sin() * 5.0;
                QuoteRow::new(start + Duration::days(i as i64), c, c + 1.0, c - 1.0, c, 50_000.0 + i as f64 * 100.0)
            })
            .collect();
        let mut table = QuoteTable::new(rows);
        add_moving_averages(&mut table, 7, 20);
        table
    }

    fn request(ticker: &str, market: Market, out: &Path) -> ChartRequest {
        ChartRequest::new(ticker, market, out)
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn writes_png_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("BSE_RELIANCE.png");

        let path = render(&sample_table(100), &request("RELIANCE", Market::Bse, &out)).unwrap();
        assert_eq!(path, out);

        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.len() > PNG_MAGIC.len());
        assert_eq!(bytes[..8], PNG_MAGIC);

        assert_eq!(dir_entries(dir.path()), vec!["BSE_RELIANCE.png".to_string()]);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("NASDAQ_AAPL.png");
        std::fs::write(&out, b"stale").unwrap();

        render(&sample_table(5), &request("AAPL", Market::Nasdaq, &out)).unwrap();
        let bytes = std::fs::read(&out).unwrap();
        assert_eq!(bytes[..8], PNG_MAGIC);
    }

    #[test]
    fn missing_directory_is_render_error_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("chart.png");

        let err = render(&sample_table(10), &request("AAPL", Market::Nasdaq, &out)).unwrap_err();
        match err {
            PipelineError::Render { path, .. } => assert_eq!(path, out),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn empty_table_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("chart.png");
        let err = render(&QuoteTable::default(), &request("AAPL", Market::Nasdaq, &out)).unwrap_err();
        assert!(matches!(err, PipelineError::Render { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn failed_rename_cleans_up_temp_file_and_keeps_destination() {
        let dir = tempfile::tempdir().unwrap();
        // Drawing succeeds; moving the finished image onto a directory does not.
        let occupied = dir.path().join("occupied");
        std::fs::create_dir(&occupied).unwrap();

        let err = render(&sample_table(30), &request("AAPL", Market::Nasdaq, &occupied)).unwrap_err();
        match err {
            PipelineError::Render { path, .. } => assert_eq!(path, occupied),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(occupied.is_dir());
        assert!(dir_entries(&occupied).is_empty());
        assert_eq!(dir_entries(dir.path()), vec!["occupied".to_string()]);
    }
}
