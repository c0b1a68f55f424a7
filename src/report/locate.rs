use tracing::{debug, warn};

use super::grid::Grid;
use super::ReportError;
use crate::config::ReportConfig;

/// Where the table starts in the source sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Row holding the column headers, when one was recognized.
    pub header_row: Option<usize>,
    /// First data row (0-based).
    pub data_start: usize,
}

/// Find the header row inside the leading scan window and derive the first
/// data row. Sheets with hand-edited headers fall back to the configured
/// default start; a grid too short even for the fallback is a structure
/// error and aborts the run.
pub fn locate(grid: &Grid, cfg: &ReportConfig) -> Result<Layout, ReportError> {
    if grid.is_empty() {
        return Err(ReportError::Structure("sheet contains no rows".into()));
    }

    let window = cfg.thresholds.locator_window.min(grid.len());
    for row in 0..window {
        if grid.row_contains_any(row, cfg.vocab.header_cells) {
            debug!("header row located at {}", row);
            return Ok(Layout {
                header_row: Some(row),
                data_start: row + 1,
            });
        }
    }

    let fallback = cfg.thresholds.fallback_data_start;
    if grid.len() <= fallback {
        return Err(ReportError::Structure(format!(
            "no header row in first {} rows and only {} rows total",
            window,
            grid.len()
        )));
    }

    warn!("no header row recognized, using fallback data start {}", fallback);
    Ok(Layout {
        header_row: None,
        data_start: fallback,
    })
}
