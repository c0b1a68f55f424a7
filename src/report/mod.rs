//! Report processing pipeline.
//!
//! One synchronous pass over the source grid: locate the table, cut it into
//! sections, classify and normalize each data row, then aggregate. The
//! workbook writer consumes the assembled rows afterwards.

pub mod aggregate;
pub mod assemble;
pub mod classify;
pub mod fields;
pub mod grid;
pub mod locate;
pub mod sections;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ReportConfig;
use aggregate::{aggregate, Statistics};
use classify::{classify, Category, PostType, RowClass, Skip};
use fields::Views;
use grid::Grid;
use sections::{Section, SectionKind};

#[derive(Debug, Error)]
pub enum ReportError {
    /// The sheet does not look like a report at all. Aborts the run.
    #[error("sheet structure not recognized: {0}")]
    Structure(String),
    #[error("failed to read workbook: {0}")]
    Read(String),
    #[error("failed to write workbook: {0}")]
    Write(String),
}

/// One normalized placement, ready for output and aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub section: SectionKind,
    pub category: Category,
    pub post_type: PostType,
    pub platform: String,
    pub topic: String,
    pub url: String,
    pub text: String,
    /// Canonical DD.MM.YYYY, when any candidate column parsed.
    pub date: Option<String>,
    pub author: Option<String>,
    pub views: Views,
    pub engagement: bool,
}

/// How many rows were left out, by reason. Logged after every run so a
/// sudden spike in skips is visible without opening the sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub blank: usize,
    pub header: usize,
    pub marker: usize,
    pub statistics: usize,
    pub ambiguous: usize,
}

impl SkipCounts {
    fn bump(&mut self, skip: Skip) {
        match skip {
            Skip::Blank => self.blank += 1,
            Skip::Header => self.header += 1,
            Skip::Marker => self.marker += 1,
            Skip::Statistics => self.statistics += 1,
            Skip::Ambiguous => self.ambiguous += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.blank + self.header + self.marker + self.statistics + self.ambiguous
    }
}

/// Everything one processing run produces.
#[derive(Debug, Clone)]
pub struct ProcessedReport {
    pub records: Vec<Record>,
    pub sections: Vec<Section>,
    pub statistics: Statistics,
    pub skipped: SkipCounts,
}

fn extract_record(
    grid: &Grid,
    row: usize,
    section: SectionKind,
    category: Category,
    post_type: PostType,
    cfg: &ReportConfig,
) -> Record {
    Record {
        section,
        category,
        post_type,
        platform: grid.cell(row, cfg.columns.platform).text(),
        topic: grid.cell(row, cfg.columns.topic).text(),
        url: grid.cell(row, cfg.columns.url).text(),
        text: grid.cell(row, cfg.columns.text).text(),
        date: fields::find_date(grid, row, cfg),
        author: fields::find_author(grid, row, cfg),
        views: fields::find_views(grid, row, cfg),
        engagement: fields::has_engagement(grid, row, cfg),
    }
}

/// Records found before the first marker still land in a section so the
/// output grouping stays total.
fn default_section(category: Category) -> SectionKind {
    match category {
        Category::Review | Category::PharmacyReview => SectionKind::Reviews,
        Category::Comment => SectionKind::TopComments,
    }
}

/// Run the whole pipeline over an already-loaded grid.
pub fn process(grid: &Grid, cfg: &ReportConfig) -> Result<ProcessedReport, ReportError> {
    let layout = locate::locate(grid, cfg)?;
    let sections = sections::detect_sections(grid, &layout, cfg);

    let mut records = Vec::new();
    let mut skipped = SkipCounts::default();

    for row in layout.data_start..grid.len() {
        let section = sections::section_of(&sections, row);
        match classify(grid, row, section, cfg) {
            RowClass::Data(category, post_type) => {
                let section = section.unwrap_or_else(|| default_section(category));
                records.push(extract_record(grid, row, section, category, post_type, cfg));
            }
            RowClass::Skipped(reason) => {
                debug!("row {} skipped: {:?}", row, reason);
                skipped.bump(reason);
            }
        }
    }

    let statistics = aggregate(&records);
    info!(
        "processed {} rows: {} records, {} skipped",
        grid.len() - layout.data_start,
        records.len(),
        skipped.total()
    );

    Ok(ProcessedReport {
        records,
        sections,
        statistics,
        skipped,
    })
}
