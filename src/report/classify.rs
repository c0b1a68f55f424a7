use super::grid::Grid;
use super::sections::SectionKind;
use crate::config::ReportConfig;

/// What kind of placement a data row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Review,
    PharmacyReview,
    Comment,
}

/// Placement marker written into the output's first column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostType {
    /// Отзыв (основной сайт) - review placement.
    Os,
    /// Целевой сайт - targeted comment placement.
    Cs,
    /// Поддерживающий сайт - supporting discussion placement.
    Ps,
}

impl PostType {
    pub fn as_marker(self) -> &'static str {
        match self {
            PostType::Os => "ОС",
            PostType::Cs => "ЦС",
            PostType::Ps => "ПС",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostType::Os => "Отзыв",
            PostType::Cs => "Упоминание",
            PostType::Ps => "Поддерживающее",
        }
    }

    fn from_marker(text: &str) -> Option<Self> {
        // dotted forms ("о.с.") occur in hand-edited sheets
        let compact: String = text
            .trim()
            .chars()
            .filter(|c| *c != '.')
            .collect::<String>()
            .to_uppercase();
        match compact.as_str() {
            "ОС" => Some(PostType::Os),
            "ЦС" => Some(PostType::Cs),
            "ПС" => Some(PostType::Ps),
            _ => None,
        }
    }

    fn for_section(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Reviews => PostType::Os,
            SectionKind::TopComments => PostType::Cs,
            SectionKind::ActiveDiscussions => PostType::Ps,
        }
    }
}

/// Why a row was left out of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    Blank,
    Header,
    Marker,
    Statistics,
    /// No marker, no recognizable platform and no usable text.
    Ambiguous,
}

/// Classifier verdict for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Data(Category, PostType),
    Skipped(Skip),
}

fn category_for_url(url: &str, cfg: &ReportConfig) -> Option<Category> {
    let url = url.to_lowercase();
    if cfg.vocab.review_platforms.iter().any(|d| url.contains(d)) {
        return Some(Category::Review);
    }
    if cfg.vocab.pharmacy_platforms.iter().any(|d| url.contains(d)) {
        return Some(Category::PharmacyReview);
    }
    if cfg.vocab.comment_platforms.iter().any(|d| url.contains(d)) {
        return Some(Category::Comment);
    }
    None
}

fn looks_like_header(grid: &Grid, row: usize, cfg: &ReportConfig) -> bool {
    grid.row_matches_any(row, cfg.vocab.header_cells)
        || match grid.first_cell_text(row) {
            Some(t) => cfg.vocab.service_cells.iter().any(|s| t == *s),
            None => false,
        }
}

/// Classify one row of the data area.
///
/// Priority order: an explicit post-type marker always wins, then the
/// platform URL keyword sets, then the section the row sits in, provided the
/// row carries a platform, topic or enough message text to be data at all.
pub fn classify(
    grid: &Grid,
    row: usize,
    section: Option<SectionKind>,
    cfg: &ReportConfig,
) -> RowClass {
    if grid.row_is_blank(row) {
        return RowClass::Skipped(Skip::Blank);
    }
    if super::sections::is_statistics_row(grid, row, cfg) {
        return RowClass::Skipped(Skip::Statistics);
    }
    if looks_like_header(grid, row, cfg) {
        return RowClass::Skipped(Skip::Header);
    }
    if super::sections::marker_kind(grid, row).is_some() {
        return RowClass::Skipped(Skip::Marker);
    }

    let text = grid.cell(row, cfg.columns.text).text();
    // platform keywords may sit in either the platform or the URL column
    let url = format!(
        "{} {}",
        grid.cell(row, cfg.columns.platform).text(),
        grid.cell(row, cfg.columns.url).text()
    );

    // explicit marker beats everything, including the URL; the dedicated
    // post-type column wins over the leading marker column
    let marker = PostType::from_marker(&grid.cell(row, cfg.columns.post_type).text())
        .or_else(|| PostType::from_marker(&grid.cell(row, cfg.columns.marker).text()));
    if let Some(post_type) = marker {
        let category = match post_type {
            // a review marker is a review even on a comment platform; the URL
            // only distinguishes review sites from pharmacies
            PostType::Os => {
                let lower = url.to_lowercase();
                if cfg.vocab.pharmacy_platforms.iter().any(|d| lower.contains(d)) {
                    Category::PharmacyReview
                } else {
                    Category::Review
                }
            }
            PostType::Cs | PostType::Ps => Category::Comment,
        };
        return RowClass::Data(category, post_type);
    }

    if let Some(category) = category_for_url(&url, cfg) {
        let post_type = match category {
            Category::Review | Category::PharmacyReview => PostType::Os,
            Category::Comment => section
                .map(PostType::for_section)
                .unwrap_or(PostType::Cs),
        };
        return RowClass::Data(category, post_type);
    }

    // no marker, no known platform: fall back to the section. A row with a
    // platform or topic counts as data outright; text alone must carry a
    // real message
    let platform = grid.cell(row, cfg.columns.platform).text();
    let topic = grid.cell(row, cfg.columns.topic).text();
    if let Some(kind) = section {
        if !platform.is_empty()
            || !topic.is_empty()
            || text.chars().count() >= cfg.thresholds.min_text_len
        {
            let category = match kind {
                SectionKind::Reviews => Category::Review,
                _ => Category::Comment,
            };
            return RowClass::Data(category, PostType::for_section(kind));
        }
    }

    RowClass::Skipped(Skip::Ambiguous)
}
