//! Immutable processing configuration.
//!
//! Column indices, keyword vocabularies and numeric thresholds are passed
//! explicitly into each pipeline stage so tests can run against alternate
//! sheet layouts without code edits.

/// Header-row vocabulary: a row containing any of these cells is the table
/// header of the source sheet.
const HEADER_CELLS: &[&str] = &[
    "тип размещения",
    "площадка",
    "текст сообщения",
    "тип поста",
];

/// Service rows that may appear above or inside the data block.
const SERVICE_CELLS: &[&str] = &["план", "итого"];

/// First-cell prefixes of footer statistics rows. These rows never open or
/// close a section and never count as data.
const STATISTICS_PREFIXES: &[&str] = &[
    "суммарное количество",
    "количество карточек",
    "количество обсуждений",
    "доля обсуждений",
    "площадки со статистикой",
    "количество прочтений увеличивается",
];

/// Review-site domains (product-card reviews).
const REVIEW_PLATFORMS: &[&str] = &[
    "otzovik",
    "irecommend",
    "otzyvru",
    "pravogolosa",
    "medum",
    "vseotzyvy",
    "otzyvy.pro",
];

/// Pharmacy and marketplace domains.
const PHARMACY_PLATFORMS: &[&str] = &[
    "market.yandex",
    "dialog.ru",
    "goodapteka",
    "megapteka",
    "uteka",
    "nfapteka",
    "piluli.ru",
    "eapteka.ru",
    "pharmspravka.ru",
    "gde.ru",
    "ozon.ru",
];

/// Social / forum / video domains where comments live.
const COMMENT_PLATFORMS: &[&str] = &[
    "dzen.ru",
    "woman.ru",
    "forum.baby.ru",
    "vk.com",
    "t.me",
    "ok.ru",
    "otvet.mail.ru",
    "babyblog.ru",
    "mom.life",
    "youtube.com",
    "pikabu.ru",
    "livejournal.com",
    "facebook.com",
];

/// Source-sheet column layout, 0-based (A = 0).
///
/// The candidate lists exist because real exports drift: dates show up in D
/// or F on some months, nicknames in E or I. Scans go in list order and take
/// the first plausible value.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub marker: usize,
    pub platform: usize,
    pub topic: usize,
    pub url: usize,
    pub text: usize,
    pub engagement: usize,
    pub post_type: usize,
    pub date_candidates: Vec<usize>,
    pub author_candidates: Vec<usize>,
    pub views_candidates: Vec<usize>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            marker: 0,                        // A
            platform: 1,                      // B
            topic: 2,                         // C
            url: 3,                           // D
            text: 4,                          // E
            engagement: 12,                   // M
            post_type: 13,                    // N
            date_candidates: vec![6, 3, 5],   // G, D, F
            author_candidates: vec![7, 4, 8], // H, E, I
            views_candidates: vec![10, 11, 12], // K, L, M
        }
    }
}

/// Keyword sets used by the locator, boundary detector and classifier.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub header_cells: &'static [&'static str],
    pub service_cells: &'static [&'static str],
    pub statistics_prefixes: &'static [&'static str],
    pub review_platforms: &'static [&'static str],
    pub pharmacy_platforms: &'static [&'static str],
    pub comment_platforms: &'static [&'static str],
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            header_cells: HEADER_CELLS,
            service_cells: SERVICE_CELLS,
            statistics_prefixes: STATISTICS_PREFIXES,
            review_platforms: REVIEW_PLATFORMS,
            pharmacy_platforms: PHARMACY_PLATFORMS,
            comment_platforms: COMMENT_PLATFORMS,
        }
    }
}

/// Canonical numeric thresholds.
///
/// The source reports used several contradictory values over time; these are
/// the ones validated against the reference fixture and they are the single
/// place to change them.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// How many leading rows the structure locator scans for the header.
    pub locator_window: usize,
    /// 0-based data start used when no header row is found. Known workaround
    /// for sheets with hand-edited headers, not a silent guess.
    pub fallback_data_start: usize,
    /// Minimum message-text length for a row to qualify as data on text alone.
    pub min_text_len: usize,
    /// Accepted view-count window. Values outside it are treated as noise
    /// (this is what keeps date serials out of the views columns).
    pub views_min: u64,
    pub views_max: u64,
    /// Plausible nickname length.
    pub author_min_len: usize,
    pub author_max_len: usize,
    /// Excel serial day-numbers treated as dates (2009..2036).
    pub serial_min: f64,
    pub serial_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            locator_window: 10,
            fallback_data_start: 4,
            min_text_len: 10,
            views_min: 1,
            views_max: 1_000_000,
            author_min_len: 3,
            author_max_len: 49,
            serial_min: 40_000.0,
            serial_max: 50_000.0,
        }
    }
}

/// Bundle passed through the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    pub columns: ColumnLayout,
    pub vocab: Vocabulary,
    pub thresholds: Thresholds,
}
