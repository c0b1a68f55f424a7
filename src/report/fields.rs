use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

use super::grid::{CellValue, Grid};
use crate::config::ReportConfig;

// ── Dates ──────────────────────────────────────────────────────────────────

static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})$").unwrap());
static DOTTED_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap());
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").unwrap());
static VERBOSE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s+([а-яё]+)\s+(\d{4})").unwrap());
// "Fri Mar 07 2025", as Sheets exports render typed dates in some locales
static VERBOSE_DATE_EN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{3}\s+([a-z]{3})\s+(\d{1,2})\s+(\d{4})").unwrap()
});

const EN_MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const VERBOSE_MONTHS: &[(&str, u32)] = &[
    ("январ", 1),
    ("феврал", 2),
    ("март", 3),
    ("апрел", 4),
    ("мая", 5),
    ("май", 5),
    ("июн", 6),
    ("июл", 7),
    ("август", 8),
    ("сентябр", 9),
    ("октябр", 10),
    ("ноябр", 11),
    ("декабр", 12),
];

/// Day zero of the Excel 1900 date system, already adjusted for the
/// fictional 1900-02-29.
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

fn serial_to_date(serial: f64, cfg: &ReportConfig) -> Option<NaiveDate> {
    if serial < cfg.thresholds.serial_min || serial > cfg.thresholds.serial_max {
        return None;
    }
    excel_epoch().checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn two_digit_year(y: i32) -> i32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

/// Parse one cell into a calendar date, accepting the formats that actually
/// occur in the exports: native dates, Excel serial numbers inside the sanity
/// window, M/D/YY (US export order), DD.MM.YYYY and verbose Russian dates.
pub fn parse_date(cell: &CellValue, cfg: &ReportConfig) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => serial_to_date(*n, cfg),
        CellValue::Text(raw) => {
            let s = raw.trim();
            if let Ok(n) = s.parse::<f64>() {
                return serial_to_date(n, cfg);
            }
            if let Some(c) = SLASH_DATE.captures(s) {
                // slash dates come out of the US locale as month/day/year
                let month: u32 = c[1].parse().ok()?;
                let day: u32 = c[2].parse().ok()?;
                let year = two_digit_year(c[3].parse().ok()?);
                return NaiveDate::from_ymd_opt(year, month, day);
            }
            if let Some(c) = DOTTED_DATE.captures(s) {
                let day: u32 = c[1].parse().ok()?;
                let month: u32 = c[2].parse().ok()?;
                let year: i32 = c[3].parse().ok()?;
                return NaiveDate::from_ymd_opt(year, month, day);
            }
            if let Some(c) = ISO_DATE.captures(s) {
                let year: i32 = c[1].parse().ok()?;
                let month: u32 = c[2].parse().ok()?;
                let day: u32 = c[3].parse().ok()?;
                return NaiveDate::from_ymd_opt(year, month, day);
            }
            let lower = s.to_lowercase();
            if let Some(c) = VERBOSE_DATE.captures(&lower) {
                let day: u32 = c[1].parse().ok()?;
                let year: i32 = c[3].parse().ok()?;
                let name = &c[2];
                let month = VERBOSE_MONTHS
                    .iter()
                    .find(|(prefix, _)| name.starts_with(prefix))
                    .map(|(_, m)| *m)?;
                return NaiveDate::from_ymd_opt(year, month, day);
            }
            if let Some(c) = VERBOSE_DATE_EN.captures(&lower) {
                let month = EN_MONTHS.iter().position(|m| *m == &c[1])? as u32 + 1;
                let day: u32 = c[2].parse().ok()?;
                let year: i32 = c[3].parse().ok()?;
                return NaiveDate::from_ymd_opt(year, month, day);
            }
            None
        }
        CellValue::Empty => None,
    }
}

/// Canonical date rendering for the output workbook.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}.{:02}.{}", date.day(), date.month(), date.year())
}

/// First parseable date across the candidate columns, rendered canonically.
pub fn find_date(grid: &Grid, row: usize, cfg: &ReportConfig) -> Option<String> {
    cfg.columns
        .date_candidates
        .iter()
        .find_map(|&col| parse_date(grid.cell(row, col), cfg))
        .map(format_date)
}

// ── Views ──────────────────────────────────────────────────────────────────

/// A view count, or the explicit "no data" state for platforms with closed
/// read statistics. The two are never conflated with zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Views {
    Count(u64),
    NoData,
}

impl Views {
    pub fn count(self) -> Option<u64> {
        match self {
            Views::Count(n) => Some(n),
            Views::NoData => None,
        }
    }

    /// Rendering for the output workbook.
    pub fn display(self) -> String {
        match self {
            Views::Count(n) => n.to_string(),
            Views::NoData => "Нет данных".to_string(),
        }
    }
}

static THOUSANDS_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:[\s.,]\d{3})*$|^\d+$").unwrap());

fn views_from_cell(cell: &CellValue, cfg: &ReportConfig) -> Option<u64> {
    let in_window = |n: u64| n >= cfg.thresholds.views_min && n <= cfg.thresholds.views_max;
    match cell {
        CellValue::Number(n) => {
            if *n < 0.0 || n.fract() != 0.0 {
                return None;
            }
            let n = *n as u64;
            in_window(n).then_some(n)
        }
        CellValue::Text(raw) => {
            let s = raw.trim();
            let digits: String = if THOUSANDS_NUMBER.is_match(s) {
                s.chars().filter(|c| c.is_ascii_digit()).collect()
            } else {
                // noisy strings yield their first run of digits
                s.chars()
                    .skip_while(|c| !c.is_ascii_digit())
                    .take_while(|c| c.is_ascii_digit())
                    .collect()
            };
            if digits.is_empty() {
                return None;
            }
            let n = digits.parse::<u64>().ok()?;
            in_window(n).then_some(n)
        }
        _ => None,
    }
}

/// First plausible view count across the candidate columns. Platforms with
/// closed statistics leave all candidates empty or non-numeric and report
/// `NoData`.
pub fn find_views(grid: &Grid, row: usize, cfg: &ReportConfig) -> Views {
    cfg.columns
        .views_candidates
        .iter()
        .find_map(|&col| views_from_cell(grid.cell(row, col), cfg))
        .map(Views::Count)
        .unwrap_or(Views::NoData)
}

// ── Author ─────────────────────────────────────────────────────────────────

static URL_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://|^www\.").unwrap());

fn plausible_author(text: &str, cfg: &ReportConfig) -> bool {
    let len = text.chars().count();
    len >= cfg.thresholds.author_min_len
        && len <= cfg.thresholds.author_max_len
        && !URL_LIKE.is_match(text)
        && !text.chars().all(|c| c.is_ascii_digit())
        && !SLASH_DATE.is_match(text)
        && !DOTTED_DATE.is_match(text)
}

/// First plausible nickname across the candidate columns. The message-text
/// column is one of the candidates on drifted layouts, so a candidate equal
/// to the message itself is never taken.
pub fn find_author(grid: &Grid, row: usize, cfg: &ReportConfig) -> Option<String> {
    let message = grid.cell(row, cfg.columns.text).text();
    cfg.columns.author_candidates.iter().find_map(|&col| {
        let text = grid.cell(row, col).text();
        (text != message && plausible_author(&text, cfg)).then_some(text)
    })
}

// ── Engagement ─────────────────────────────────────────────────────────────

/// A row counts as engaged when the engagement cell carries an affirmative
/// mark. Anything else, including an empty cell, is not engaged.
pub fn has_engagement(grid: &Grid, row: usize, cfg: &ReportConfig) -> bool {
    let text = grid.cell(row, cfg.columns.engagement).normalized();
    !text.is_empty() && (text.contains("есть") || text.contains("да") || text.contains('+'))
}
