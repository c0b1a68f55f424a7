//! Report period detection from file names like "Фортедетрим_март_2025.xlsx".

use std::path::Path;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

/// Three-letter prefixes cover both full and short forms ("сент",
/// "сентябрь"); "мая" handles the genitive of May.
const MONTHS: &[(&str, &str)] = &[
    ("янв", "Январь"),
    ("фев", "Февраль"),
    ("мар", "Март"),
    ("апр", "Апрель"),
    ("май", "Май"),
    ("мая", "Май"),
    ("июн", "Июнь"),
    ("июл", "Июль"),
    ("авг", "Август"),
    ("сен", "Сентябрь"),
    ("окт", "Октябрь"),
    ("ноя", "Ноябрь"),
    ("дек", "Декабрь"),
];

// no \b: underscores are word characters, and file names delimit with them
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])(20\d{2})(?:[^0-9]|$)").unwrap());

const MONTH_NAMES: &[&str] = &[
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

/// Period of one report: display month name and four-digit year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub month: String,
    pub year: Option<String>,
}

impl Period {
    /// "Март 2025" or just "Март" when the year is absent.
    pub fn display(&self) -> String {
        match &self.year {
            Some(year) => format!("{} {}", self.month, year),
            None => self.month.clone(),
        }
    }
}

/// The period reports default to when the file name carries none.
pub fn current_period() -> Period {
    let now = chrono::Local::now();
    Period {
        month: MONTH_NAMES[now.month0() as usize].to_string(),
        year: Some(now.year().to_string()),
    }
}

/// Detect the report period from a file name or document title.
pub fn detect_period(name: &str) -> Option<Period> {
    let lower = name.to_lowercase();
    let month = MONTHS
        .iter()
        .find(|(prefix, _)| lower.contains(prefix))
        .map(|(_, display)| display.to_string())?;
    let year = YEAR.captures(name).map(|c| c[1].to_string());
    Some(Period { month, year })
}

/// Output file path next to the input: "{stem}_{Месяц}_{год}_result.xlsx",
/// period parts included only when detected.
pub fn output_path(input: &Path) -> std::path::PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    let name = match detect_period(&stem) {
        Some(period) => {
            let mut base = stem.clone();
            // avoid doubling the period when the stem already carries it
            if let Some(year) = &period.year {
                base = base.replace(year, "");
            }
            let base = base
                .trim_end_matches(['_', '-', ' '])
                .trim_end_matches(|c: char| c.is_alphabetic() && !c.is_ascii())
                .trim_end_matches(['_', '-', ' '])
                .to_string();
            match &period.year {
                Some(year) => format!("{}_{}_{}_result.xlsx", base, period.month, year),
                None => format!("{}_{}_result.xlsx", base, period.month),
            }
        }
        None => format!("{stem}_result.xlsx"),
    };
    input.with_file_name(name)
}
