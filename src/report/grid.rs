use chrono::NaiveDate;

/// One source cell, already decoded from the workbook reader.
///
/// A closed set of variants instead of ad hoc type sniffing at call sites:
/// every consumer goes through the normalizers in `fields`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    /// Empty, or text that trims to nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Trimmed text rendering used for display and author/platform fields.
    pub fn text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Date(d) => d.format("%d.%m.%Y").to_string(),
        }
    }

    /// Trimmed, lower-cased rendering for keyword matching.
    pub fn normalized(&self) -> String {
        self.text().to_lowercase()
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// Immutable snapshot of the source sheet. Rows may be ragged; reads past a
/// row's end yield `Empty`.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn row_is_blank(&self, row: usize) -> bool {
        match self.rows.get(row) {
            Some(r) => r.iter().all(CellValue::is_blank),
            None => true,
        }
    }

    /// Normalized text of the first non-blank cell in a row.
    pub fn first_cell_text(&self, row: usize) -> Option<String> {
        self.rows
            .get(row)?
            .iter()
            .find(|c| !c.is_blank())
            .map(CellValue::normalized)
    }

    /// Does any cell of the row contain one of the vocabulary entries?
    pub fn row_contains_any(&self, row: usize, vocabulary: &[&str]) -> bool {
        match self.rows.get(row) {
            Some(r) => r.iter().any(|c| {
                let t = c.normalized();
                !t.is_empty() && vocabulary.iter().any(|v| t.contains(v))
            }),
            None => false,
        }
    }

    /// Does any cell of the row equal one of the vocabulary entries exactly?
    /// Message text routinely mentions the header words, so inline header
    /// redetection must not use substring matching.
    pub fn row_matches_any(&self, row: usize, vocabulary: &[&str]) -> bool {
        match self.rows.get(row) {
            Some(r) => r.iter().any(|c| {
                let t = c.normalized();
                vocabulary.iter().any(|v| t == *v)
            }),
            None => false,
        }
    }
}

/// Convenience constructor for tests: every &str becomes a Text cell,
/// "" becomes Empty.
#[cfg(test)]
pub fn grid_of(rows: &[&[&str]]) -> Grid {
    let rows = rows
        .iter()
        .map(|r| {
            r.iter()
                .map(|s| {
                    if s.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(s.to_string())
                    }
                })
                .collect()
        })
        .collect();
    Grid::new(rows)
}
