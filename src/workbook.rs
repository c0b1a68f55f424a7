//! Workbook I/O: calamine on the way in, rust_xlsxwriter on the way out.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use tracing::info;

use crate::report::assemble::{OutRow, RowStyle, DATA_HEADERS};
use crate::report::grid::{CellValue, Grid};
use crate::report::ReportError;

const HEADER_COLOR: Color = Color::RGB(0x2D1B69);
const SECTION_COLOR: Color = Color::RGB(0xC5D9F1);

fn cell_from(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        // serials keep their numeric form so the date window applies
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
    }
}

fn grid_from_range(range: &Range<Data>) -> Grid {
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from).collect())
        .collect();
    Grid::new(rows)
}

fn first_sheet<R: Reader<RS>, RS: std::io::Read + std::io::Seek>(
    workbook: &mut R,
) -> Result<Range<Data>, ReportError>
where
    R::Error: std::fmt::Display,
{
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReportError::Read("workbook has no sheets".into()))?;
    workbook
        .worksheet_range(&name)
        .map_err(|e| ReportError::Read(format!("sheet '{name}': {e}")))
}

/// Load the first sheet of an .xlsx (or .xls) file into a grid.
pub fn read_grid(path: &Path) -> Result<Grid, ReportError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReportError::Read(format!("{}: {e}", path.display())))?;
    let range = first_sheet(&mut workbook)?;
    let grid = grid_from_range(&range);
    info!("read {} rows from {}", grid.len(), path.display());
    Ok(grid)
}

/// Load the first sheet from an in-memory .xlsx, as downloaded exports are.
pub fn read_grid_from_bytes(bytes: &[u8]) -> Result<Grid, ReportError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> =
        Xlsx::new(cursor).map_err(|e| ReportError::Read(e.to_string()))?;
    let range = first_sheet(&mut workbook)?;
    Ok(grid_from_range(&range))
}

struct Styles {
    title: Format,
    meta: Format,
    plan_header: Format,
    header: Format,
    section: Format,
    data: Format,
    footer: Format,
    footnote: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(14),
            meta: Format::new().set_bold(),
            plan_header: Format::new().set_bold(),
            header: Format::new()
                .set_bold()
                .set_background_color(HEADER_COLOR)
                .set_font_color(Color::White)
                .set_align(FormatAlign::Center),
            section: Format::new().set_bold().set_background_color(SECTION_COLOR),
            data: Format::new().set_text_wrap(),
            footer: Format::new().set_bold(),
            footnote: Format::new().set_italic().set_font_size(9),
        }
    }

    fn for_style(&self, style: RowStyle) -> &Format {
        match style {
            RowStyle::Title => &self.title,
            RowStyle::Meta => &self.meta,
            RowStyle::PlanHeader => &self.plan_header,
            RowStyle::Header => &self.header,
            RowStyle::SectionMarker => &self.section,
            RowStyle::Data => &self.data,
            RowStyle::FooterStat => &self.footer,
            RowStyle::Footnote | RowStyle::Blank => &self.footnote,
        }
    }
}

const COLUMN_WIDTHS: &[(u16, f64)] = &[
    (0, 22.0), // Площадка
    (1, 24.0), // Тема
    (2, 60.0), // Текст сообщения
    (3, 12.0), // Дата
    (4, 18.0), // Ник
    (5, 12.0), // Просмотры
    (6, 12.0), // Вовлечение
    (7, 10.0), // Тип поста
];

/// Write the assembled rows as a styled workbook.
pub fn write_report(path: &Path, rows: &[OutRow]) -> Result<(), ReportError> {
    let wrap = |e: rust_xlsxwriter::XlsxError| ReportError::Write(e.to_string());
    let styles = Styles::new();
    let last_col = (DATA_HEADERS.len() - 1) as u16;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Отчет").map_err(wrap)?;
    for &(col, width) in COLUMN_WIDTHS {
        sheet.set_column_width(col, width).map_err(wrap)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let r = r as u32;
        let format = styles.for_style(row.style);
        match row.style {
            RowStyle::Blank => {}
            // single-cell rows span the table width
            RowStyle::SectionMarker | RowStyle::Footnote => {
                let text = row.cells.first().map(String::as_str).unwrap_or("");
                sheet
                    .merge_range(r, 0, r, last_col, text, format)
                    .map_err(wrap)?;
            }
            _ => {
                for (c, cell) in row.cells.iter().enumerate() {
                    if cell.is_empty() {
                        continue;
                    }
                    let c = c as u16;
                    if let Ok(n) = cell.parse::<f64>() {
                        sheet.write_number_with_format(r, c, n, format).map_err(wrap)?;
                    } else {
                        sheet.write_string_with_format(r, c, cell, format).map_err(wrap)?;
                    }
                }
            }
        }
    }

    workbook.save(path).map_err(wrap)?;
    info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
