use tracing::debug;

use super::grid::Grid;
use super::locate::Layout;
use crate::config::ReportConfig;

/// The three report sections, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Reviews,
    TopComments,
    ActiveDiscussions,
}

impl SectionKind {
    /// Section title as it appears in the output workbook.
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Reviews => "Отзывы",
            SectionKind::TopComments => "Комментарии Топ-20 выдачи",
            SectionKind::ActiveDiscussions => "Активные обсуждения (мониторинг)",
        }
    }
}

/// Inclusive row range of one section's data. An empty section has
/// `end_row < start_row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub start_row: usize,
    pub end_row: usize,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.end_row < self.start_row
    }

    pub fn contains(&self, row: usize) -> bool {
        !self.is_empty() && row >= self.start_row && row <= self.end_row
    }
}

/// Which section a marker row opens, if any. Markers are matched on the
/// first non-blank cell only, so a comment that merely mentions a section
/// name never opens one.
pub(super) fn marker_kind(grid: &Grid, row: usize) -> Option<SectionKind> {
    let text = grid.first_cell_text(row)?;
    if text.contains("комментарии топ-20") || text.contains("топ-20 выдачи") {
        Some(SectionKind::TopComments)
    } else if text.contains("активные обсуждения") || text.contains("мониторинг") {
        Some(SectionKind::ActiveDiscussions)
    } else if text.contains("отзыв")
        && !text.contains("топ-20")
        && !text.contains("обсужден")
        && !text.contains("количество")
    {
        Some(SectionKind::Reviews)
    } else {
        None
    }
}

/// Footer statistics rows. These never open or close a section and are
/// skipped when trimming section tails.
pub fn is_statistics_row(grid: &Grid, row: usize, cfg: &ReportConfig) -> bool {
    match grid.first_cell_text(row) {
        Some(text) => cfg
            .vocab
            .statistics_prefixes
            .iter()
            .any(|p| text.starts_with(p)),
        None => false,
    }
}

/// Walk the data area once and cut it into sections.
///
/// A marker row opens its section on the row after the marker. The previous
/// section is closed on the last data-bearing row before the marker, scanning
/// backwards over blank and statistics rows. Rows before the first marker
/// belong to no section.
pub fn detect_sections(grid: &Grid, layout: &Layout, cfg: &ReportConfig) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut open: Option<(SectionKind, usize)> = None;

    let close = |sections: &mut Vec<Section>, kind: SectionKind, start: usize, before: usize| {
        let mut end = before;
        loop {
            if end < start {
                break;
            }
            if grid.row_is_blank(end) || is_statistics_row(grid, end, cfg) {
                if end == 0 {
                    break;
                }
                end -= 1;
                continue;
            }
            break;
        }
        // start - 1 marks an empty section
        let end_row = if end < start { start.saturating_sub(1) } else { end };
        sections.push(Section {
            kind,
            start_row: start,
            end_row,
        });
    };

    for row in layout.data_start..grid.len() {
        if is_statistics_row(grid, row, cfg) {
            continue;
        }
        if let Some(kind) = marker_kind(grid, row) {
            if let Some((open_kind, open_start)) = open.take() {
                close(&mut sections, open_kind, open_start, row.saturating_sub(1));
            }
            // data starts on the row after the marker
            open = Some((kind, row + 1));
        }
    }

    if let Some((kind, start)) = open {
        close(&mut sections, kind, start, grid.len().saturating_sub(1));
    }

    debug!("detected {} sections", sections.len());
    sections
}

/// The section a data row falls into, if any.
pub fn section_of(sections: &[Section], row: usize) -> Option<SectionKind> {
    sections
        .iter()
        .find(|s| s.contains(row))
        .map(|s| s.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::grid::grid_of;
    use crate::report::locate::locate;

    /// Grid mirroring the reference boundary scenario: headers on row 4,
    /// three marked sections with 2, 1 and 1 data rows, then footer stats.
    fn boundary_grid() -> Grid {
        grid_of(&[
            &["Продукт", "Фортедетрим"],                        // 0
            &["Период", "Март 2025"],                            // 1
            &["План"],                                            // 2
            &[""],                                                // 3
            &["Тип размещения", "Площадка", "Тема", "Ссылка", "Текст сообщения"], // 4
            &[""],                                                // 5
            &["Отзывы"],                                         // 6
            &["", "otzovik.com", "", "https://otzovik.com/r1", "отличный препарат, помог"], // 7
            &["", "irecommend.ru", "", "https://irecommend.ru/r2", "рекомендую всем знакомым"], // 8
            &["Комментарии Топ-20 выдачи"],                      // 9
            &["", "dzen.ru", "", "https://dzen.ru/c1", "полезная статья, спасибо"], // 10
            &["Активные обсуждения (мониторинг)"],               // 11
            &["", "vk.com", "", "https://vk.com/d1", "обсуждаем витамин Д дозировки"], // 12
            &[""],                                                // 13
            &["Суммарное количество просмотров*", "", "123"],   // 14
            &["Количество обсуждений", "", "4"],                 // 15
        ])
    }

    #[test]
    fn boundaries_match_reference_scenario() {
        let grid = boundary_grid();
        let cfg = ReportConfig::default();
        let layout = locate(&grid, &cfg).unwrap();
        let sections = detect_sections(&grid, &layout, &cfg);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].kind, SectionKind::Reviews);
        assert_eq!((sections[0].start_row, sections[0].end_row), (7, 8));
        assert_eq!(sections[1].kind, SectionKind::TopComments);
        assert_eq!((sections[1].start_row, sections[1].end_row), (10, 10));
        assert_eq!(sections[2].kind, SectionKind::ActiveDiscussions);
        assert_eq!((sections[2].start_row, sections[2].end_row), (12, 12));
    }

    #[test]
    fn section_starts_on_row_after_marker() {
        let grid = boundary_grid();
        let cfg = ReportConfig::default();
        let layout = locate(&grid, &cfg).unwrap();
        let sections = detect_sections(&grid, &layout, &cfg);
        for s in &sections {
            assert!(marker_kind(&grid, s.start_row - 1).is_some());
            assert!(marker_kind(&grid, s.start_row).is_none());
        }
    }

    #[test]
    fn sections_are_disjoint() {
        let grid = boundary_grid();
        let cfg = ReportConfig::default();
        let layout = locate(&grid, &cfg).unwrap();
        let sections = detect_sections(&grid, &layout, &cfg);
        for w in sections.windows(2) {
            assert!(w[0].end_row < w[1].start_row);
        }
    }

    #[test]
    fn stats_rows_do_not_extend_the_last_section() {
        let grid = boundary_grid();
        let cfg = ReportConfig::default();
        let layout = locate(&grid, &cfg).unwrap();
        let sections = detect_sections(&grid, &layout, &cfg);
        let last = sections.last().unwrap();
        assert_eq!(last.end_row, 12);
        assert!(!last.contains(14));
    }

    #[test]
    fn marker_directly_followed_by_marker_yields_empty_section() {
        let grid = grid_of(&[
            &["Тип размещения", "Площадка"],
            &["Отзывы"],
            &["Комментарии Топ-20 выдачи"],
            &["", "dzen.ru", "", "https://dzen.ru/c", "текст комментария тут"],
        ]);
        let cfg = ReportConfig::default();
        let layout = locate(&grid, &cfg).unwrap();
        let sections = detect_sections(&grid, &layout, &cfg);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].is_empty());
        assert!(!sections[1].is_empty());
        assert_eq!(sections[1].start_row, 3);
    }

    #[test]
    fn marker_matching_ignores_other_columns() {
        let grid = grid_of(&[
            &["Площадка"],
            &["Отзывы"],
            &["", "dzen.ru", "Отзывы о товаре", "https://dzen.ru/c", "текст сообщения здесь"],
        ]);
        let cfg = ReportConfig::default();
        let layout = locate(&grid, &cfg).unwrap();
        let sections = detect_sections(&grid, &layout, &cfg);
        assert_eq!(sections.len(), 1);
        assert_eq!((sections[0].start_row, sections[0].end_row), (2, 2));
    }

    #[test]
    fn statistics_prefixes_detected() {
        let grid = grid_of(&[&["Суммарное количество просмотров*", "", "999"]]);
        assert!(is_statistics_row(&grid, 0, &ReportConfig::default()));
    }
}
