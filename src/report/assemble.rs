use super::aggregate::Statistics;
use super::classify::PostType;
use super::sections::SectionKind;
use super::Record;

/// Visual role of one output row. The workbook writer maps each role to its
/// format; the assembler itself knows nothing about fonts or colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Title,
    Meta,
    PlanHeader,
    Header,
    SectionMarker,
    Data,
    FooterStat,
    Footnote,
    Blank,
}

/// One row of the output workbook, cells already rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub struct OutRow {
    pub style: RowStyle,
    pub cells: Vec<String>,
}

impl OutRow {
    fn new(style: RowStyle, cells: Vec<String>) -> Self {
        Self { style, cells }
    }

    fn blank() -> Self {
        Self::new(RowStyle::Blank, Vec::new())
    }
}

/// Column headers of the data table, in output order.
pub const DATA_HEADERS: &[&str] = &[
    "Площадка",
    "Тема",
    "Текст сообщения",
    "Дата",
    "Ник",
    "Просмотры",
    "Вовлечение",
    "Тип поста",
];

const VIEWS_FOOTNOTE: &str = "*Без учета площадок с закрытой статистикой прочтений";
const GROWTH_FOOTNOTE: &str = "Количество прочтений увеличивается в среднем на 30% \
в течение 3 месяцев, следующих за публикацией";

fn data_row(record: &Record) -> OutRow {
    OutRow::new(
        RowStyle::Data,
        vec![
            record.platform.clone(),
            record.topic.clone(),
            record.text.clone(),
            record.date.clone().unwrap_or_default(),
            record.author.clone().unwrap_or_default(),
            record.views.display(),
            if record.engagement { "Есть".into() } else { String::new() },
            record.post_type.as_marker().to_string(),
        ],
    )
}

fn plan_count(records: &[Record], post_type: PostType) -> usize {
    records.iter().filter(|r| r.post_type == post_type).count()
}

/// Build the full output sheet: title block, plan row with aggregate labels
/// in the trailing columns, the column-header row carrying the matching
/// summary counts, one titled block per section in canonical order, and the
/// footer statistics. Sections with no records still get their marker row so
/// the report shape is stable month to month.
pub fn assemble(
    product: &str,
    period: &str,
    records: &[Record],
    stats: &Statistics,
) -> Vec<OutRow> {
    let mut rows = Vec::new();

    rows.push(OutRow::new(RowStyle::Title, vec!["Продукт".into(), product.to_string()]));
    rows.push(OutRow::new(RowStyle::Meta, vec!["Период".into(), period.to_string()]));

    // plan labels sit to the right of the data columns; the counts go on the
    // header row directly beneath them
    let mut plan = vec!["План".to_string()];
    plan.resize(DATA_HEADERS.len(), String::new());
    plan.extend([
        PostType::Os.label().to_string(),
        PostType::Cs.label().to_string(),
        PostType::Ps.label().to_string(),
        "Всего".to_string(),
    ]);
    rows.push(OutRow::new(RowStyle::PlanHeader, plan));

    let mut header: Vec<String> = DATA_HEADERS.iter().map(|h| h.to_string()).collect();
    header.extend([
        plan_count(records, PostType::Os).to_string(),
        plan_count(records, PostType::Cs).to_string(),
        plan_count(records, PostType::Ps).to_string(),
        records.len().to_string(),
    ]);
    rows.push(OutRow::new(RowStyle::Header, header));

    for kind in [
        SectionKind::Reviews,
        SectionKind::TopComments,
        SectionKind::ActiveDiscussions,
    ] {
        rows.push(OutRow::new(RowStyle::SectionMarker, vec![kind.title().to_string()]));
        for record in records.iter().filter(|r| r.section == kind) {
            rows.push(data_row(record));
        }
    }

    rows.push(OutRow::blank());
    rows.push(OutRow::blank());
    let stat = |label: &str, value: String| {
        OutRow::new(RowStyle::FooterStat, vec![label.to_string(), value])
    };
    rows.push(stat(
        "Суммарное количество просмотров*",
        stats.total_views.to_string(),
    ));
    rows.push(stat(
        "Количество карточек с отзывами",
        stats.reviews_count.to_string(),
    ));
    rows.push(stat(
        "Количество обсуждений",
        stats.comments_count.to_string(),
    ));
    rows.push(stat(
        "Доля обсуждений с вовлечением",
        format!("{}%", stats.engagement_rate),
    ));
    rows.push(stat(
        "Площадки со статистикой просмотров",
        format!("{}%", stats.platforms_with_data),
    ));
    rows.push(OutRow::new(RowStyle::Footnote, vec![VIEWS_FOOTNOTE.to_string()]));
    rows.push(OutRow::new(RowStyle::Footnote, vec![GROWTH_FOOTNOTE.to_string()]));

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::aggregate::aggregate;
    use crate::report::classify::Category;
    use crate::report::fields::Views;

    fn record(section: SectionKind, post_type: PostType) -> Record {
        Record {
            section,
            category: match post_type {
                PostType::Os => Category::Review,
                _ => Category::Comment,
            },
            post_type,
            platform: "otzovik.com".into(),
            topic: "Тема".into(),
            url: "https://otzovik.com/r".into(),
            text: "текст отзыва".into(),
            date: Some("15.03.2023".into()),
            author: Some("Мария_1985".into()),
            views: Views::Count(1200),
            engagement: true,
        }
    }

    fn sheet() -> Vec<OutRow> {
        let records = vec![
            record(SectionKind::Reviews, PostType::Os),
            record(SectionKind::TopComments, PostType::Cs),
            record(SectionKind::ActiveDiscussions, PostType::Ps),
        ];
        let stats = aggregate(&records);
        assemble("Фортедетрим", "Март 2025", &records, &stats)
    }

    #[test]
    fn title_block_leads_the_sheet() {
        let rows = sheet();
        assert_eq!(rows[0].style, RowStyle::Title);
        assert_eq!(rows[0].cells, vec!["Продукт", "Фортедетрим"]);
        assert_eq!(rows[1].cells[0], "Период");
        assert_eq!(rows[2].cells[0], "План");
    }

    #[test]
    fn plan_labels_and_counts_align_past_the_data_columns() {
        let rows = sheet();
        // labels on the plan row, counts directly beneath on the header row
        assert_eq!(rows[2].cells[8], "Отзыв");
        assert_eq!(rows[2].cells[11], "Всего");
        assert_eq!(rows[3].style, RowStyle::Header);
        assert_eq!(rows[3].cells[8], "1");
        assert_eq!(rows[3].cells[9], "1");
        assert_eq!(rows[3].cells[10], "1");
        assert_eq!(rows[3].cells[11], "3");
    }

    #[test]
    fn header_row_matches_canonical_order() {
        let rows = sheet();
        let header = rows.iter().find(|r| r.style == RowStyle::Header).unwrap();
        assert_eq!(header.cells[0], "Площадка");
        assert_eq!(header.cells[7], "Тип поста");
        assert_eq!(header.cells.len(), DATA_HEADERS.len() + 4);
    }

    #[test]
    fn sections_follow_the_header_directly() {
        let rows = sheet();
        assert_eq!(rows[4].style, RowStyle::SectionMarker);
        assert_eq!(rows[4].cells[0], "Отзывы");
    }

    #[test]
    fn sections_appear_in_canonical_order() {
        let rows = sheet();
        let markers: Vec<&str> = rows
            .iter()
            .filter(|r| r.style == RowStyle::SectionMarker)
            .map(|r| r.cells[0].as_str())
            .collect();
        assert_eq!(
            markers,
            vec![
                "Отзывы",
                "Комментарии Топ-20 выдачи",
                "Активные обсуждения (мониторинг)"
            ]
        );
    }

    #[test]
    fn empty_sections_still_get_markers() {
        let records = vec![record(SectionKind::Reviews, PostType::Os)];
        let stats = aggregate(&records);
        let rows = assemble("П", "Март", &records, &stats);
        let markers = rows
            .iter()
            .filter(|r| r.style == RowStyle::SectionMarker)
            .count();
        assert_eq!(markers, 3);
    }

    #[test]
    fn data_rows_render_all_fields() {
        let rows = sheet();
        let data = rows.iter().find(|r| r.style == RowStyle::Data).unwrap();
        assert_eq!(data.cells[0], "otzovik.com");
        assert_eq!(data.cells[3], "15.03.2023");
        assert_eq!(data.cells[5], "1200");
        assert_eq!(data.cells[6], "Есть");
        assert_eq!(data.cells[7], "ОС");
    }

    #[test]
    fn footer_carries_totals_and_footnotes() {
        let rows = sheet();
        let views = rows
            .iter()
            .find(|r| r.cells.first().map(String::as_str)
                == Some("Суммарное количество просмотров*"))
            .unwrap();
        assert_eq!(views.cells[1], "3600");
        let footnotes = rows
            .iter()
            .filter(|r| r.style == RowStyle::Footnote)
            .count();
        assert_eq!(footnotes, 2);
    }
}
