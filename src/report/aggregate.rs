use serde::{Deserialize, Serialize};

use super::classify::Category;
use super::fields::Views;
use super::sections::SectionKind;
use super::Record;

/// Summary block computed from the classified records. Serialized into the
/// job store and rendered into the output footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_rows: usize,
    pub reviews_count: usize,
    pub comments_count: usize,
    pub active_discussions_count: usize,
    pub total_views: u64,
    /// Share of comment records with an engagement mark, percent, rounded
    /// half up. Zero when there are no comment records.
    pub engagement_rate: u64,
    /// Share of records whose platform published a readable view count,
    /// percent, same rounding.
    pub platforms_with_data: u64,
}

fn percent(part: usize, whole: usize) -> u64 {
    if whole == 0 {
        return 0;
    }
    // round half up
    ((part as f64 / whole as f64) * 100.0 + 0.5).floor() as u64
}

pub fn aggregate(records: &[Record]) -> Statistics {
    let mut stats = Statistics {
        total_rows: records.len(),
        ..Statistics::default()
    };
    let mut engaged = 0usize;
    let mut discussions = 0usize;
    let mut with_views = 0usize;

    for record in records {
        match record.category {
            Category::Review | Category::PharmacyReview => stats.reviews_count += 1,
            Category::Comment => {
                stats.comments_count += 1;
                discussions += 1;
                if record.engagement {
                    engaged += 1;
                }
            }
        }
        if record.section == SectionKind::ActiveDiscussions {
            stats.active_discussions_count += 1;
        }
        if let Views::Count(n) = record.views {
            stats.total_views += n;
            with_views += 1;
        }
    }

    stats.engagement_rate = percent(engaged, discussions);
    stats.platforms_with_data = percent(with_views, records.len());
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::classify::PostType;

    fn record(
        section: SectionKind,
        category: Category,
        views: Views,
        engagement: bool,
    ) -> Record {
        Record {
            section,
            category,
            post_type: match category {
                Category::Review | Category::PharmacyReview => PostType::Os,
                Category::Comment => PostType::Cs,
            },
            platform: "vk.com".into(),
            topic: String::new(),
            url: "https://vk.com/x".into(),
            text: "текст".into(),
            date: Some("15.03.2023".into()),
            author: None,
            views,
            engagement,
        }
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = aggregate(&[]);
        assert_eq!(stats, Statistics::default());
        assert_eq!(stats.engagement_rate, 0);
    }

    #[test]
    fn counts_split_by_category() {
        let records = vec![
            record(SectionKind::Reviews, Category::Review, Views::Count(100), false),
            record(SectionKind::Reviews, Category::PharmacyReview, Views::NoData, false),
            record(SectionKind::TopComments, Category::Comment, Views::Count(50), true),
            record(SectionKind::TopComments, Category::Comment, Views::NoData, false),
        ];
        let stats = aggregate(&records);
        assert_eq!(stats.total_rows, 4);
        assert_eq!(stats.reviews_count, 2);
        assert_eq!(stats.comments_count, 2);
        assert_eq!(stats.active_discussions_count, 0);
        assert_eq!(stats.total_views, 150);
        // 2 of 4 records carried a readable view count
        assert_eq!(stats.platforms_with_data, 50);
        assert_eq!(stats.engagement_rate, 50);
    }

    #[test]
    fn no_data_rows_do_not_touch_totals() {
        let records = vec![
            record(SectionKind::TopComments, Category::Comment, Views::NoData, false),
            record(SectionKind::TopComments, Category::Comment, Views::NoData, false),
        ];
        let stats = aggregate(&records);
        assert_eq!(stats.total_views, 0);
        assert_eq!(stats.platforms_with_data, 0);
    }

    #[test]
    fn engagement_rate_rounds_half_up() {
        // 1 of 3 engaged = 33.33 -> 33; 2 of 3 = 66.67 -> 67
        let mut records = vec![
            record(SectionKind::TopComments, Category::Comment, Views::NoData, true),
            record(SectionKind::TopComments, Category::Comment, Views::NoData, false),
            record(SectionKind::ActiveDiscussions, Category::Comment, Views::NoData, false),
        ];
        assert_eq!(aggregate(&records).engagement_rate, 33);
        records[1].engagement = true;
        assert_eq!(aggregate(&records).engagement_rate, 67);
    }

    #[test]
    fn active_discussions_counted_by_section() {
        let records = vec![
            record(SectionKind::ActiveDiscussions, Category::Comment, Views::Count(10), false),
            record(SectionKind::TopComments, Category::Comment, Views::Count(10), false),
        ];
        let stats = aggregate(&records);
        assert_eq!(stats.comments_count, 2);
        assert_eq!(stats.active_discussions_count, 1);
    }

    #[test]
    fn statistics_serialize_camel_case() {
        let json = serde_json::to_value(Statistics {
            total_rows: 1,
            reviews_count: 1,
            ..Statistics::default()
        })
        .unwrap();
        assert!(json.get("totalRows").is_some());
        assert!(json.get("reviewsCount").is_some());
        assert!(json.get("platformsWithData").is_some());
    }
}
