//! The aggregation engine: one pass over the normalized record list producing
//! an immutable analytics snapshot. Malformed records are excluded from the
//! aggregates they would have fed and reported through a side channel; they
//! never abort the batch.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use crate::categories::categorize;
use crate::domain::extract_domain;
use crate::media::{is_video_url, MediaClassifier, MediaKind};
use crate::record::BrowsingRecord;
use crate::rules::RuleTable;
use crate::stats::{
    AnalyticsResult, CategoryStat, DailyStat, DomainStat, ExclusionReason, MediaStats, RecordIssue,
    TimeStat, TopSite, TopVideo, VideoStat, HOURS_PER_DAY,
};

/// How many top sites a daily entry keeps.
const DAILY_TOP_SITES: usize = 5;
/// How many most-watched videos the media shelf keeps.
const TOP_VIDEOS: usize = 5;

/// Timestamp shapes seen in real history exports, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.naive_local())
}

/// The analytics engine: compiled rule tables plus the aggregation pass.
/// Stateless between invocations; each call returns a fresh snapshot.
pub struct Engine {
    category_rules: RuleTable,
    media: MediaClassifier,
}

impl Engine {
    pub fn new(category_rules: RuleTable, video_rules: RuleTable) -> Result<Self> {
        Ok(Self {
            category_rules,
            media: MediaClassifier::new(video_rules)?,
        })
    }

    /// Aggregate a record list into an analytics snapshot, discarding the
    /// per-record diagnostics.
    pub fn analyze(&self, records: &[BrowsingRecord]) -> AnalyticsResult {
        self.analyze_with_diagnostics(records).0
    }

    /// Aggregate a record list into an analytics snapshot plus the list of
    /// records that were excluded from some aggregate and why.
    pub fn analyze_with_diagnostics(
        &self,
        records: &[BrowsingRecord],
    ) -> (AnalyticsResult, Vec<RecordIssue>) {
        let start_time = Instant::now();
        info!(
            action = "start",
            component = "engine",
            record_count = records.len(),
            "Starting history aggregation"
        );

        if records.is_empty() {
            return (AnalyticsResult::empty(), Vec::new());
        }

        let mut issues = Vec::new();

        let mut domains: HashMap<String, (u32, Option<NaiveDateTime>)> = HashMap::new();
        let mut category_counts: HashMap<String, u32> = HashMap::new();
        let mut classified_records: u32 = 0;

        let mut hour_buckets = [0u32; HOURS_PER_DAY];
        let mut days: HashMap<NaiveDate, (u32, HashMap<String, u32>)> = HashMap::new();

        let mut video_category_counts: HashMap<String, u32> = HashMap::new();
        let mut video_records: u32 = 0;
        let mut video_views: HashMap<String, u32> = HashMap::new();
        let mut movies: Vec<String> = Vec::new();
        let mut anime: Vec<String> = Vec::new();

        for record in records {
            let domain = extract_domain(&record.navigated_to_url);
            let timestamp = parse_timestamp(&record.date_time);

            if domain.is_none() {
                issues.push(RecordIssue {
                    record: record.clone(),
                    reason: ExclusionReason::MalformedUrl,
                });
            }
            if timestamp.is_none() {
                issues.push(RecordIssue {
                    record: record.clone(),
                    reason: ExclusionReason::UnparseableTimestamp,
                });
            }

            if let Some(domain) = &domain {
                let entry = domains.entry(domain.clone()).or_insert((0, None));
                entry.0 += 1;
                if let Some(ts) = timestamp {
                    entry.1 = Some(entry.1.map_or(ts, |last| last.max(ts)));
                }

                let category = categorize(domain, &self.category_rules);
                *category_counts.entry(category).or_insert(0) += 1;
                classified_records += 1;
            }

            if let Some(ts) = timestamp {
                hour_buckets[ts.hour() as usize] += 1;

                let day = days.entry(ts.date()).or_insert_with(|| (0, HashMap::new()));
                day.0 += 1;
                if let Some(domain) = &domain {
                    *day.1.entry(domain.clone()).or_insert(0) += 1;
                }
            }

            if is_video_url(&record.navigated_to_url) {
                let classification = self.media.classify(&record.page_title, &record.navigated_to_url);
                video_records += 1;
                *video_category_counts
                    .entry(classification.category)
                    .or_insert(0) += 1;

                if !classification.cleaned_title.is_empty() {
                    *video_views
                        .entry(classification.cleaned_title.clone())
                        .or_insert(0) += 1;

                    match self
                        .media
                        .media_kind(&classification.cleaned_title, domain.as_deref())
                    {
                        Some(MediaKind::Movie) => {
                            push_distinct(&mut movies, classification.cleaned_title)
                        }
                        Some(MediaKind::Anime) => {
                            push_distinct(&mut anime, classification.cleaned_title)
                        }
                        None => {}
                    }
                }
            }
        }

        let domain_stats = build_domain_stats(domains);
        let category_stats = build_share_stats(category_counts, classified_records)
            .into_iter()
            .map(|(category, count, percentage)| CategoryStat {
                category,
                count,
                percentage,
            })
            .collect();
        let video_categories = build_share_stats(video_category_counts, video_records)
            .into_iter()
            .map(|(category, count, percentage)| VideoStat {
                category,
                count,
                percentage,
            })
            .collect();

        let result = AnalyticsResult {
            total_visits: records.len() as u32,
            unique_domains: domain_stats.len() as u32,
            domain_stats,
            category_stats,
            time_stats: hour_buckets
                .iter()
                .enumerate()
                .map(|(hour, &visits)| TimeStat {
                    hour: hour as u32,
                    visits,
                })
                .collect(),
            daily_stats: build_daily_stats(days),
            video_categories,
            media_stats: MediaStats {
                movies,
                anime,
                top_videos: build_top_videos(video_views),
            },
        };

        let duration = start_time.elapsed();
        info!(
            action = "complete",
            component = "engine",
            total_visits = result.total_visits,
            unique_domains = result.unique_domains,
            excluded_records = issues.len(),
            duration_ms = duration.as_millis(),
            "History aggregation completed"
        );

        (result, issues)
    }
}

fn push_distinct(titles: &mut Vec<String>, title: String) {
    if !titles.iter().any(|existing| *existing == title) {
        titles.push(title);
    }
}

fn build_domain_stats(domains: HashMap<String, (u32, Option<NaiveDateTime>)>) -> Vec<DomainStat> {
    let mut stats: Vec<DomainStat> = domains
        .into_iter()
        .map(|(domain, (visits, last_visited))| DomainStat {
            domain,
            visits,
            rank: 0,
            last_visited,
        })
        .collect();

    // Visits descending, domain name ascending on ties, so ranks and every
    // view derived from this ordering are reproducible.
    stats.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.domain.cmp(&b.domain)));
    for (index, stat) in stats.iter_mut().enumerate() {
        stat.rank = index as u32 + 1;
    }
    stats
}

/// Turn a label -> count map into (label, count, percentage) rows sorted by
/// count descending, label ascending on ties. Percentages are computed
/// against `denominator`, the number of records that fed this family.
fn build_share_stats(counts: HashMap<String, u32>, denominator: u32) -> Vec<(String, u32, f64)> {
    let mut rows: Vec<(String, u32)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows.into_iter()
        .map(|(label, count)| {
            let percentage = if denominator == 0 {
                0.0
            } else {
                count as f64 / denominator as f64 * 100.0
            };
            (label, count, percentage)
        })
        .collect()
}

fn build_daily_stats(days: HashMap<NaiveDate, (u32, HashMap<String, u32>)>) -> Vec<DailyStat> {
    let mut stats: Vec<DailyStat> = days
        .into_iter()
        .map(|(date, (visits, domain_counts))| {
            let mut top_sites: Vec<TopSite> = domain_counts
                .into_iter()
                .map(|(domain, visits)| TopSite { domain, visits })
                .collect();
            top_sites
                .sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.domain.cmp(&b.domain)));
            top_sites.truncate(DAILY_TOP_SITES);

            DailyStat {
                date,
                visits,
                top_sites,
            }
        })
        .collect();

    stats.sort_by_key(|stat| stat.date);
    stats
}

fn build_top_videos(views: HashMap<String, u32>) -> Vec<TopVideo> {
    let mut videos: Vec<TopVideo> = views
        .into_iter()
        .map(|(title, views)| TopVideo { title, views })
        .collect();
    videos.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.title.cmp(&b.title)));
    videos.truncate(TOP_VIDEOS);
    videos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{load_category_rules, load_video_rules};
    use crate::stats::ExclusionReason;

    fn engine() -> Engine {
        Engine::new(
            load_category_rules(None).unwrap(),
            load_video_rules(None).unwrap(),
        )
        .unwrap()
    }

    fn record(date_time: &str, url: &str, title: &str) -> BrowsingRecord {
        BrowsingRecord::new(date_time, url, title)
    }

    #[test]
    fn empty_input_yields_zero_snapshot() {
        let result = engine().analyze(&[]);
        assert_eq!(result.total_visits, 0);
        assert_eq!(result.unique_domains, 0);
        assert!(result.domain_stats.is_empty());
        assert!(result.category_stats.is_empty());
        assert_eq!(result.time_stats.len(), 24);
        assert!(result.time_stats.iter().all(|t| t.visits == 0));
        assert!(result.daily_stats.is_empty());
        assert!(result.video_categories.is_empty());
        assert!(result.media_stats.movies.is_empty());
        assert!(result.media_stats.anime.is_empty());
        assert!(result.media_stats.top_videos.is_empty());
    }

    #[test]
    fn basic_aggregation_example() {
        let records = vec![
            record("2024-01-01 10:00", "https://a.com/x", "A"),
            record("2024-01-01 10:30", "https://a.com/y", "A2"),
            record("2024-01-02 09:00", "https://b.com", "B"),
        ];
        let result = engine().analyze(&records);

        assert_eq!(result.total_visits, 3);
        assert_eq!(result.unique_domains, 2);

        assert_eq!(result.domain_stats[0].domain, "a.com");
        assert_eq!(result.domain_stats[0].visits, 2);
        assert_eq!(result.domain_stats[0].rank, 1);
        assert_eq!(result.domain_stats[1].domain, "b.com");
        assert_eq!(result.domain_stats[1].visits, 1);
        assert_eq!(result.domain_stats[1].rank, 2);

        assert_eq!(result.time_stats[10].visits, 2);
        assert_eq!(result.time_stats[9].visits, 1);

        assert_eq!(result.daily_stats.len(), 2);
        assert_eq!(result.daily_stats[0].visits, 2);
        assert_eq!(result.daily_stats[0].top_sites[0].domain, "a.com");
    }

    #[test]
    fn malformed_url_counts_toward_total_only() {
        let records = vec![
            record("2024-01-01 10:00", "not a url", "Broken"),
            record("2024-01-01 11:00", "https://a.com", "A"),
        ];
        let (result, issues) = engine().analyze_with_diagnostics(&records);

        assert_eq!(result.total_visits, 2);
        assert_eq!(result.unique_domains, 1);
        assert_eq!(result.domain_stats.len(), 1);
        let category_total: u32 = result.category_stats.iter().map(|c| c.count).sum();
        assert_eq!(category_total, 1);
        // The malformed record still feeds time stats
        assert_eq!(result.time_stats[10].visits, 1);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].reason, ExclusionReason::MalformedUrl);
    }

    #[test]
    fn unparseable_timestamp_is_excluded_from_time_aggregates_only() {
        let records = vec![
            record("sometime last year", "https://a.com", "A"),
            record("2024-01-01 10:00", "https://a.com", "A"),
        ];
        let (result, issues) = engine().analyze_with_diagnostics(&records);

        assert_eq!(result.total_visits, 2);
        assert_eq!(result.domain_stats[0].visits, 2);
        let time_total: u32 = result.time_stats.iter().map(|t| t.visits).sum();
        assert_eq!(time_total, 1);
        assert_eq!(result.daily_stats.len(), 1);
        assert_eq!(result.daily_stats[0].visits, 1);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].reason, ExclusionReason::UnparseableTimestamp);
    }

    #[test]
    fn domain_visit_sum_never_exceeds_total() {
        let records = vec![
            record("2024-01-01 10:00", "https://a.com", "A"),
            record("2024-01-01 10:05", "garbage", "G"),
            record("2024-01-01 10:10", "https://b.com", "B"),
        ];
        let result = engine().analyze(&records);
        let domain_total: u32 = result.domain_stats.iter().map(|d| d.visits).sum();
        assert!(domain_total <= result.total_visits);
        assert_eq!(domain_total, 2);
    }

    #[test]
    fn category_percentages_sum_to_one_hundred() {
        let records = vec![
            record("2024-01-01 10:00", "https://github.com/pulls", "Pulls"),
            record("2024-01-01 11:00", "https://reddit.com/r/rust", "Rust"),
            record("2024-01-01 12:00", "https://unknown.example", "X"),
        ];
        let result = engine().analyze(&records);
        let percentage_total: f64 = result.category_stats.iter().map(|c| c.percentage).sum();
        assert!((percentage_total - 100.0).abs() < 1e-9);

        let count_total: u32 = result.category_stats.iter().map(|c| c.count).sum();
        assert_eq!(count_total, 3);
    }

    #[test]
    fn equal_visit_counts_order_domains_lexicographically() {
        let records = vec![
            record("2024-01-01 10:00", "https://zebra.com", "Z"),
            record("2024-01-01 10:01", "https://apple.com", "A"),
            record("2024-01-01 10:02", "https://mango.com", "M"),
        ];
        let result = engine().analyze(&records);
        let order: Vec<&str> = result
            .domain_stats
            .iter()
            .map(|d| d.domain.as_str())
            .collect();
        assert_eq!(order, ["apple.com", "mango.com", "zebra.com"]);
    }

    #[test]
    fn last_visited_is_the_latest_parseable_timestamp() {
        let records = vec![
            record("2024-03-05 08:00", "https://a.com", "A"),
            record("2024-01-01 10:00", "https://a.com", "A"),
        ];
        let result = engine().analyze(&records);
        assert_eq!(
            result.domain_stats[0].last_visited,
            parse_timestamp("2024-03-05 08:00")
        );
    }

    #[test]
    fn daily_top_sites_are_capped_and_ordered() {
        let mut records = Vec::new();
        for domain in ["a.com", "b.com", "c.com", "d.com", "e.com", "f.com"] {
            records.push(record(
                "2024-06-01 12:00",
                &format!("https://{domain}/page"),
                domain,
            ));
        }
        records.push(record("2024-06-01 13:00", "https://f.com/again", "f"));

        let result = engine().analyze(&records);
        assert_eq!(result.daily_stats.len(), 1);
        let top_sites = &result.daily_stats[0].top_sites;
        assert_eq!(top_sites.len(), 5);
        assert_eq!(top_sites[0].domain, "f.com");
        assert_eq!(top_sites[0].visits, 2);
        assert_eq!(top_sites[1].domain, "a.com");
    }

    #[test]
    fn video_records_feed_video_aggregates() {
        let records = vec![
            record(
                "2024-01-01 20:00",
                "https://www.youtube.com/watch?v=x1",
                "Factorio gameplay part 1 - YouTube",
            ),
            record(
                "2024-01-02 20:00",
                "https://www.youtube.com/watch?v=x1",
                "Factorio gameplay part 1 - YouTube",
            ),
            record(
                "2024-01-03 21:00",
                "https://www.youtube.com/watch?v=x2",
                "Song lyrics compilation - YouTube",
            ),
            record("2024-01-03 22:00", "https://github.com", "Not a video"),
        ];
        let result = engine().analyze(&records);

        let gaming = result
            .video_categories
            .iter()
            .find(|v| v.category == "Gaming")
            .unwrap();
        assert_eq!(gaming.count, 2);
        let percentage_total: f64 = result.video_categories.iter().map(|v| v.percentage).sum();
        assert!((percentage_total - 100.0).abs() < 1e-9);

        assert_eq!(result.media_stats.top_videos[0].title, "Factorio gameplay part 1");
        assert_eq!(result.media_stats.top_videos[0].views, 2);
    }

    #[test]
    fn movies_and_anime_are_distinct_in_first_seen_order() {
        let records = vec![
            record(
                "2024-01-01 20:00",
                "https://www.netflix.com/watch/1",
                "Interstellar",
            ),
            record(
                "2024-01-02 20:00",
                "https://www.crunchyroll.com/watch/2",
                "Frieren Episode 1",
            ),
            record(
                "2024-01-03 20:00",
                "https://www.netflix.com/watch/1",
                "Interstellar",
            ),
            record(
                "2024-01-04 20:00",
                "https://www.netflix.com/watch/3",
                "Dune",
            ),
        ];
        let result = engine().analyze(&records);
        assert_eq!(result.media_stats.movies, ["Interstellar", "Dune"]);
        assert_eq!(result.media_stats.anime, ["Frieren Episode 1"]);
    }

    #[test]
    fn analysis_is_idempotent() {
        let records = vec![
            record("2024-01-01 10:00", "https://a.com/x", "A"),
            record("2024-01-01 10:30", "bad url", "B"),
            record(
                "2024-01-02 20:00",
                "https://youtu.be/x9",
                "How to solder - YouTube",
            ),
        ];
        let e = engine();
        assert_eq!(e.analyze(&records), e.analyze(&records));
    }

    #[test]
    fn rfc3339_timestamps_parse() {
        assert!(parse_timestamp("2024-01-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-01-01 10:00:00").is_some());
        assert!(parse_timestamp("1/31/2024 22:15").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
