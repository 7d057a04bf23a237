use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::record::BrowsingRecord;

pub const HOURS_PER_DAY: usize = 24;

/// Visit statistics for one normalized domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStat {
    pub domain: String,
    pub visits: u32,
    /// 1-based position when sorted by visits descending.
    pub rank: u32,
    pub last_visited: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: String,
    pub count: u32,
    /// Share of records that had an extractable domain, in percent.
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStat {
    pub hour: u32,
    pub visits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSite {
    pub domain: String,
    pub visits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub visits: u32,
    pub top_sites: Vec<TopSite>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStat {
    pub category: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopVideo {
    pub title: String,
    pub views: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStats {
    pub movies: Vec<String>,
    pub anime: Vec<String>,
    pub top_videos: Vec<TopVideo>,
}

/// The immutable snapshot one engine invocation produces. A fresh upload
/// replaces the previous snapshot wholesale; nothing is ever merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub total_visits: u32,
    pub unique_domains: u32,
    pub domain_stats: Vec<DomainStat>,
    pub category_stats: Vec<CategoryStat>,
    /// Always exactly 24 entries, hour 0 through 23.
    pub time_stats: Vec<TimeStat>,
    pub daily_stats: Vec<DailyStat>,
    pub video_categories: Vec<VideoStat>,
    pub media_stats: MediaStats,
}

impl AnalyticsResult {
    /// The zero-valued snapshot an empty input list produces.
    pub fn empty() -> Self {
        Self {
            total_visits: 0,
            unique_domains: 0,
            domain_stats: Vec::new(),
            category_stats: Vec::new(),
            time_stats: (0..HOURS_PER_DAY as u32)
                .map(|hour| TimeStat { hour, visits: 0 })
                .collect(),
            daily_stats: Vec::new(),
            video_categories: Vec::new(),
            media_stats: MediaStats::default(),
        }
    }
}

/// Why a record was left out of one family of aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExclusionReason {
    /// URL did not parse; excluded from domain and category aggregates.
    MalformedUrl,
    /// Timestamp did not parse; excluded from time and daily aggregates.
    UnparseableTimestamp,
}

/// Per-record diagnostic reported through the engine's side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIssue {
    pub record: BrowsingRecord,
    pub reason: ExclusionReason,
}
