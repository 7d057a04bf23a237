use crate::stats::{AnalyticsResult, DomainStat, TimeStat};

/// First `n` entries of the already-ranked domain list.
pub fn top_domains(result: &AnalyticsResult, n: usize) -> &[DomainStat] {
    &result.domain_stats[..n.min(result.domain_stats.len())]
}

/// Domains visited exactly once, in domain-stats order, capped to `limit`.
pub fn hidden_gems(result: &AnalyticsResult, limit: usize) -> Vec<&DomainStat> {
    result
        .domain_stats
        .iter()
        .filter(|stat| stat.visits == 1)
        .take(limit)
        .collect()
}

/// The hour bucket with the most visits; the lowest hour wins ties.
pub fn peak_hour(result: &AnalyticsResult) -> Option<TimeStat> {
    result
        .time_stats
        .iter()
        .copied()
        .max_by_key(|stat| (stat.visits, std::cmp::Reverse(stat.hour)))
}
