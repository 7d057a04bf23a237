use anyhow::Result;

use crate::args::Args;
use crate::select;
use crate::stats::{AnalyticsResult, ExclusionReason, RecordIssue};
use crate::utils::format_number;

pub fn print_json(result: &AnalyticsResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

pub fn print_report(result: &AnalyticsResult, issues: &[RecordIssue], args: &Args) {
    println!("\n--- Your Year in Browsing ---");
    println!(
        "Total visits: {} across {} unique websites",
        format_number(result.total_visits),
        format_number(result.unique_domains)
    );

    if let Some(first) = result.daily_stats.first() {
        if let Some(last) = result.daily_stats.last() {
            println!(
                "Date range: {} to {} ({} active days)",
                first.date,
                last.date,
                format_number(result.daily_stats.len() as u32)
            );
        }
    }

    let top = select::top_domains(result, args.top);
    if !top.is_empty() {
        println!("\nTop {} destinations:", top.len());
        for stat in top {
            let last_visited = stat
                .last_visited
                .map(|ts| ts.format(" (last visited %Y-%m-%d)").to_string())
                .unwrap_or_default();
            println!(
                "{:>4}. {}: {} visits{}",
                stat.rank,
                stat.domain,
                format_number(stat.visits),
                last_visited
            );
        }
    }

    if !result.category_stats.is_empty() {
        println!("\nYour internet universe:");
        for stat in &result.category_stats {
            println!(
                "- {}: {} visits ({:.1}%)",
                stat.category,
                format_number(stat.count),
                stat.percentage
            );
        }
    }

    if let Some(peak) = select::peak_hour(result) {
        if peak.visits > 0 {
            println!(
                "\nPeak hour: {:02}:00-{:02}:00 with {} visits",
                peak.hour,
                (peak.hour + 1) % 24,
                format_number(peak.visits)
            );
        }
    }

    if args.daily && !result.daily_stats.is_empty() {
        println!("\nDay by day:");
        for day in &result.daily_stats {
            let top_sites: Vec<String> = day
                .top_sites
                .iter()
                .map(|site| format!("{} ({})", site.domain, site.visits))
                .collect();
            println!(
                "- {}: {} visits | {}",
                day.date,
                format_number(day.visits),
                top_sites.join(", ")
            );
        }
    }

    let gems = select::hidden_gems(result, args.gems);
    if !gems.is_empty() {
        println!("\nHidden gems (visited just once):");
        for gem in gems {
            println!("- {}", gem.domain);
        }
    }

    print_media(result);

    if args.show_excluded && !issues.is_empty() {
        println!("\nExcluded records:");
        for issue in issues {
            let reason = match issue.reason {
                ExclusionReason::MalformedUrl => "malformed URL",
                ExclusionReason::UnparseableTimestamp => "unparseable timestamp",
            };
            println!("- {} [{}]", issue.record.navigated_to_url, reason);
        }
    }
}

fn print_media(result: &AnalyticsResult) {
    if !result.video_categories.is_empty() {
        println!("\nVideo categories you love:");
        for stat in &result.video_categories {
            println!(
                "- {}: {} videos ({:.0}%)",
                stat.category,
                format_number(stat.count),
                stat.percentage
            );
        }
    }

    if !result.media_stats.top_videos.is_empty() {
        println!("\nMost watched videos:");
        for video in &result.media_stats.top_videos {
            println!("- {} ({} views)", video.title, format_number(video.views));
        }
    }

    if !result.media_stats.movies.is_empty() {
        println!("\nMovies watched:");
        for movie in &result.media_stats.movies {
            println!("- {}", movie);
        }
    }

    if !result.media_stats.anime.is_empty() {
        println!("\nAnime watched:");
        for title in &result.media_stats.anime {
            println!("- {}", title);
        }
    }
}
