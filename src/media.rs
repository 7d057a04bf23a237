//! Video and media classification: detecting video-hosting URLs, extracting
//! platform video identifiers, and sorting watched titles into categories.

use anyhow::Result;
use regex::Regex;
use url::Url;

use crate::rules::{RuleTable, OTHER_CATEGORY};

/// What a video record classified as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoClassification {
    pub category: String,
    pub cleaned_title: String,
    pub video_id: Option<String>,
}

/// Title-level media kind for the movies / anime shelves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Anime,
}

/// Whether the URL points at a recognized video-hosting watch page.
pub fn is_video_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);

    match host {
        "youtu.be" => parsed.path().len() > 1,
        "youtube.com" | "m.youtube.com" | "netflix.com" | "crunchyroll.com" => {
            parsed.path().starts_with("/watch")
        }
        _ => false,
    }
}

/// Extract the platform video identifier from a watch URL: the `v` query
/// parameter on youtube.com, the first path segment on youtu.be. `None` means
/// "not a recognized video link", not an error.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    match host {
        "youtube.com" | "m.youtube.com" if parsed.path().starts_with("/watch") => parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_string()),
        _ => None,
    }
}

/// Compiled media classifier: ordered title rules plus the fixed title-noise
/// and media-kind patterns.
#[derive(Debug)]
pub struct MediaClassifier {
    video_rules: RuleTable,
    suffix_noise: Regex,
    movie_patterns: Vec<Regex>,
    anime_patterns: Vec<Regex>,
}

impl MediaClassifier {
    pub fn new(video_rules: RuleTable) -> Result<Self> {
        Ok(Self {
            video_rules,
            suffix_noise: Regex::new(r"(?i)\s*[-|]\s*(YouTube|Netflix|Crunchyroll)\s*$")?,
            movie_patterns: vec![
                Regex::new(r"(?i)\b(official trailer|full movie)\b")?,
                Regex::new(r"(?i)\b(movie|film)\b")?,
            ],
            anime_patterns: vec![
                Regex::new(r"(?i)\banime\b")?,
                Regex::new(r"(?i)\bepisode\s*\d+")?,
                Regex::new(r"(?i)\bs\d+\s*e\d+\b")?,
            ],
        })
    }

    /// Classify one video record by title, extracting the platform id from
    /// the URL when there is one.
    pub fn classify(&self, title: &str, url: &str) -> VideoClassification {
        let cleaned_title = self.clean_title(title);
        let category = self
            .video_rules
            .match_label(&cleaned_title)
            .unwrap_or(OTHER_CATEGORY)
            .to_string();

        VideoClassification {
            category,
            cleaned_title,
            video_id: extract_video_id(url),
        }
    }

    /// Strip trailing platform-name suffix noise and surrounding whitespace.
    pub fn clean_title(&self, title: &str) -> String {
        self.suffix_noise.replace(title, "").trim().to_string()
    }

    /// Whether the title (and the domain it was watched on) marks the record
    /// as a movie or anime. Anime signals take precedence so a Crunchyroll
    /// "movie" episode still shelves as anime.
    pub fn media_kind(&self, title: &str, domain: Option<&str>) -> Option<MediaKind> {
        if matches!(domain, Some("crunchyroll.com") | Some("funimation.com"))
            || self.anime_patterns.iter().any(|p| p.is_match(title))
        {
            return Some(MediaKind::Anime);
        }
        if matches!(domain, Some("netflix.com"))
            || self.movie_patterns.iter().any(|p| p.is_match(title))
        {
            return Some(MediaKind::Movie);
        }
        None
    }
}
