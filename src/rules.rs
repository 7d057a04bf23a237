use anyhow::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

// Include default rule tables at compile time
const DEFAULT_CATEGORY_RULES: &str = include_str!("../default_category_rules.txt");
const DEFAULT_VIDEO_RULES: &str = include_str!("../default_video_rules.txt");

pub const OTHER_CATEGORY: &str = "Other";

/// One classification rule: a label and the patterns that map onto it.
#[derive(Debug)]
pub struct Rule {
    pub label: String,
    pub patterns: Vec<Regex>,
}

/// An ordered rule table evaluated top to bottom, first match wins.
///
/// The table is configuration data, not logic: it is parsed from a plain-text
/// `Label: regex` format so deployments can swap in their own taxonomy while
/// keeping the matching semantics.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Parse a rule table, failing on the first invalid line. Used for rule
    /// files the user pointed at explicitly.
    pub fn parse(content: &str) -> Result<Self> {
        let mut table = RuleTable::default();
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (label, pattern) = split_rule_line(line)
                .ok_or_else(|| anyhow::anyhow!("Missing ':' separator at line {}", line_num + 1))?;
            match Regex::new(pattern) {
                Ok(regex) => table.push(label, regex),
                Err(e) => anyhow::bail!("Invalid regex pattern at line {}: {}", line_num + 1, e),
            }
        }
        Ok(table)
    }

    /// Parse a rule table, skipping invalid lines with a warning. Used for
    /// working-directory defaults and the embedded tables.
    pub fn parse_lossy(content: &str, component: &'static str) -> Self {
        let mut table = RuleTable::default();
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((label, pattern)) = split_rule_line(line) else {
                warn!(action = "parse", component = component, line_number = line_num + 1, "Missing ':' separator in rule line");
                continue;
            };
            match Regex::new(pattern) {
                Ok(regex) => table.push(label, regex),
                Err(e) => {
                    warn!(action = "parse", component = component, line_number = line_num + 1, error = %e, "Invalid regex pattern")
                }
            }
        }
        table
    }

    fn push(&mut self, label: &str, pattern: Regex) {
        // Repeated labels extend the existing rule; first-appearance order is
        // what first-match-wins evaluates in.
        if let Some(rule) = self.rules.iter_mut().find(|r| r.label == label) {
            rule.patterns.push(pattern);
        } else {
            self.rules.push(Rule {
                label: label.to_string(),
                patterns: vec![pattern],
            });
        }
    }

    /// First rule with any pattern matching `text`, or `None`.
    pub fn match_label(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.patterns.iter().any(|p| p.is_match(text)))
            .map(|rule| rule.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn split_rule_line(line: &str) -> Option<(&str, &str)> {
    let (label, pattern) = line.split_once(':')?;
    let label = label.trim();
    let pattern = pattern.trim();
    if label.is_empty() || pattern.is_empty() {
        return None;
    }
    Some((label, pattern))
}

pub fn load_category_rules(rule_file_path: Option<&Path>) -> Result<RuleTable> {
    load_rule_table(
        rule_file_path,
        Path::new("category_rules.txt"),
        DEFAULT_CATEGORY_RULES,
        "category_rules",
    )
}

pub fn load_video_rules(rule_file_path: Option<&Path>) -> Result<RuleTable> {
    load_rule_table(
        rule_file_path,
        Path::new("video_rules.txt"),
        DEFAULT_VIDEO_RULES,
        "video_rules",
    )
}

fn load_rule_table(
    rule_file_path: Option<&Path>,
    default_file: &Path,
    embedded: &str,
    component: &'static str,
) -> Result<RuleTable> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = component,
        "Starting rule table loading"
    );

    let table = if let Some(path) = rule_file_path {
        info!(action = "load", component = component, file_path = ?path, "Loading rules from specified file");
        if !path.exists() {
            anyhow::bail!("Rule file not found: {:?}", path);
        }
        let content = fs::read_to_string(path)?;
        let table = RuleTable::parse(&content)?;
        info!(action = "loaded", component = component, rule_count = table.len(), file_path = ?path, "Loaded rules from file");
        table
    } else if default_file.exists() {
        info!(action = "load", component = component, file_path = ?default_file, "Loading rules from default file");
        let content = fs::read_to_string(default_file)?;
        let table = RuleTable::parse_lossy(&content, component);
        info!(action = "loaded", component = component, rule_count = table.len(), file_path = ?default_file, "Loaded rules from default file");
        table
    } else {
        info!(
            action = "load",
            component = component,
            "Using embedded default rules"
        );
        RuleTable::parse_lossy(embedded, component)
    };

    let load_time = start_time.elapsed();
    info!(
        action = "complete",
        component = component,
        rule_count = table.len(),
        duration_ms = load_time.as_millis(),
        "Successfully compiled rule table"
    );
    Ok(table)
}

/// Write both default rule files into the working directory for editing.
pub fn init_default_rules() -> Result<()> {
    for (file, content) in [
        (Path::new("category_rules.txt"), DEFAULT_CATEGORY_RULES),
        (Path::new("video_rules.txt"), DEFAULT_VIDEO_RULES),
    ] {
        if file.exists() {
            anyhow::bail!(
                "{} already exists. Remove it first if you want to reinitialize.",
                file.display()
            );
        }
        fs::write(file, content)?;
        println!("Created {} with default rules", file.display());
    }

    Ok(())
}
