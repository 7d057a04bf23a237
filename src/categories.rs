use crate::rules::{RuleTable, OTHER_CATEGORY};

/// Map a normalized domain to a category label using an ordered rule table.
/// The first rule with a matching pattern wins; unmatched domains land in
/// the "Other" catch-all, so every domain maps to exactly one category.
pub fn categorize(domain: &str, rules: &RuleTable) -> String {
    rules
        .match_label(domain)
        .unwrap_or(OTHER_CATEGORY)
        .to_string()
}
