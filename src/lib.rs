pub mod args;
pub mod categories;
pub mod domain;
pub mod engine;
pub mod ingest;
pub mod media;
pub mod record;
pub mod report;
pub mod rules;
pub mod select;
pub mod stats;
pub mod utils;

pub use args::Args;
pub use engine::Engine;
pub use record::BrowsingRecord;
pub use rules::{init_default_rules, load_category_rules, load_video_rules, RuleTable};
pub use stats::AnalyticsResult;
