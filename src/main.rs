use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use browsing_insights::{
    args::Args, engine::Engine, ingest, report, rules, utils,
};

fn run(args: &Args) -> Result<()> {
    let input = args
        .input
        .as_ref()
        .context("No history export path given")?;

    let records = ingest::load_history(input)?;

    let engine = Engine::new(
        rules::load_category_rules(args.categories.as_deref())?,
        rules::load_video_rules(args.video_rules.as_deref())?,
    )?;
    let (result, issues) = engine.analyze_with_diagnostics(&records);

    if args.json {
        report::print_json(&result)?;
    } else {
        report::print_report(&result, &issues, args);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    if args.init {
        return rules::init_default_rules();
    }

    let workers = args.workers.unwrap_or_else(|| num_cpus::get().min(8));
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .context("Failed to configure worker pool")?;

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
