use anyhow::Result;
use clap::Parser;
use policyproof::cli::{Cli, OutputFormat};
use policyproof::criteria::CriteriaConfig;
use policyproof::experiment::{run_experiment, ExperimentLogs};
use policyproof::report;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Resolve the criteria table from --criteria and --max-diversion
fn load_criteria(args: &Cli) -> Result<CriteriaConfig> {
    let mut config = match &args.criteria {
        Some(path) => CriteriaConfig::from_file(path)?,
        None => CriteriaConfig::default(),
    };

    if let Some(rate) = args.max_diversion {
        config = config.with_max_diversion_rate(rate);
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
    }

    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_criteria(&args)?;
    tracing::debug!(
        targets = config.targets.len(),
        max_diversion_rate = config.max_diversion_rate,
        "criteria loaded"
    );

    let logs = ExperimentLogs {
        baseline_app: args.baseline_app.clone(),
        policy_app: args.policy_app.clone(),
        policy_router: args.policy_router.clone(),
    };
    let analysis = run_experiment(&logs, &config)?;

    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(&analysis)),
        OutputFormat::Json => println!("{}", report::render_json(&analysis)?),
    }

    if args.fail_on_criteria && !analysis.assessment.verdict.is_pass() {
        std::process::exit(1);
    }

    Ok(())
}
