use std::error::Error;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use lewas_service::config::{self, ServiceConfig};
use lewas_service::ingest::lewas::LewasApiClient;
use lewas_service::logging::{self, Component};
use lewas_service::model::MeasurementSystem;
use lewas_service::parameters::{self, Category, ParameterType};
use lewas_service::series::{self, LoadOptions, TimeRange};
use lewas_service::verify;

#[derive(Parser, Debug)]
#[command(author, version, about = "LEWAS creek monitoring data service", long_about = None)]
struct Cli {
    /// Path to the TOML config (defaults to $LEWAS_CONFIG, then ./lewas.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, process and print chart series as JSON
    Series(SeriesArgs),
    /// List every chartable parameter
    Parameters(ParametersArgs),
    /// Check which parameters the observation API is currently serving
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct SeriesArgs {
    /// Parameter keys, e.g. stage flow_rate_rating_curve air_temperature
    #[arg(required = true)]
    parameters: Vec<ParameterType>,
    /// Look-back window: 1day, 3days, 6days or 12days
    #[arg(long)]
    range: Option<TimeRange>,
    /// Unit system: SI or US
    #[arg(long)]
    units: Option<MeasurementSystem>,
    /// Drop points more than this many standard deviations from the mean
    #[arg(long)]
    outliers: Option<f64>,
}

#[derive(Args, Debug)]
struct ParametersArgs {
    /// Unit system used for the labels
    #[arg(long)]
    units: Option<MeasurementSystem>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Look-back window probed for each parameter
    #[arg(long)]
    range: Option<TimeRange>,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    logging::init_logger(
        config.logging.min_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    match cli.command {
        Command::Series(args) => handle_series(&config, args),
        Command::Parameters(args) => handle_parameters(&config, args),
        Command::Verify(args) => handle_verify(&config, args),
    }
}

fn handle_series(config: &ServiceConfig, args: SeriesArgs) -> Result<(), Box<dyn Error>> {
    let client = LewasApiClient::new(&config.api)?;

    let mut options = LoadOptions::from_config(config);
    if let Some(units) = args.units {
        options.system = units;
    }
    if let Some(threshold) = args.outliers {
        options.outlier_threshold = Some(threshold);
    }

    let range = args.range.unwrap_or(config.display.time_range);
    let window = range.window(Utc::now());
    logging::info(
        Component::System,
        None,
        &format!(
            "Loading {} parameter(s) from {} to {} in {} units",
            args.parameters.len(),
            window.start.to_rfc3339(),
            window.end.to_rfc3339(),
            options.system
        ),
    );

    let chart = series::load_chart_series(&client, &args.parameters, window, &options);
    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(())
}

fn handle_parameters(config: &ServiceConfig, args: ParametersArgs) -> Result<(), Box<dyn Error>> {
    let system = args.units.unwrap_or(config.display.unit_system);

    for category in [Category::WaterQuantity, Category::WaterQuality, Category::Weather] {
        println!("{}", category);
        for parameter in parameters::parameters_in_category(category) {
            let info = parameter.info();
            println!(
                "  {:<24} {:<32} {}/{}/{}",
                info.key,
                parameter.label(system),
                info.instrument,
                info.medium,
                info.metric
            );
        }
    }
    Ok(())
}

fn handle_verify(config: &ServiceConfig, args: VerifyArgs) -> Result<(), Box<dyn Error>> {
    let client = LewasApiClient::new(&config.api)?;
    let now = Utc::now();
    let window = args.range.unwrap_or(config.display.time_range).window(now);

    let report = verify::verify_parameters(&client, window, now);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let summary = &report.summary;
    let message = format!(
        "Verification complete: {}/{} working, {} partial, {} failed",
        summary.working, summary.total, summary.partial, summary.failed
    );
    if summary.failed == 0 {
        logging::info(Component::System, None, &message);
    } else {
        logging::warn(Component::System, None, &message);
    }
    Ok(())
}
