use clap::Parser;
use landed_cost::config::cli::Command;
use landed_cost::core::packing::pack_with_policy;
use landed_cost::core::report::render_packing;
use landed_cost::core::tariff::{lookup_duty_rate, suggest_codes};
use landed_cost::domain::ports::Storage;
use landed_cost::utils::{logger, validation::Validate};
use landed_cost::{
    CliArgs, ComparisonConfig, ComparisonEngine, CsvTariffTable, LandedCostError, LocalStorage,
    ReportFormat, Result, ShipsmartClient,
};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting landed-cost CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = run(&args).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn load_config(args: &CliArgs) -> Result<ComparisonConfig> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            ComparisonConfig::from_file(path)?
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            ComparisonConfig::default()
        }
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(args: &CliArgs) -> Result<()> {
    let config = load_config(args)?;
    let format = config.output.format;

    match &args.command {
        Command::Pack { .. } => {
            let plan = pack_with_policy(
                &config.item,
                &config.master_box,
                config.packing.oversize_policy,
            )?;
            emit(&config, "packing", &render_packing(&plan, format)?).await
        }
        Command::Tariff { prefix } => {
            let tables = config
                .tariff
                .as_ref()
                .ok_or_else(|| LandedCostError::MissingConfigError {
                    field: "tariff".to_string(),
                })?;
            let table = CsvTariffTable::from_files(&tables.origin_table, &tables.destination_table)?;

            let matches = suggest_codes(&table, prefix)?;
            if matches.is_empty() {
                println!("No classification codes start with {}", prefix);
                return Ok(());
            }
            for m in &matches {
                println!("{} - {}", m.code, m.description);
            }
            let chosen = &matches[0];
            match lookup_duty_rate(&table, &chosen.code) {
                Ok(rate) => println!("\nDuty rate for {}: {}", chosen.code, rate),
                Err(e @ LandedCostError::LookupUnavailable { .. }) => {
                    println!("\nDuty rate for {}: not available ({}), 0 will be used", chosen.code, e)
                }
                Err(e) => return Err(e),
            }
            Ok(())
        }
        Command::Compare { .. } => {
            config.require_api_key()?;
            let client = ShipsmartClient::new(config.freight.clone())?;
            let mut engine = ComparisonEngine::new(client);
            if let Some(tables) = &config.tariff {
                engine = engine.with_tariff(CsvTariffTable::from_files(
                    &tables.origin_table,
                    &tables.destination_table,
                )?);
            }

            let report = engine.run(config.comparison_input()).await?;
            tracing::info!("✅ Comparison completed, cheaper: {}", report.cheaper);
            emit(&config, "comparison", &report.render(format)?).await
        }
    }
}

async fn emit(config: &ComparisonConfig, stem: &str, content: &str) -> Result<()> {
    match &config.output.directory {
        Some(directory) => {
            let extension = match config.output.format {
                ReportFormat::Table => "txt",
                ReportFormat::Json => "json",
                ReportFormat::Csv => "csv",
            };
            let storage = LocalStorage::new(directory.clone());
            let path = storage
                .write_file(&format!("{}.{}", stem, extension), content.as_bytes())
                .await?;
            println!("📁 Report saved to: {}", path);
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
