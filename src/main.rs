use clap::Parser;
use realtyscout::application::detector::find_undervalued_with;
use realtyscout::application::market_stats::DEFAULT_IQR_FACTOR;
use realtyscout::application::scorer;
use realtyscout::cli::commands::{parse_confidence, parse_since, Cli, Commands};
use realtyscout::config::ScoutConfig;
use realtyscout::domain::ports::alert_store::AlertFilter;
use realtyscout::domain::ports::listing_provider::ListingProvider;
use realtyscout::infrastructure::listings::json_file::JsonFileProvider;
use realtyscout::RealtyScout;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ScoutConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_command(config, cli.command).await {
        tracing::error!("command failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn scout_for(config: ScoutConfig, listings: Option<&str>) -> Result<RealtyScout, Box<dyn std::error::Error>> {
    let scout = match listings {
        Some(path) => {
            let provider: Arc<dyn ListingProvider> = Arc::new(JsonFileProvider::new(path));
            RealtyScout::with_provider(config, provider)?
        }
        None => RealtyScout::new(config)?,
    };
    Ok(scout)
}

async fn run_command(mut config: ScoutConfig, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Scan {
            listings,
            city,
            limit,
        } => {
            if let Some(limit) = limit {
                config.max_opportunities = limit;
            }
            let records = JsonFileProvider::new(&listings).load_all().await?;
            let opportunities = find_undervalued_with(&records, &city, &config.detector_config());
            println!("{}", serde_json::to_string_pretty(&opportunities)?);
        }
        Commands::Score {
            discount,
            confidence,
        } => {
            let tier = parse_confidence(&confidence)?;
            println!("{}", scorer::score(discount, tier));
        }
        Commands::Alert {
            city,
            property_type,
            listings,
        } => {
            let scout = scout_for(config, listings.as_deref())?;
            let outcome = scout
                .generate_city_alert_detailed(&city, &property_type)
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Alerts {
            city,
            today,
            since,
            limit,
        } => {
            let scout = scout_for(config, None)?;
            match (today, city) {
                (true, Some(city)) => {
                    let status = scout.daily_status(&city)?;
                    println!("{}", serde_json::to_string_pretty(&status)?);
                }
                (_, city) => {
                    let since = since.as_deref().map(parse_since).transpose()?;
                    let alerts = scout.alert_history(&AlertFilter {
                        city,
                        since,
                        limit: Some(limit),
                    })?;
                    println!("{}", serde_json::to_string_pretty(&alerts)?);
                }
            }
        }
        Commands::Stats {
            listings,
            city,
            filter_outliers,
        } => {
            let scout = scout_for(config, Some(&listings))?;
            let factor = filter_outliers.then_some(DEFAULT_IQR_FACTOR);
            let summary = scout.market_summary(&city, "", factor).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
