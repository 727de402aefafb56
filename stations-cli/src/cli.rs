use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, validator::Validation};
use std::sync::Arc;
use tracing::debug;

use stations_core::{
    Config, CoverageReport, HttpClient, ParaglidingEarthLookup, ProviderId, ReqwestHttpClient,
    StationProvider, config::SITE_LOOKUP_ENDPOINT, provider::provider_from_config,
    providers_from_config, resolve_target, survey,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "stations",
    version,
    about = "Compare which weather-station providers cover a site"
)]
pub struct Cli {
    /// Log provider requests and outcomes to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the FFVL API key and default search radius.
    Configure,

    /// List stations near a site and which providers report them.
    Check {
        /// Paragliding site name, or literal coordinates "LAT,LON".
        #[arg(allow_hyphen_values = true)]
        target: String,

        /// Display name when TARGET is literal coordinates.
        name: Option<String>,

        /// Search radius in km; defaults to the configured radius.
        #[arg(long)]
        radius: Option<f64>,

        /// Only query this provider (repeatable): ffvl, pioupiou, metar, nws, bom.
        #[arg(long = "provider", value_parser = parse_provider)]
        providers: Vec<ProviderId>,

        /// Print the survey as JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },
}

fn parse_provider(value: &str) -> Result<ProviderId, String> {
    ProviderId::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Check { target, name, radius, providers, json } => {
                check(&target, name.as_deref(), radius, &providers, json).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("FFVL API key (leave blank to disable the beacon provider):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read FFVL API key")?;
    config.set_beacon_api_key(api_key);

    config.search_radius_km = CustomType::<f64>::new("Search radius (km):")
        .with_default(config.search_radius_km)
        .with_error_message("Please enter a number")
        .with_validator(|radius: &f64| {
            Ok(if *radius > 0.0 {
                Validation::Valid
            } else {
                Validation::Invalid("Radius must be positive".into())
            })
        })
        .prompt()
        .context("Failed to read search radius")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn check(
    target: &str,
    name: Option<&str>,
    radius: Option<f64>,
    only: &[ProviderId],
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let radius_km = radius.unwrap_or(config.search_radius_km);
    if radius_km.is_nan() || radius_km <= 0.0 {
        bail!("Search radius must be positive, got {radius_km}");
    }

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(&config)?);
    let lookup = ParaglidingEarthLookup::new(
        config.endpoint(SITE_LOOKUP_ENDPOINT).to_owned(),
        Arc::clone(&http),
    );

    let site = resolve_target(target, name, &lookup)
        .await
        .map_err(|err| anyhow!("{err}\n\n{}", err.hint()))?;

    let providers = select_providers(&config, http, only);
    debug!(site = %site.name, radius_km, providers = providers.len(), "starting survey");
    let survey = survey::run(site, radius_km, &providers).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&survey)?);
    } else {
        print!("{}", CoverageReport::new(&survey).render());
    }

    Ok(())
}

/// All providers, or only the requested ones; always in declared order.
fn select_providers(
    config: &Config,
    http: Arc<dyn HttpClient>,
    only: &[ProviderId],
) -> Vec<Box<dyn StationProvider>> {
    if only.is_empty() {
        return providers_from_config(config, http);
    }

    ProviderId::all()
        .iter()
        .filter(|id| only.contains(id))
        .map(|id| provider_from_config(*id, config, Arc::clone(&http)))
        .collect()
}
