use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use citycast_core::{
    CityCollection, CityMap, CollectionOptions, Config, DashboardOptions, FileBlobStore,
    load_dashboard, load_marine,
    provider::{marine_source_from_config, weather_source_from_config},
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Weather for your cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Current conditions, today's hours and the weekly forecast.
    Show {
        /// City name; defaults to the configured city.
        city: Option<String>,
    },

    /// Manage the saved city list.
    Cities {
        #[command(subcommand)]
        action: CitiesAction,
    },

    /// Look up cities and print them as map markers.
    Map {
        /// City names to pin.
        #[arg(required = true)]
        cities: Vec<String>,
    },

    /// Wave and wind conditions.
    Marine {
        /// Coastal place name.
        #[arg(default_value = "Barcelona")]
        place: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CitiesAction {
    /// Print the saved cities in order.
    List,

    /// Look up a city and append it.
    Add { name: String },

    /// Remove every entry with this id.
    Remove { id: String },

    /// Move an entry to the position of another.
    Move { id: String, target: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        tracing::debug!(command = ?self.command, has_key = config.api_key().is_some(), "running");

        match self.command {
            Command::Configure => configure(config)?,
            Command::Show { city } => {
                let source = weather_source_from_config(&config);
                let dashboard = load_dashboard(
                    &source,
                    city.as_deref().unwrap_or_default(),
                    &Local::now(),
                    &DashboardOptions::from(&config),
                )
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))
                .context("Failed to load weather")?;

                output::print_dashboard(&dashboard);
            }
            Command::Cities { action } => run_cities(&config, action).await?,
            Command::Map { cities } => {
                let mut map = CityMap::new(weather_source_from_config(&config));
                for name in &cities {
                    if map.add(name).await.is_err() {
                        eprintln!("{name}: {}", map.last_error().unwrap_or("lookup failed"));
                    }
                }
                output::print_map(&map);
            }
            Command::Marine { place } => {
                let source = marine_source_from_config(&config);
                let report = load_marine(&source, &place)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))
                    .with_context(|| format!("Failed to load marine data for '{place}'"))?;

                output::print_marine(&report);
            }
        }

        Ok(())
    }
}

async fn run_cities(config: &Config, action: CitiesAction) -> anyhow::Result<()> {
    let store = FileBlobStore::in_data_dir()?;
    tracing::debug!(key = %config.storage_key, "opening city store");
    let mut collection = CityCollection::initialize(
        weather_source_from_config(config),
        store,
        CollectionOptions::from(config),
    )
    .await;

    match action {
        CitiesAction::List => {}
        CitiesAction::Add { name } => {
            if collection.add(&name).await.is_err() {
                bail!("{}", collection.last_error().unwrap_or("Could not add city"));
            }
        }
        CitiesAction::Remove { id } => {
            if collection.remove(&id) == 0 {
                eprintln!("No city with id {id}");
            }
        }
        CitiesAction::Move { id, target } => {
            if !collection.reorder(&id, &target) {
                eprintln!("Nothing to move");
            }
        }
    }

    output::print_cities(collection.cities());
    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(key.to_string());
    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_move() {
        let cli = Cli::try_parse_from(["citycast", "cities", "move", "a-1", "b-2"]).unwrap();
        match cli.command {
            Command::Cities { action: CitiesAction::Move { id, target } } => {
                assert_eq!(id, "a-1");
                assert_eq!(target, "b-2");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn marine_defaults_to_barcelona() {
        let cli = Cli::try_parse_from(["citycast", "marine"]).unwrap();
        assert!(matches!(cli.command, Command::Marine { place } if place == "Barcelona"));
    }

    #[test]
    fn map_requires_a_city() {
        assert!(Cli::try_parse_from(["citycast", "map"]).is_err());
    }
}
