use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use skywatch_core::{BackendRegistry, Config};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skywatch", version, about = "Pluggable weather backends")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the registered backends.
    Backends,

    /// Configure credentials for a specific backend.
    Configure {
        /// Backend name, e.g. "caiyun.com".
        backend: String,
    },

    /// Fetch current conditions and the hourly forecast from a backend.
    Fetch {
        /// Backend name; falls back to the configured default.
        backend: Option<String>,

        /// Location hint passed through to the backend. Backends currently
        /// use their configured coordinates instead.
        #[arg(long, default_value = "")]
        location: String,

        /// Number of forecast days requested from the backend.
        #[arg(long, default_value_t = 1)]
        numdays: u32,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Backends => {
                let registry = BackendRegistry::with_defaults();
                for name in registry.names() {
                    println!("{name}");
                }
            }
            Command::Configure { backend } => {
                let registry = BackendRegistry::with_defaults();
                if registry.get(&backend).is_none() {
                    return Err(anyhow!(
                        "Unknown backend '{backend}'. Available: {}",
                        registry.names().join(", ")
                    ));
                }

                let token = inquire::Password::new("API token:")
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API token")?;

                let mut config = Config::load()?;
                config.upsert_backend_token(&backend, token);
                config.save()?;

                println!("Saved credentials for backend '{backend}'.");
            }
            Command::Fetch { backend, location, numdays } => {
                let config = Config::load()?;
                let name = match backend {
                    Some(name) => name,
                    None => config.default_backend_name()?.to_string(),
                };

                let mut registry = BackendRegistry::with_defaults();
                let available = registry.names().join(", ");
                let backend = registry
                    .get_mut(&name)
                    .ok_or_else(|| anyhow!("Unknown backend '{name}'. Available: {available}"))?;

                backend.setup(&config)?;
                let data = backend
                    .fetch(&location, numdays)
                    .await
                    .with_context(|| format!("Backend '{name}' failed to fetch weather data"))?;

                let json = serde_json::to_string_pretty(&data)
                    .context("Failed to render weather data as JSON")?;
                println!("{json}");
            }
        }

        Ok(())
    }
}
