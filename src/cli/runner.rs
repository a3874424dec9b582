//! CLI runner - executes commands

use crate::catalog::{self, StreamDescriptor};
use crate::cli::commands::{Cli, Commands};
use crate::client::IntacctClient;
use crate::config::{self, ConnectorConfig};
use crate::engine::{JsonLinesSink, SyncEngine};
use crate::error::{Error, Result};
use crate::state::StateManager;
use serde_json::json;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read { streams } => self.read(streams.as_deref()).await,
        }
    }

    /// Load and validate the connector configuration
    fn load_config(&self) -> Result<ConnectorConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Configuration file not specified (use -C flag)"))?;
        config::load_config(path)
    }

    /// Build the state manager from CLI flags
    fn load_state(&self) -> Result<StateManager> {
        if let Some(json) = &self.cli.state_json {
            return StateManager::from_json(json);
        }
        if let Some(path) = &self.cli.state {
            return StateManager::from_file(path);
        }
        Ok(StateManager::in_memory())
    }

    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = IntacctClient::connect(&config).await?;
        println!(
            "{}",
            json!({
                "connected": true,
                "endpoint": client.session().endpoint,
            })
        );
        Ok(())
    }

    fn discover(&self) -> Result<()> {
        let streams: Vec<_> = catalog::builtin_streams()
            .iter()
            .filter(|s| s.is_supported())
            .collect();
        println!("{}", json!({ "streams": streams }));
        Ok(())
    }

    async fn read(&self, streams: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let selected = select_streams(streams)?;

        let client = IntacctClient::connect(&config).await?;
        let state = self.load_state()?;
        let mut engine = SyncEngine::new(client, state, config.start_watermark()?);

        let stdout = std::io::stdout();
        let mut sink = JsonLinesSink::new(stdout.lock());
        engine.sync_streams(&selected, &mut sink).await?;
        Ok(())
    }
}

/// Resolve a comma-separated stream selection against the catalog.
/// No selection means every supported stream.
fn select_streams(selection: Option<&str>) -> Result<Vec<&'static StreamDescriptor>> {
    match selection {
        None => Ok(catalog::builtin_streams()
            .iter()
            .filter(|s| s.is_supported())
            .collect()),
        Some(names) => names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                catalog::find_stream(name)
                    .ok_or_else(|| Error::config(format!("Unknown stream: {name}")))
            })
            .collect(),
    }
}
