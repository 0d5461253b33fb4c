use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for studio-flow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudioFlowConfig {
    /// Workflow engine behaviour
    pub workflow: WorkflowSettings,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Database settings (optional)
    pub database: Option<DatabaseConfig>,
}

/// How a status write treats the status observed when the transition started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Write only if the stored status still equals the one read at transition start
    CompareAndSwap,
    /// Write unconditionally
    LastWriteWins,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowSettings {
    /// Concurrency policy for status commits
    pub commit_policy: CommitPolicy,
    /// Two bookings of one photographer closer than this conflict
    pub conflict_window_minutes: i64,
    /// Days after the shoot a generated invoice falls due
    pub invoice_due_days: i64,
    /// Days before the due date the payment reminder goes out
    pub payment_reminder_lead_days: i64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            commit_policy: CommitPolicy::CompareAndSwap,
            conflict_window_minutes: 120,
            invoice_due_days: 14,
            payment_reminder_lead_days: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for StudioFlowConfig {
    fn default() -> Self {
        Self {
            workflow: WorkflowSettings::default(),
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            database: None,
        }
    }
}

impl StudioFlowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (studio-flow.toml, .studio-flow-rc)
    /// 3. Environment variables (STUDIO_FLOW_<SECTION>__<KEY>)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("studio-flow.toml").exists() {
            builder = builder.add_source(File::with_name("studio-flow"));
        }

        if Path::new(".studio-flow-rc").exists() {
            builder = builder.add_source(File::with_name(".studio-flow-rc").format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("STUDIO_FLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let studio_config: StudioFlowConfig = config.try_deserialize()?;
        Ok(studio_config)
    }

    /// Load from an explicit file on top of the defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path.as_ref()).format(config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<StudioFlowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = StudioFlowConfig::load_env_file();
        StudioFlowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static StudioFlowConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<&'static StudioFlowConfig> {
    let config = config()?;
    tracing::info!(
        commit_policy = ?config.workflow.commit_policy,
        "Configuration loaded successfully"
    );
    Ok(config)
}
