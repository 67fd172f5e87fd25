//! DAO configuration.
//!
//! Handles loading and validation of organization defaults from TOML files.

use cairn_governance::{GovernanceConfig, MembershipConfig};
use cairn_rewards::RewardConfig;
use cairn_staking::DEFAULT_LOCK_PERIOD_SECS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration a new organization is created from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaoConfig {
    /// Staking configuration
    pub staking: StakingConfig,
    /// Voting durations
    pub governance: GovernanceConfig,
    /// Membership thresholds
    pub membership: MembershipConfig,
    /// Reward amounts and yield
    pub rewards: RewardConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl DaoConfig {
    /// Load configuration from file.
    /// Path is validated to prevent directory traversal.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if path.to_string_lossy().contains("..") {
            anyhow::bail!("Invalid path: directory traversal detected");
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: DaoConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        if path.to_string_lossy().contains("..") {
            anyhow::bail!("Invalid path: directory traversal detected");
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.staking.lock_period_secs == 0 {
            anyhow::bail!("Staking lock period cannot be 0");
        }
        self.governance
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid governance config: {}", e))?;
        self.membership
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid membership config: {}", e))?;
        self.rewards
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid rewards config: {}", e))?;
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            anyhow::bail!("Unknown log format '{}'", self.logging.format);
        }
        Ok(())
    }
}

/// Staking configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    /// Seconds after the latest stake before unstaking is allowed
    pub lock_period_secs: u64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            lock_period_secs: DEFAULT_LOCK_PERIOD_SECS,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    pub level: String,
    /// Log format (json|pretty)
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
