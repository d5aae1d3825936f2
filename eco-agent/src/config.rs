//! Configuration for the EcoRewards engine.

use serde::{Deserialize, Serialize};

use crate::service::ServiceConfig;

/// Top-level configuration, loadable from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcoConfig {
    /// Service settings
    pub service: ServiceSettings,
    /// Vision backend settings
    pub vision: VisionConfig,
    /// Roster store settings
    pub store: StoreConfig,
    /// Reward exchange table
    pub rewards: RewardsConfig,
}

impl Default for EcoConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            vision: VisionConfig::default(),
            store: StoreConfig::default(),
            rewards: RewardsConfig::default(),
        }
    }
}

impl EcoConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service instance ID
    pub service_id: String,
    /// Whether to log all submissions
    pub audit_enabled: bool,
    /// Leaderboard size
    pub leaderboard_size: usize,
    /// Max tokens the verdict reply may use
    pub max_output_tokens: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            service_id: uuid::Uuid::new_v4().to_string(),
            audit_enabled: true,
            leaderboard_size: 10,
            max_output_tokens: 512,
        }
    }
}

impl From<ServiceSettings> for ServiceConfig {
    fn from(settings: ServiceSettings) -> Self {
        Self {
            service_id: settings.service_id,
            audit_enabled: settings.audit_enabled,
            leaderboard_size: settings.leaderboard_size,
            max_output_tokens: settings.max_output_tokens,
            temperature: None,
        }
    }
}

/// Vision backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Base URL of the generateContent endpoint
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key (commonly substituted from the environment)
    pub api_key: String,
    /// Per-request timeout (ms)
    pub timeout_ms: u64,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: String::new(),
            timeout_ms: 30_000,
            temperature: None,
        }
    }
}

/// Roster store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the table connector
    pub base_url: String,
    /// Table holding the roster
    pub table: String,
    /// Optional bearer key
    pub api_key: Option<String>,
    /// Per-request timeout (ms)
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            table: "Students".to_string(),
            api_key: None,
            timeout_ms: 10_000,
        }
    }
}

/// Reward exchange configuration.
///
/// Informational only: points are never deducted, students trade them in
/// person at the school office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Items on offer, cheapest first
    pub items: Vec<RewardItem>,
}

/// One item on the reward exchange table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    /// Display name
    pub name: String,
    /// Point cost
    pub cost: u64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            items: vec![
                RewardItem {
                    name: "Small Candy".to_string(),
                    cost: 50,
                },
                RewardItem {
                    name: "Big Lollipop".to_string(),
                    cost: 150,
                },
                RewardItem {
                    name: "Chocolate Bar".to_string(),
                    cost: 300,
                },
            ],
        }
    }
}

impl RewardsConfig {
    /// Items a student could afford with the given point total.
    pub fn affordable(&self, points: u64) -> Vec<&RewardItem> {
        self.items.iter().filter(|item| item.cost <= points).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EcoConfig::default();
        assert_eq!(config.vision.model, "gemini-1.5-flash");
        assert_eq!(config.store.table, "Students");
        assert_eq!(config.service.leaderboard_size, 10);
        assert_eq!(config.rewards.items.len(), 3);
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = EcoConfig::default();
        config.service.service_id = "test-service".to_string();

        let yaml = config.to_yaml().unwrap();
        let parsed = EcoConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.service.service_id, "test-service");
        assert_eq!(parsed.rewards.items, RewardsConfig::default().items);
    }

    #[test]
    fn test_affordable_rewards() {
        let rewards = RewardsConfig::default();

        assert!(rewards.affordable(49).is_empty());
        assert_eq!(rewards.affordable(150).len(), 2);
        assert_eq!(rewards.affordable(1000).len(), 3);
    }
}
