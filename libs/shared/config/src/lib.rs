use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_RECOMMENDATION_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_FALLBACK_SPECIALTY: &str = "Neurosurgeon";
pub const DEFAULT_TARGET_CHAINS: &str = "0x539,0x7a69";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub recommendation_service_url: String,
    pub recommendation_fallback_specialty: String,
    pub recommendation_timeout: Option<Duration>,
    pub wallet_rpc_url: Option<String>,
    /// Accepted chain ids, the first one is the switch target.
    pub wallet_target_chains: Vec<String>,
    pub wallet_address_store_path: Option<String>,
    pub wallet_poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recommendation_service_url: DEFAULT_RECOMMENDATION_URL.to_string(),
            recommendation_fallback_specialty: DEFAULT_FALLBACK_SPECIALTY.to_string(),
            recommendation_timeout: None,
            wallet_rpc_url: None,
            wallet_target_chains: parse_chain_list(DEFAULT_TARGET_CHAINS),
            wallet_address_store_path: None,
            wallet_poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            recommendation_service_url: env::var("RECOMMENDATION_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("RECOMMENDATION_SERVICE_URL not set, using default");
                    DEFAULT_RECOMMENDATION_URL.to_string()
                }),
            recommendation_fallback_specialty: env::var("RECOMMENDATION_FALLBACK_SPECIALTY")
                .unwrap_or_else(|_| {
                    warn!(
                        "RECOMMENDATION_FALLBACK_SPECIALTY not set, using {}",
                        DEFAULT_FALLBACK_SPECIALTY
                    );
                    DEFAULT_FALLBACK_SPECIALTY.to_string()
                }),
            recommendation_timeout: env::var("RECOMMENDATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| match v.parse::<u64>() {
                    Ok(secs) => Some(Duration::from_secs(secs)),
                    Err(_) => {
                        warn!("RECOMMENDATION_TIMEOUT_SECS is not a number: {}", v);
                        None
                    }
                }),
            wallet_rpc_url: env::var("WALLET_RPC_URL").ok().filter(|v| !v.is_empty()),
            wallet_target_chains: env::var("WALLET_TARGET_CHAINS")
                .map(|v| parse_chain_list(&v))
                .unwrap_or_else(|_| {
                    warn!("WALLET_TARGET_CHAINS not set, using {}", DEFAULT_TARGET_CHAINS);
                    parse_chain_list(DEFAULT_TARGET_CHAINS)
                }),
            wallet_address_store_path: env::var("WALLET_ADDRESS_STORE_PATH")
                .ok()
                .filter(|v| !v.is_empty()),
            wallet_poll_interval: env::var("WALLET_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or_else(|| Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)),
        };

        if !config.is_wallet_configured() {
            warn!("WALLET_RPC_URL not set - wallet provider will be unavailable");
        }
        if config.wallet_target_chains.is_empty() {
            warn!("No wallet target chains configured - every network counts as wrong");
        }

        config
    }

    pub fn is_wallet_configured(&self) -> bool {
        self.wallet_rpc_url.is_some()
    }
}

/// Splits a comma separated chain list, dropping blanks.
pub fn parse_chain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain_list() {
        assert_eq!(parse_chain_list("0x539, 0x7A69,,"), vec!["0x539", "0x7a69"]);
        assert!(parse_chain_list("").is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.recommendation_fallback_specialty, "Neurosurgeon");
        assert_eq!(config.wallet_target_chains, vec!["0x539", "0x7a69"]);
        assert!(!config.is_wallet_configured());
    }
}
