use std::time::Duration;
use serde_json::{json, Value};

use shared_config::AppConfig;

pub const TEST_ACCOUNT: &str = "0xabc0000000000000000000000000000000000001";
pub const TEST_ACCOUNT_ALT: &str = "0xdef0000000000000000000000000000000000002";
pub const GANACHE_CHAIN: &str = "0x539";
pub const LOCAL_CHAIN: &str = "0x7a69";
pub const MAINNET_CHAIN: &str = "0x1";

pub struct TestConfig {
    pub recommendation_service_url: String,
    pub fallback_specialty: String,
    pub wallet_rpc_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            recommendation_service_url: "http://127.0.0.1:5000".to_string(),
            fallback_specialty: "Neurosurgeon".to_string(),
            wallet_rpc_url: None,
        }
    }
}

impl TestConfig {
    pub fn with_recommendation_url(url: &str) -> Self {
        Self {
            recommendation_service_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_wallet_rpc(url: &str) -> Self {
        Self {
            wallet_rpc_url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            recommendation_service_url: self.recommendation_service_url.clone(),
            recommendation_fallback_specialty: self.fallback_specialty.clone(),
            recommendation_timeout: Some(Duration::from_secs(5)),
            wallet_rpc_url: self.wallet_rpc_url.clone(),
            wallet_target_chains: vec![GANACHE_CHAIN.to_string(), LOCAL_CHAIN.to_string()],
            wallet_address_store_path: None,
            wallet_poll_interval: Duration::from_millis(50),
        }
    }
}

/// Canned JSON-RPC 2.0 bodies as a wallet node would return them.
pub struct MockRpcResponses;

impl MockRpcResponses {
    pub fn result(result: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result
        })
    }

    pub fn accounts(accounts: &[&str]) -> Value {
        Self::result(json!(accounts))
    }

    pub fn chain_id(chain_id: &str) -> Value {
        Self::result(json!(chain_id))
    }

    /// `eth_getBalance` result: wei as a hex quantity.
    pub fn balance(wei_hex: &str) -> Value {
        Self::result(json!(wei_hex))
    }

    pub fn null_result() -> Value {
        Self::result(Value::Null)
    }

    pub fn error(code: i64, message: &str) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {
                "code": code,
                "message": message
            }
        })
    }

    pub fn user_rejected() -> Value {
        Self::error(4001, "User rejected the request.")
    }
}

pub struct MockRecommendationResponses;

impl MockRecommendationResponses {
    pub fn doctors(items: &[&str]) -> Value {
        json!({ "doctors": items })
    }

    pub fn empty() -> Value {
        json!({ "doctors": [] })
    }

    pub fn missing_doctors() -> Value {
        json!({ "status": "ok" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.recommendation_service_url, "http://127.0.0.1:5000");
        assert_eq!(app_config.recommendation_fallback_specialty, "Neurosurgeon");
        assert!(app_config.wallet_rpc_url.is_none());
        assert_eq!(app_config.wallet_target_chains[0], GANACHE_CHAIN);
    }

    #[test]
    fn test_rpc_error_shape() {
        let body = MockRpcResponses::user_rejected();
        assert_eq!(body["error"]["code"], 4001);
        assert!(body.get("result").is_none());
    }
}
