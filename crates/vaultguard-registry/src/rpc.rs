// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PointerRegistry client over Ethereum JSON-RPC.
//!
//! Writes are sent with `eth_sendTransaction` from the node-managed account
//! named by the vault identity, then confirmed by polling
//! `eth_getTransactionReceipt`. Reads use `eth_call`. A failed write is never
//! retried: the caller decides what to do with an unconfirmed pointer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use vaultguard_config::model::RegistryConfig;
use vaultguard_core::{
    AdapterType, ContentId, HealthStatus, Identity, PluginAdapter, PointerChanged,
    RegistryClient, RegistryReceipt, VaultError,
};

use crate::abi::{self, Address};

const STATUS_SUCCESS: &str = "0x1";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// An error object returned by the node.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    logs: Vec<Log>,
}

#[derive(Debug, Deserialize)]
struct Log {
    address: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    data: String,
}

/// [`RegistryClient`] for a deployed PointerRegistry contract.
#[derive(Debug)]
pub struct JsonRpcRegistry {
    client: reqwest::Client,
    rpc_url: String,
    contract: String,
    identity: Identity,
    sender: Address,
    receipt_timeout: Duration,
    poll_interval: Duration,
    gas_limit: Option<u64>,
    next_id: AtomicU64,
}

impl JsonRpcRegistry {
    /// Build a client writing as `identity`, which must be an account address
    /// the node can sign for.
    pub fn new(config: &RegistryConfig, identity: Identity) -> Result<Self, VaultError> {
        let contract = config.contract_address.as_deref().ok_or_else(|| {
            VaultError::Config("registry.contract_address is required".to_string())
        })?;
        let contract_bytes = abi::parse_address(contract)
            .map_err(|e| VaultError::Config(format!("registry.contract_address: {e}")))?;
        let sender = abi::parse_address(identity.as_str())
            .map_err(|e| VaultError::Config(format!("vault.identity: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VaultError::network("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            contract: abi::to_hex(&contract_bytes),
            identity,
            sender,
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            gas_limit: config.gas_limit,
            next_id: AtomicU64::new(1),
        })
    }

    /// One JSON-RPC round trip. Transport and decoding failures are
    /// `Err`; an error object from the node is `Ok(Err(_))`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Result<T, RpcError>, VaultError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VaultError::network(format!("{method} request failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VaultError::Network {
                message: format!("{method} returned HTTP {status}: {text}"),
                source: None,
            });
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| VaultError::network(format!("invalid {method} response"), e))?;
        if let Some(error) = parsed.error {
            return Ok(Err(error));
        }
        let value = parsed.result.unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map(Ok)
            .map_err(|e| VaultError::network(format!("unexpected {method} result"), e))
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, VaultError> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            let receipt: Option<TransactionReceipt> = self
                .call("eth_getTransactionReceipt", json!([tx_hash]))
                .await?
                .map_err(|e| VaultError::Network {
                    message: format!("eth_getTransactionReceipt failed: {e}"),
                    source: None,
                })?;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(VaultError::RegistryWriteFailed {
                    message: format!(
                        "transaction not confirmed within {:?}",
                        self.receipt_timeout
                    ),
                    tx_hash: Some(tx_hash.to_string()),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Find our `PointerChanged` among the receipt logs.
    fn event_from_logs(&self, logs: &[Log]) -> Option<PointerChanged> {
        logs.iter().find_map(|log| {
            if !log.address.eq_ignore_ascii_case(&self.contract) {
                return None;
            }
            let topic0 = log.topics.first()?;
            if !topic0.eq_ignore_ascii_case(abi::POINTER_CHANGED_TOPIC) {
                return None;
            }
            let emitter = abi::decode_address_topic(log.topics.get(1)?).ok()?;
            if emitter != self.sender {
                return None;
            }
            let data = abi::from_hex(&log.data).ok()?;
            let content_id = ContentId::new(abi::decode_string(&data).ok()?).ok()?;
            Some(PointerChanged {
                identity: self.identity.clone(),
                content_id,
            })
        })
    }
}

fn parse_quantity(value: &str) -> Option<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16).ok()
}

#[async_trait]
impl PluginAdapter for JsonRpcRegistry {
    fn name(&self) -> &str {
        "json-rpc-registry"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Registry
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        match self.call::<String>("eth_chainId", json!([])).await {
            Ok(Ok(chain_id)) => {
                debug!(chain_id = %chain_id, "chain node reachable");
                Ok(HealthStatus::Healthy)
            }
            Ok(Err(e)) => Ok(HealthStatus::Degraded(format!("eth_chainId failed: {e}"))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl RegistryClient for JsonRpcRegistry {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    async fn set_pointer(&self, content_id: &ContentId) -> Result<RegistryReceipt, VaultError> {
        let mut tx = json!({
            "from": abi::to_hex(&self.sender),
            "to": self.contract,
            "data": abi::to_hex(&abi::encode_set_pointer(content_id.as_str())),
        });
        if let Some(gas) = self.gas_limit {
            tx["gas"] = Value::String(format!("{gas:#x}"));
        }

        let tx_hash: String = self
            .call("eth_sendTransaction", json!([tx]))
            .await?
            .map_err(|e| VaultError::RegistryWriteFailed {
                message: format!("eth_sendTransaction rejected: {e}"),
                tx_hash: None,
            })?;
        debug!(tx_hash = %tx_hash, content_id = %content_id, "setPointer submitted");

        let receipt = self.wait_for_receipt(&tx_hash).await?;
        if receipt.status.as_deref() != Some(STATUS_SUCCESS) {
            return Err(VaultError::RegistryWriteFailed {
                message: format!(
                    "transaction reverted (status {})",
                    receipt.status.as_deref().unwrap_or("missing")
                ),
                tx_hash: Some(tx_hash),
            });
        }

        let block_number = receipt.block_number.as_deref().and_then(parse_quantity);
        let event = match self.event_from_logs(&receipt.logs) {
            Some(event) => event,
            None => {
                warn!(tx_hash = %tx_hash, "receipt carries no PointerChanged log from the registry");
                PointerChanged {
                    identity: self.identity.clone(),
                    content_id: content_id.clone(),
                }
            }
        };
        info!(tx_hash = %tx_hash, block = ?block_number, "pointer confirmed");

        Ok(RegistryReceipt {
            tx_hash,
            block_number,
            event,
        })
    }

    async fn get_pointer(&self, identity: &Identity) -> Result<Option<ContentId>, VaultError> {
        let address = abi::parse_address(identity.as_str())?;
        let call = json!({
            "to": self.contract,
            "data": abi::to_hex(&abi::encode_get_pointer(&address)),
        });

        let returned: String = self
            .call("eth_call", json!([call, "latest"]))
            .await?
            .map_err(|e| VaultError::Network {
                message: format!("eth_call getPointer failed: {e}"),
                source: None,
            })?;
        let pointer = abi::decode_string(&abi::from_hex(&returned)?)?;
        if pointer.is_empty() {
            return Ok(None);
        }
        ContentId::new(pointer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
    const ALICE: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    const TX: &str = "0x9fc76417374aa880d4449a1f7f31ec597f00b1f6f3dd2d66f4c9c6c445836d8b";

    fn config(rpc_url: &str) -> RegistryConfig {
        RegistryConfig {
            rpc_url: rpc_url.to_string(),
            contract_address: Some(CONTRACT.to_string()),
            receipt_timeout_secs: 1,
            poll_interval_ms: 10,
            gas_limit: None,
        }
    }

    fn client(server: &MockServer) -> JsonRpcRegistry {
        JsonRpcRegistry::new(&config(&server.uri()), Identity::new(ALICE).unwrap()).unwrap()
    }

    fn rpc_result(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result,
        }))
    }

    fn rpc_error(message: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": message },
        }))
    }

    fn pointer_changed_log(cid: &str) -> Value {
        json!({
            "address": CONTRACT,
            "topics": [
                abi::POINTER_CHANGED_TOPIC,
                format!("0x000000000000000000000000{}", &ALICE[2..]),
            ],
            "data": abi::to_hex(&abi::encode_string(cid)),
        })
    }

    async fn mount_send(server: &MockServer) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_sendTransaction" })))
            .respond_with(rpc_result(json!(TX)))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn new_requires_contract_and_address_identity() {
        let mut cfg = config("http://127.0.0.1:8545");
        cfg.contract_address = None;
        assert!(matches!(
            JsonRpcRegistry::new(&cfg, Identity::new(ALICE).unwrap()),
            Err(VaultError::Config(_))
        ));

        let cfg = config("http://127.0.0.1:8545");
        assert!(matches!(
            JsonRpcRegistry::new(&cfg, Identity::new("alice").unwrap()),
            Err(VaultError::Config(_))
        ));
    }

    #[tokio::test]
    async fn set_pointer_sends_calldata_and_waits_for_receipt() {
        let server = MockServer::start().await;
        let cid = "bafkreiabc";
        let calldata = abi::to_hex(&abi::encode_set_pointer(cid));

        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "eth_sendTransaction",
                "params": [{ "from": ALICE, "to": CONTRACT, "data": calldata }],
            })))
            .respond_with(rpc_result(json!(TX)))
            .expect(1)
            .mount(&server)
            .await;

        // Pending once, then mined.
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(rpc_result(Value::Null))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(rpc_result(json!({
                "status": "0x1",
                "blockNumber": "0x2a",
                "logs": [pointer_changed_log(cid)],
            })))
            .mount(&server)
            .await;

        let receipt = client(&server)
            .set_pointer(&ContentId::new(cid).unwrap())
            .await
            .unwrap();
        assert_eq!(receipt.tx_hash, TX);
        assert_eq!(receipt.block_number, Some(42));
        assert_eq!(receipt.event.content_id.as_str(), cid);
        assert_eq!(receipt.event.identity.as_str(), ALICE);
    }

    #[tokio::test]
    async fn gas_limit_is_sent_as_quantity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "eth_sendTransaction",
                "params": [{ "gas": "0x186a0" }],
            })))
            .respond_with(rpc_result(json!(TX)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(rpc_result(json!({ "status": "0x1", "logs": [] })))
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri());
        cfg.gas_limit = Some(100_000);
        let registry = JsonRpcRegistry::new(&cfg, Identity::new(ALICE).unwrap()).unwrap();
        let receipt = registry
            .set_pointer(&ContentId::new("bafkreiabc").unwrap())
            .await
            .unwrap();
        assert_eq!(receipt.block_number, None);
        assert_eq!(receipt.event.content_id.as_str(), "bafkreiabc");
    }

    #[tokio::test]
    async fn reverted_transaction_is_write_failure_with_hash() {
        let server = MockServer::start().await;
        mount_send(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(rpc_result(json!({ "status": "0x0", "logs": [] })))
            .mount(&server)
            .await;

        let err = client(&server)
            .set_pointer(&ContentId::new("bafkreiabc").unwrap())
            .await
            .unwrap_err();
        match err {
            VaultError::RegistryWriteFailed { tx_hash, .. } => {
                assert_eq!(tx_hash.as_deref(), Some(TX));
            }
            other => panic!("expected RegistryWriteFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_submission_is_write_failure_without_hash() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_sendTransaction" })))
            .respond_with(rpc_error("insufficient funds for gas"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .set_pointer(&ContentId::new("bafkreiabc").unwrap())
            .await
            .unwrap_err();
        assert!(
            matches!(err, VaultError::RegistryWriteFailed { tx_hash: None, .. }),
            "{err:?}"
        );
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[tokio::test]
    async fn unconfirmed_transaction_times_out_without_retry() {
        let server = MockServer::start().await;
        mount_send(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(rpc_result(Value::Null))
            .mount(&server)
            .await;

        let err = client(&server)
            .set_pointer(&ContentId::new("bafkreiabc").unwrap())
            .await
            .unwrap_err();
        assert!(
            matches!(err, VaultError::RegistryWriteFailed { tx_hash: Some(_), .. }),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn get_pointer_decodes_string() {
        let server = MockServer::start().await;
        let returned = abi::to_hex(&abi::encode_string("bafkreiabc"));
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "eth_call",
                "params": [{ "to": CONTRACT }, "latest"],
            })))
            .respond_with(rpc_result(json!(returned)))
            .mount(&server)
            .await;

        let pointer = client(&server)
            .get_pointer(&Identity::new(ALICE).unwrap())
            .await
            .unwrap();
        assert_eq!(pointer, Some(ContentId::new("bafkreiabc").unwrap()));
    }

    #[tokio::test]
    async fn empty_slot_reads_as_none() {
        let server = MockServer::start().await;
        let returned = abi::to_hex(&abi::encode_string(""));
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_call" })))
            .respond_with(rpc_result(json!(returned)))
            .mount(&server)
            .await;

        let pointer = client(&server)
            .get_pointer(&Identity::new(ALICE).unwrap())
            .await
            .unwrap();
        assert_eq!(pointer, None);
    }

    #[tokio::test]
    async fn http_failure_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_pointer(&Identity::new(ALICE).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Network { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn health_check_uses_chain_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_chainId" })))
            .respond_with(rpc_result(json!("0x7a69")))
            .mount(&server)
            .await;

        assert_eq!(
            client(&server).health_check().await.unwrap(),
            HealthStatus::Healthy
        );
    }

    #[test]
    fn quantities_parse_as_hex() {
        assert_eq!(parse_quantity("0x2a"), Some(42));
        assert_eq!(parse_quantity("0x0"), Some(0));
        assert_eq!(parse_quantity("nope"), None);
    }
}
