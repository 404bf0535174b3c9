//! JSON-RPC 2.0 ledger client over HTTPS.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chain_sol::{address::address_to_bytes, Address, Signature};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::{Commitment, LedgerClient};
use crate::error::LedgerError;

/// Default delay between `getSignatureStatuses` polls.
pub const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `{ "context": {...}, "value": T }` envelope used by most read methods.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashInfo {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    confirmation_status: Option<Commitment>,
    err: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "solana-core")]
    solana_core: String,
}

/// Ledger client backed by a Solana JSON-RPC endpoint.
pub struct RpcLedgerClient {
    http: reqwest::Client,
    url: String,
    commitment: Commitment,
    status_poll_interval: Duration,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    pub fn new(url: impl Into<String>) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            commitment: Commitment::default(),
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
            next_id: AtomicU64::new(1),
        })
    }

    /// Commitment used for reads and transaction preflight.
    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_status_poll_interval(mut self, interval: Duration) -> Self {
        self.status_poll_interval = interval;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, "rpc request");

        let body = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        parse_response(method, &body)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": true }]),
            )
            .await?;
        Ok(statuses.value.into_iter().next().flatten())
    }
}

fn parse_response<T: DeserializeOwned>(method: &str, body: &[u8]) -> Result<T, LedgerError> {
    let response: RpcResponse<T> = serde_json::from_slice(body)?;
    if let Some(error) = response.error {
        return Err(LedgerError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| LedgerError::MissingResult(method.to_string()))
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn get_balance(&self, address: &Address) -> Result<u64, LedgerError> {
        let balance: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), { "commitment": self.commitment }]),
            )
            .await?;
        Ok(balance.value)
    }

    async fn latest_blockhash(&self) -> Result<[u8; 32], LedgerError> {
        let info: WithContext<BlockhashInfo> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment }]),
            )
            .await?;
        Ok(address_to_bytes(&info.value.blockhash)?)
    }

    async fn submit(&self, signed_transaction: &[u8]) -> Result<Signature, LedgerError> {
        let encoded = BASE64.encode(signed_transaction);
        let signature: String = self
            .call(
                "sendTransaction",
                json!([encoded, {
                    "encoding": "base64",
                    "preflightCommitment": self.commitment,
                }]),
            )
            .await?;
        Ok(signature.parse()?)
    }

    async fn confirm(
        &self,
        signature: &Signature,
        commitment: Commitment,
    ) -> Result<(), LedgerError> {
        let mut ticker = tokio::time::interval(self.status_poll_interval);
        loop {
            ticker.tick().await;
            match self.signature_status(signature).await {
                Ok(Some(status)) => {
                    if let Some(err) = status.err {
                        return Err(LedgerError::TransactionFailed {
                            signature: *signature,
                            reason: err.to_string(),
                        });
                    }
                    if status
                        .confirmation_status
                        .is_some_and(|reached| reached >= commitment)
                    {
                        debug!(%signature, %commitment, "transaction confirmed");
                        return Ok(());
                    }
                }
                Ok(None) => {}
                // The transaction is already out; a flaky status poll is not
                // a verdict on it.
                Err(err) => warn!(%signature, ?err, "signature status poll failed"),
            }
        }
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        let version: VersionInfo = self.call("getVersion", json!([])).await?;
        debug!(version = %version.solana_core, url = %self.url, "ledger reachable");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "getBalance",
            params: json!(["11111111111111111111111111111111", { "commitment": Commitment::Confirmed }]),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "getBalance",
                "params": ["11111111111111111111111111111111", { "commitment": "confirmed" }],
            })
        );
    }

    #[test]
    fn parses_balance_envelope() {
        let body = br#"{"jsonrpc":"2.0","result":{"context":{"slot":1},"value":10000000000},"id":1}"#;
        let balance: WithContext<u64> = parse_response("getBalance", body).unwrap();
        assert_eq!(balance.value, 10_000_000_000);
    }

    #[test]
    fn rpc_error_object_becomes_error() {
        let body = br#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid param"},"id":1}"#;
        let err = parse_response::<WithContext<u64>>("getBalance", body).unwrap_err();
        assert!(matches!(err, LedgerError::Rpc { code: -32602, .. }));
    }

    #[test]
    fn missing_result_is_an_error() {
        let body = br#"{"jsonrpc":"2.0","id":1}"#;
        let err = parse_response::<String>("sendTransaction", body).unwrap_err();
        assert!(matches!(err, LedgerError::MissingResult(m) if m == "sendTransaction"));
    }

    #[test]
    fn garbage_body_is_decode_error() {
        let err = parse_response::<String>("getVersion", b"<html>").unwrap_err();
        assert!(matches!(err, LedgerError::Decode(_)));
    }

    #[test]
    fn parses_signature_statuses() {
        let body = br#"{"jsonrpc":"2.0","result":{"context":{"slot":82},"value":[
            {"slot":72,"confirmations":10,"err":null,"status":{"Ok":null},"confirmationStatus":"confirmed"},
            null
        ]},"id":1}"#;
        let statuses: WithContext<Vec<Option<SignatureStatus>>> =
            parse_response("getSignatureStatuses", body).unwrap();
        let first = statuses.value[0].as_ref().unwrap();
        assert_eq!(first.confirmation_status, Some(Commitment::Confirmed));
        assert!(first.err.is_none());
        assert!(statuses.value[1].is_none());
    }

    #[test]
    fn parses_failed_signature_status() {
        let body = br#"{"jsonrpc":"2.0","result":{"context":{"slot":82},"value":[
            {"slot":72,"confirmations":null,"err":{"InstructionError":[0,{"Custom":1}]},"confirmationStatus":"finalized"}
        ]},"id":1}"#;
        let statuses: WithContext<Vec<Option<SignatureStatus>>> =
            parse_response("getSignatureStatuses", body).unwrap();
        assert!(statuses.value[0].as_ref().unwrap().err.is_some());
    }

    #[test]
    fn parses_blockhash_and_version() {
        let body = br#"{"jsonrpc":"2.0","result":{"context":{"slot":2792},"value":{"blockhash":"EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N","lastValidBlockHeight":3090}},"id":1}"#;
        let info: WithContext<BlockhashInfo> = parse_response("getLatestBlockhash", body).unwrap();
        assert_eq!(address_to_bytes(&info.value.blockhash).unwrap().len(), 32);

        let body = br#"{"jsonrpc":"2.0","result":{"feature-set":2891131721,"solana-core":"1.16.7"},"id":1}"#;
        let version: VersionInfo = parse_response("getVersion", body).unwrap();
        assert_eq!(version.solana_core, "1.16.7");
    }

    #[test]
    fn builder_overrides() {
        let client = RpcLedgerClient::new("http://127.0.0.1:8899")
            .unwrap()
            .with_commitment(Commitment::Finalized)
            .with_status_poll_interval(Duration::from_millis(50));
        assert_eq!(client.url(), "http://127.0.0.1:8899");
        assert_eq!(client.commitment, Commitment::Finalized);
        assert_eq!(client.status_poll_interval, Duration::from_millis(50));
    }
}
