//! Sui chain reader
//!
//! Reads every stream held by the Streamer object by dev-inspecting a
//! programmable transaction that calls `streamer::get_all_streams`. Nothing is
//! signed or committed; the function's event is read straight from the
//! inspection result and flattened into [`StreamRecord`]s.

use std::sync::Arc;

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::api::HttpTransport;
use crate::error::{HubError, Result};
use crate::models::StreamRecord;
use crate::session::{normalize_address, WalletSession};

pub const STREAMER_MODULE: &str = "streamer";
pub const GET_ALL_STREAMS: &str = "get_all_streams";

/// JSON-RPC call returning the `result` member
pub trait ChainClient: Send {
    fn call(&self, method: &str, params: Value) -> Result<Value>;
}

pub struct SuiRpcClient {
    rpc_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl SuiRpcClient {
    pub fn new(rpc_url: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            transport,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

impl ChainClient for SuiRpcClient {
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let body = self.transport.post_json(&self.rpc_url, &request.to_string())?;
        let response: RpcResponse = serde_json::from_str(&body)?;

        if let Some(err) = response.error {
            return Err(HubError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        response
            .result
            .ok_or_else(|| HubError::Payload(format!("{} returned no result", method)))
    }
}

// BCS mirror of the Sui transaction types. Variant order matters: BCS encodes
// the variant index, so unused variants stay as placeholders.

type Address = [u8; 32];

#[derive(Serialize)]
enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Serialize)]
struct ProgrammableTransaction {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

#[derive(Serialize)]
enum CallArg {
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Serialize)]
enum ObjectArg {
    ImmOrOwnedObject((Address, u64, Vec<u8>)),
    SharedObject {
        id: Address,
        initial_shared_version: u64,
        mutable: bool,
    },
}

#[derive(Serialize)]
enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
}

#[derive(Serialize)]
struct ProgrammableMoveCall {
    package: Address,
    module: String,
    function: String,
    type_arguments: Vec<TypeTag>,
    arguments: Vec<Argument>,
}

#[derive(Serialize)]
enum TypeTag {}

#[derive(Serialize)]
enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

pub fn parse_object_id(id: &str) -> Result<Address> {
    let normalized = normalize_address(id)?;
    let bytes = hex::decode(&normalized[2..]).map_err(|_| HubError::InvalidAddress(id.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| HubError::InvalidAddress(id.to_string()))
}

/// BCS bytes of `package::streamer::get_all_streams(streamer)`
pub fn get_all_streams_kind(package_id: &str, streamer_id: &str, initial_shared_version: u64) -> Result<Vec<u8>> {
    let kind = TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
        inputs: vec![CallArg::Object(ObjectArg::SharedObject {
            id: parse_object_id(streamer_id)?,
            initial_shared_version,
            mutable: true,
        })],
        commands: vec![Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: parse_object_id(package_id)?,
            module: STREAMER_MODULE.to_string(),
            function: GET_ALL_STREAMS.to_string(),
            type_arguments: Vec::new(),
            arguments: vec![Argument::Input(0)],
        }))],
    });
    Ok(bcs::to_bytes(&kind)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevInspectResults {
    effects: Option<InspectEffects>,
    #[serde(default)]
    events: Vec<InspectEvent>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InspectEffects {
    status: ExecutionStatus,
}

#[derive(Debug, Deserialize)]
struct ExecutionStatus {
    status: String,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectEvent {
    #[serde(default)]
    parsed_json: Value,
}

impl DevInspectResults {
    /// Payload of the first event, or the node's failure message
    fn into_payload(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(HubError::Execution(err));
        }
        if let Some(effects) = self.effects {
            if effects.status.status == "failure" {
                return Err(HubError::Execution(
                    effects.status.error.unwrap_or_else(|| "execution failed".to_string()),
                ));
            }
        }
        let event = self.events.into_iter().next().ok_or(HubError::MissingEvent)?;
        match event.parsed_json {
            Value::Object(mut obj) => Ok(obj.remove("data").unwrap_or(Value::Object(obj))),
            other => Err(HubError::Payload(format!("event payload is not an object: {}", other))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StreamerPayload {
    live_streams: Option<LiveStreams>,
    vod_streams: Option<Vec<VodEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct LiveStreams {
    contents: Option<Vec<LiveEntry>>,
}

#[derive(Debug, Deserialize)]
struct LiveEntry {
    key: String,
    value: LiveValue,
}

#[derive(Debug, Deserialize)]
struct LiveValue {
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc: String,
    #[serde(default, deserialize_with = "string_or_number")]
    start_at: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    last_update_at: Option<String>,
    #[serde(default)]
    m3u8_content: String,
}

#[derive(Debug, Deserialize)]
struct VodEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc: String,
    #[serde(default, deserialize_with = "string_or_number")]
    upload_at: Option<String>,
    #[serde(default)]
    m3u8_content: String,
}

/// Move u64 values come back as strings, but accept plain numbers too
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Flatten the Streamer payload: live entries in map order, then recorded ones
pub fn parse_streams(payload: &Value) -> Result<Vec<StreamRecord>> {
    let payload = StreamerPayload::deserialize(payload)
        .map_err(|e| HubError::Payload(format!("streamer payload: {}", e)))?;

    let live = payload
        .live_streams
        .and_then(|l| l.contents)
        .unwrap_or_default()
        .into_iter()
        .map(|entry| StreamRecord {
            url: Some(entry.key),
            index: None,
            name: entry.value.name,
            description: entry.value.desc,
            start_at: entry.value.start_at,
            last_update_at: entry.value.last_update_at,
            upload_at: None,
            m3u8_content: entry.value.m3u8_content,
        });

    let vod = payload
        .vod_streams
        .unwrap_or_default()
        .into_iter()
        .map(|entry| StreamRecord {
            url: None,
            index: None,
            name: entry.name,
            description: entry.desc,
            start_at: None,
            last_update_at: None,
            upload_at: entry.upload_at,
            m3u8_content: entry.m3u8_content,
        });

    Ok(live.chain(vod).collect())
}

/// Where the streams live on chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTarget {
    pub package_id: String,
    pub streamer_object_id: String,
    pub initial_shared_version: Option<u64>,
}

/// Source of the flat record list, one blocking call per fetch
pub trait StreamSource: Send {
    fn fetch_streams(&mut self, session: &WalletSession) -> Result<Vec<StreamRecord>>;
}

pub struct ChainReader<C: ChainClient> {
    client: C,
    target: ChainTarget,
}

impl<C: ChainClient> ChainReader<C> {
    pub fn new(client: C, target: ChainTarget) -> Self {
        Self { client, target }
    }

    pub fn target(&self) -> &ChainTarget {
        &self.target
    }

    /// Configured version, or looked up once from the object's owner field
    fn shared_version(&mut self) -> Result<u64> {
        if let Some(version) = self.target.initial_shared_version {
            return Ok(version);
        }

        let object_id = normalize_address(&self.target.streamer_object_id)?;
        let result = self
            .client
            .call("sui_getObject", json!([object_id, { "showOwner": true }]))?;

        if let Some(err) = result.get("error") {
            return Err(HubError::Payload(format!("streamer object: {}", err)));
        }
        let version = result
            .pointer("/data/owner/Shared/initial_shared_version")
            .and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .ok_or_else(|| HubError::Payload("streamer object is not shared".to_string()))?;

        self.target.initial_shared_version = Some(version);
        Ok(version)
    }
}

impl<C: ChainClient> StreamSource for ChainReader<C> {
    fn fetch_streams(&mut self, session: &WalletSession) -> Result<Vec<StreamRecord>> {
        let sender = session.require_account()?.to_string();
        let version = self.shared_version()?;
        let kind = get_all_streams_kind(&self.target.package_id, &self.target.streamer_object_id, version)?;
        let tx_bytes = base64::engine::general_purpose::STANDARD.encode(kind);

        let result = self.client.call(
            "sui_devInspectTransactionBlock",
            json!([sender, tx_bytes, Value::Null, Value::Null]),
        )?;
        let inspected: DevInspectResults = serde_json::from_value(result)?;
        parse_streams(&inspected.into_payload()?)
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod chain_tests;
