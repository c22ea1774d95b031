//! XML-RPC client for the hub.
//!
//! Calls are `methodCall` documents POSTed to the configured hub URL with
//! positional parameters, as the hub expects them. A batch phase is sent as
//! one `multiCall` request whose single parameter is an array of
//! `{methodName, params}` structs; its result holds one entry per call,
//! `[value]` on success or `{faultCode, faultString}` on failure.

use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::debug;
use xmlrpc::{Request, Transport, Value};

use super::batch::{execute_phased, BatchReport, CallOutcome, Mutation, MutationBatch};
use super::{BuildService, HubError};
use crate::config::HubSettings;
use crate::models::{Build, StageTag};

pub(crate) const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct HubClient {
    http: Client,
    url: String,
}

/// Sends one request over the shared HTTP client.
struct HttpTransport<'a> {
    http: &'a Client,
    url: &'a str,
}

impl Transport for HttpTransport<'_> {
    type Stream = Response;

    fn transmit(
        self,
        request: &Request<'_>,
    ) -> Result<Self::Stream, Box<dyn std::error::Error + Send + Sync>> {
        let mut body = Vec::new();
        request.write_as_xml(&mut body)?;

        let response = self
            .http
            .post(self.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )
            .into());
        }
        Ok(response)
    }
}

impl HubClient {
    pub fn new(settings: &HubSettings) -> Result<Self, HubError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("graffiti/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(HubError::Client)?;

        Ok(Self {
            http,
            url: settings.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, HubError> {
        debug!(method, params = params.len(), "hub call");

        let request = params
            .into_iter()
            .fold(Request::new(method), |request, param| request.arg(param));
        let transport = HttpTransport {
            http: &self.http,
            url: &self.url,
        };

        request.call(transport).map_err(|source| {
            if let Some(fault) = source.fault() {
                return HubError::fault(
                    method,
                    i64::from(fault.fault_code),
                    fault.fault_string.clone(),
                );
            }
            HubError::Call {
                method: method.to_string(),
                source,
            }
        })
    }

    fn run_phase(&self, phase: &[Mutation]) -> Vec<CallOutcome> {
        let calls = phase.iter().map(encode_call).collect();
        match self.call("multiCall", vec![Value::Array(calls)]) {
            Ok(result) => decode_multicall(&result, phase.len()),
            Err(e) => vec![CallOutcome::Failed(e.to_string()); phase.len()],
        }
    }
}

impl BuildService for HubClient {
    fn list_tagged(&self, tag: &StageTag) -> Result<Vec<Build>, HubError> {
        // listTagged(tag, event, inherit, prefix, latest); latest=false since
        // the hub's notion of latest is the most recently tagged build
        let result = self.call(
            "listTagged",
            vec![
                Value::from(tag.as_str()),
                Value::Nil,
                Value::Bool(false),
                Value::Nil,
                Value::Bool(false),
            ],
        )?;
        decode_tagged_builds(&result)
    }

    fn get_build(&self, nvr: &str) -> Result<Option<Build>, HubError> {
        let result = self.call("getBuild", vec![Value::from(nvr)])?;
        decode_build_info(&result)
    }

    fn list_build_tags(&self, build: &Build) -> Result<BTreeSet<StageTag>, HubError> {
        let result = self.call("listTags", vec![Value::from(build.nvr.as_str())])?;
        decode_tag_names(&result)
    }

    fn submit(&self, batch: &MutationBatch) -> BatchReport {
        debug!(calls = batch.len(), url = %self.url, "submitting batch");
        execute_phased(batch, |phase| self.run_phase(phase))
    }
}

/// Positional parameters of a mutation, in the hub's argument order.
fn call_params(mutation: &Mutation) -> Vec<Value> {
    match mutation {
        Mutation::TagBuild { tag, build } => {
            vec![Value::from(tag.as_str()), Value::from(build.as_str())]
        }
        Mutation::UntagBuild { tag, build, strict } => vec![
            Value::from(tag.as_str()),
            Value::from(build.as_str()),
            Value::Bool(*strict),
        ],
        Mutation::AddPackage {
            tag,
            package,
            owner,
        } => vec![
            Value::from(tag.as_str()),
            Value::from(package.as_str()),
            Value::from(owner.as_str()),
        ],
        Mutation::RemovePackage {
            tag,
            package,
            force,
        } => vec![
            Value::from(tag.as_str()),
            Value::from(package.as_str()),
            Value::Bool(*force),
        ],
    }
}

/// One `multiCall` entry.
fn encode_call(mutation: &Mutation) -> Value {
    let mut call = BTreeMap::new();
    call.insert("methodName".to_string(), Value::from(mutation.method()));
    call.insert("params".to_string(), Value::Array(call_params(mutation)));
    Value::Struct(call)
}

fn decode_multicall(result: &Value, expected: usize) -> Vec<CallOutcome> {
    let Value::Array(entries) = result else {
        return vec![
            CallOutcome::Failed("multiCall result is not an array".to_string());
            expected
        ];
    };

    entries
        .iter()
        .map(|entry| match entry {
            Value::Array(_) => CallOutcome::Applied,
            Value::Struct(fault) => {
                let code = match fault.get("faultCode") {
                    Some(Value::Int(code)) => i64::from(*code),
                    Some(Value::Int64(code)) => *code,
                    _ => -1,
                };
                let message = match fault.get("faultString") {
                    Some(Value::String(message)) => message.as_str(),
                    _ => "unknown fault",
                };
                CallOutcome::Failed(format!("fault {code}: {message}"))
            }
            other => CallOutcome::Failed(format!("unexpected multiCall entry: {other:?}")),
        })
        .collect()
}

fn decode_tagged_builds(result: &Value) -> Result<Vec<Build>, HubError> {
    const METHOD: &str = "listTagged";
    array(METHOD, result)?
        .iter()
        .map(|entry| {
            Ok(Build::new(
                str_field(METHOD, entry, "package_name")?,
                id_field(METHOD, entry, "build_id")?,
                str_field(METHOD, entry, "nvr")?,
            ))
        })
        .collect()
}

/// `getBuild` answers nil for an unknown build.
fn decode_build_info(result: &Value) -> Result<Option<Build>, HubError> {
    const METHOD: &str = "getBuild";
    if let Value::Nil = result {
        return Ok(None);
    }
    Ok(Some(Build::new(
        str_field(METHOD, result, "package_name")?,
        id_field(METHOD, result, "id")?,
        str_field(METHOD, result, "nvr")?,
    )))
}

fn decode_tag_names(result: &Value) -> Result<BTreeSet<StageTag>, HubError> {
    const METHOD: &str = "listTags";
    array(METHOD, result)?
        .iter()
        .map(|entry| str_field(METHOD, entry, "name").map(StageTag::from))
        .collect()
}

fn array<'v>(method: &str, value: &'v Value) -> Result<&'v [Value], HubError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(HubError::decode(
            method,
            format!("expected an array, got {other:?}"),
        )),
    }
}

fn field<'v>(method: &str, value: &'v Value, name: &str) -> Result<&'v Value, HubError> {
    match value {
        Value::Struct(members) => members
            .get(name)
            .ok_or_else(|| HubError::decode(method, format!("missing field '{name}'"))),
        other => Err(HubError::decode(
            method,
            format!("expected a struct, got {other:?}"),
        )),
    }
}

fn str_field(method: &str, value: &Value, name: &str) -> Result<String, HubError> {
    match field(method, value, name)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(HubError::decode(
            method,
            format!("field '{name}' is not a string: {other:?}"),
        )),
    }
}

fn id_field(method: &str, value: &Value, name: &str) -> Result<u64, HubError> {
    let id = match field(method, value, name)? {
        Value::Int(id) => i64::from(*id),
        Value::Int64(id) => *id,
        other => {
            return Err(HubError::decode(
                method,
                format!("field '{name}' is not an integer: {other:?}"),
            ))
        }
    };
    u64::try_from(id)
        .map_err(|_| HubError::decode(method, format!("field '{name}' is negative: {id}")))
}
