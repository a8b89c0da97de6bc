#![allow(dead_code)]

use async_trait::async_trait;
use dexwire::core::errors::ExchangeError;
use dexwire::core::kernel::clock::local_millis;
use dexwire::core::kernel::{
    ExchangeProfile, Orchestrator, OrchestratorBuilder, RawResponse, Signer, Transport,
    WireRequest,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Base64 seed made of the bytes 1..=32
pub const ED25519_SEED: &str = "AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyA=";

/// One scripted reply for a non-probe request
pub enum Reply {
    Response(RawResponse),
    NetworkFailure(String),
}

/// How the transport answers clock probes
#[derive(Debug, Clone)]
pub enum TimeReply {
    /// `{"serverTime": local + offset}`
    ServerTime { offset_ms: i64 },
    /// Empty 200 response carrying this `Date` header
    DateHeader(String),
    /// Probe fails at the network level
    Unreachable,
}

/// In-memory transport that replays scripted responses.
///
/// Requests to `time_path` are answered from `time_reply` and counted
/// separately; every other request is recorded and consumes the next scripted
/// reply (an empty `{}` once the script runs out).
pub struct ScriptedTransport {
    time_path: String,
    time_reply: Mutex<TimeReply>,
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<WireRequest>>,
    probes: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(time_path: &str) -> Self {
        Self {
            time_path: time_path.to_string(),
            time_reply: Mutex::new(TimeReply::ServerTime { offset_ms: 0 }),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn with_time_reply(self, reply: TimeReply) -> Self {
        *self.time_reply.lock().unwrap() = reply;
        self
    }

    pub fn push(&self, reply: Reply) {
        self.script.lock().unwrap().push_back(reply);
    }

    pub fn push_json(&self, status: u16, body: &str) {
        self.push(Reply::Response(json_response(status, body)));
    }

    pub fn push_text(&self, status: u16, body: &str) {
        self.push(Reply::Response(RawResponse {
            status,
            content_type: Some("text/plain".to_string()),
            date: None,
            body: body.to_string(),
        }));
    }

    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn answer_probe(&self) -> Result<RawResponse, ExchangeError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.time_reply.lock().unwrap().clone() {
            TimeReply::ServerTime { offset_ms } => Ok(json_response(
                200,
                &format!(r#"{{"serverTime":{}}}"#, local_millis() + offset_ms),
            )),
            TimeReply::DateHeader(date) => Ok(RawResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                date: Some(date),
                body: "[]".to_string(),
            }),
            TimeReply::Unreachable => Err(ExchangeError::NetworkError(
                "connection refused".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &WireRequest) -> Result<RawResponse, ExchangeError> {
        if request.path == self.time_path {
            return self.answer_probe();
        }

        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::NetworkFailure(message)) => Err(ExchangeError::NetworkError(message)),
            None => Ok(json_response(200, "{}")),
        }
    }
}

pub fn json_response(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        content_type: Some("application/json".to_string()),
        date: None,
        body: body.to_string(),
    }
}

/// Orchestrator for `profile` wired to a scripted transport
pub fn orchestrator(
    profile: ExchangeProfile,
    transport: &Arc<ScriptedTransport>,
    signer: Option<Arc<dyn Signer>>,
) -> Orchestrator {
    let mut builder =
        OrchestratorBuilder::new(profile).with_transport(transport.clone() as Arc<dyn Transport>);
    if let Some(signer) = signer {
        builder = builder.with_signer(signer);
    }
    builder.build().unwrap()
}

/// Split an encoded string into pairs
pub fn pairs(encoded: &str) -> Vec<(String, String)> {
    encoded
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (p.to_string(), String::new()),
        })
        .collect()
}

pub fn value_of(encoded: &str, key: &str) -> Option<String> {
    pairs(encoded)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Drop the trailing `&signature=...` pair
pub fn strip_signature(encoded: &str) -> &str {
    encoded
        .rsplit_once("&signature=")
        .map_or(encoded, |(canonical, _)| canonical)
}
