//! Request/response envelope for off-thread hosts.
//!
//! An interactive host runs synthesis off its main thread as a bounded,
//! non-cancellable unit of work keyed by a request id. This module defines
//! the envelope and a synchronous dispatcher; transport (worker queues,
//! processes, sockets) is the host's business. Independent requests may run
//! concurrently; every call builds its own state from the seed, nothing is
//! shared.

use serde::{Deserialize, Serialize};

use crate::synth::{synthesize, SynthesisRequest};

/// Commands the dispatcher understands.
pub const COMMAND_SYNTHESIZE: &str = "synthesize";

/// Envelope for one host request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRequest {
    /// Correlation id echoed back in the response.
    pub request_id: String,
    /// Command name, e.g. [`COMMAND_SYNTHESIZE`].
    pub command: String,
    /// Command parameters.
    pub parameters: serde_json::Value,
}

/// Envelope for one host response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostResponse {
    /// Correlation id of the originating request.
    pub request_id: String,
    /// Whether the command completed.
    pub success: bool,
    /// The command result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Human-readable failure description on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl HostResponse {
    fn ok(request_id: String, result: serde_json::Value) -> Self {
        Self {
            request_id,
            success: true,
            result: Some(result),
            error_message: None,
        }
    }

    fn err(request_id: String, message: String) -> Self {
        Self {
            request_id,
            success: false,
            result: None,
            error_message: Some(message),
        }
    }
}

/// Dispatches one request synchronously.
///
/// Never panics on malformed input: parameter and serialization failures
/// come back as unsuccessful responses carrying the error text.
#[must_use]
pub fn handle_request(request: &HostRequest) -> HostResponse {
    let id = request.request_id.clone();

    if request.command != COMMAND_SYNTHESIZE {
        return HostResponse::err(
            id,
            crate::KardiaError::UnknownCommand(request.command.clone()).to_string(),
        );
    }

    let synth_request: SynthesisRequest = match serde_json::from_value(request.parameters.clone())
    {
        Ok(r) => r,
        Err(e) => return HostResponse::err(id, format!("invalid parameters: {e}")),
    };

    match synthesize(&synth_request) {
        Ok(record) => match serde_json::to_value(&record) {
            Ok(value) => HostResponse::ok(id, value),
            Err(e) => HostResponse::err(id, format!("serialization failed: {e}")),
        },
        Err(e) => HostResponse::err(id, e.to_string()),
    }
}
