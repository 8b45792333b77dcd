//! Mock ports shared by the use case tests.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::reasoning_gateway::{CompletionRequest, GatewayError, ReasoningGateway};
use crate::use_cases::invoke_agent::SharedRegistry;
use async_trait::async_trait;
use conclave_domain::{AgentId, AgentRecord, AgentRegistry};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Scripted answer of one agent.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    Fail(String),
    Delayed(Duration, String),
}

impl Reply {
    /// Text of exactly `chars` characters.
    pub(crate) fn sized(chars: usize) -> Self {
        Reply::Text("x".repeat(chars))
    }
}

/// Gateway answering per agent id and recording every request.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    replies: HashMap<AgentId, Reply>,
    calls: Mutex<Vec<CompletionRequest>>,
    require_credential: bool,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, agent: &str, reply: Reply) -> Self {
        self.replies.insert(AgentId::new(agent), reply);
        self
    }

    /// Reject requests that carry no credential.
    pub(crate) fn keyed(mut self) -> Self {
        self.require_credential = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn called_agents(&self) -> Vec<AgentId> {
        self.calls().into_iter().map(|c| c.agent_id).collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReasoningGateway for ScriptedGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push(request.clone());
        if self.require_credential && request.config.credential.is_none() {
            return Err(GatewayError::MissingCredential(request.agent_id.to_string()));
        }
        match self.replies.get(&request.agent_id) {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Fail(reason)) => Err(GatewayError::RequestFailed {
                status: 500,
                message: reason.clone(),
            }),
            Some(Reply::Delayed(delay, text)) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            None => Ok(format!("answer from {}", request.agent_id)),
        }
    }
}

/// Logger keeping every event in memory.
#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<(&'static str, Value)>>,
}

impl RecordingLogger {
    pub(crate) fn events(&self, event_type: &str) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == event_type)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}

pub(crate) fn shared_registry(agents: Vec<AgentRecord>) -> SharedRegistry {
    let mut registry = AgentRegistry::new();
    for agent in agents {
        registry.register(agent);
    }
    Arc::new(RwLock::new(registry))
}

pub(crate) fn default_registry() -> SharedRegistry {
    Arc::new(RwLock::new(AgentRegistry::with_default_roster()))
}
