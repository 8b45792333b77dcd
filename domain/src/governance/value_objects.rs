//! Governance value objects

use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};

/// Identifier of the user a request is billed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whose activity a window counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowScope {
    User(UserId),
    Agent(AgentId),
    Global,
}

/// Length of a sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowSpan {
    Minute,
    Hour,
}

impl WindowSpan {
    pub fn seconds(&self) -> u64 {
        match self {
            WindowSpan::Minute => 60,
            WindowSpan::Hour => 3600,
        }
    }

    pub fn millis(&self) -> i64 {
        self.seconds() as i64 * 1000
    }
}

/// Key of one request-count or cost window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowKey {
    pub scope: WindowScope,
    pub span: WindowSpan,
    /// Cost windows hold dollar amounts; request windows hold hits.
    pub cost: bool,
}

impl WindowKey {
    pub fn requests(scope: WindowScope, span: WindowSpan) -> Self {
        Self {
            scope,
            span,
            cost: false,
        }
    }

    pub fn cost(scope: WindowScope, span: WindowSpan) -> Self {
        Self {
            scope,
            span,
            cost: true,
        }
    }

    /// Flat string form used by persistent stores, e.g. `rate:user:alice:60`.
    pub fn storage_key(&self) -> String {
        let kind = if self.cost { "cost" } else { "rate" };
        let scope = match &self.scope {
            WindowScope::User(user) => format!("user:{}", user),
            WindowScope::Agent(agent) => format!("agent:{}", agent),
            WindowScope::Global => "global".to_string(),
        };
        format!("{}:{}:{}", kind, scope, self.span.seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys() {
        let user = WindowScope::User(UserId::new("alice"));
        assert_eq!(
            WindowKey::requests(user.clone(), WindowSpan::Minute).storage_key(),
            "rate:user:alice:60"
        );
        assert_eq!(
            WindowKey::cost(user, WindowSpan::Hour).storage_key(),
            "cost:user:alice:3600"
        );
        assert_eq!(
            WindowKey::requests(WindowScope::Global, WindowSpan::Minute).storage_key(),
            "rate:global:60"
        );
        assert_eq!(
            WindowKey::requests(WindowScope::Agent(AgentId::new("analyst")), WindowSpan::Minute)
                .storage_key(),
            "rate:agent:analyst:60"
        );
    }
}
