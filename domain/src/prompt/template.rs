//! Prompt templates for agent invocations and consultations

use crate::agent::entities::AgentRecord;
use crate::agent::value_objects::CollaborationHint;
use crate::consultation::entities::ConsultationEntry;
use crate::core::string::{excerpt, truncate};
use std::collections::BTreeMap;

/// Characters kept from each peer consultation.
pub const CONSULTATION_EXCERPT_CHARS: usize = 200;
/// Characters kept from each prior-interaction memory entry.
pub const MEMORY_ENTRY_CHARS: usize = 300;

/// Everything that goes into an enriched invocation prompt.
#[derive(Debug, Default)]
pub struct PromptParts<'a> {
    pub directives: &'a [String],
    pub hints: &'a [CollaborationHint],
    /// Already limited to the last N entries by the caller.
    pub memory: &'a [String],
    pub consultations: &'a [ConsultationEntry],
    pub context: Option<&'a BTreeMap<String, String>>,
    pub query: &'a str,
}

/// Templates for generating prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt of an agent: its template override, else the built-in framing.
    pub fn system_prompt(agent: &AgentRecord, template: Option<&str>) -> String {
        match template {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => format!(
                "{}\nYou are {} in a team of specialist agents.",
                agent.specialization.framing(),
                agent.display_name
            ),
        }
    }

    /// Query a consultant receives when `requester` asks it for guidance.
    ///
    /// Without a requester the consultant advises whoever handles the request.
    pub fn consultation_prompt(
        requester: Option<&AgentRecord>,
        consultant: &AgentRecord,
        query: &str,
    ) -> String {
        let (who, subject) = match requester {
            Some(agent) => (
                format!(
                    "Agent {} ({})",
                    agent.display_name,
                    agent.specialization.role()
                ),
                agent.display_name.clone(),
            ),
            None => (
                "Another specialist".to_string(),
                "they".to_string(),
            ),
        };
        format!(
            r#"{} is working on the following request:

{}

Provide guidance from your specialty as {}. Focus on what {} should consider,
watch out for, or include. Keep it short and concrete; do not answer the whole request."#,
            who,
            query,
            consultant.specialization.role(),
            subject,
        )
    }

    /// Enriched user prompt of a primary invocation.
    ///
    /// Sections appear in a fixed order: guidance, memory, peer consultations,
    /// context, then the query. Empty sections are left out.
    pub fn enriched_prompt(parts: &PromptParts<'_>) -> String {
        let mut prompt = String::new();

        if !parts.directives.is_empty() || !parts.hints.is_empty() {
            prompt.push_str("## Guidance\n");
            for directive in parts.directives {
                prompt.push_str(&format!("- {}\n", directive.trim()));
            }
            for hint in parts.hints {
                match &hint.partner {
                    Some(partner) => {
                        prompt.push_str(&format!("- With {}: {}\n", partner, hint.guidance.trim()))
                    }
                    None => prompt.push_str(&format!("- {}\n", hint.guidance.trim())),
                }
            }
            prompt.push('\n');
        }

        if !parts.memory.is_empty() {
            prompt.push_str("## Previous interactions\n");
            for entry in parts.memory {
                prompt.push_str(&format!("- {}\n", truncate(entry.trim(), MEMORY_ENTRY_CHARS)));
            }
            prompt.push('\n');
        }

        let answered: Vec<&ConsultationEntry> =
            parts.consultations.iter().filter(|c| !c.is_empty()).collect();
        if !answered.is_empty() {
            prompt.push_str("## Peer consultations\n");
            for consultation in answered {
                prompt.push_str(&format!(
                    "- {}: {}\n",
                    consultation.consultant,
                    excerpt(consultation.response.trim(), CONSULTATION_EXCERPT_CHARS)
                ));
            }
            prompt.push('\n');
        }

        if let Some(context) = parts.context
            && !context.is_empty()
        {
            prompt.push_str("## Context\n");
            for (key, value) in context {
                prompt.push_str(&format!("- {}: {}\n", key, value));
            }
            prompt.push('\n');
        }

        prompt.push_str("## Request\n");
        prompt.push_str(parts.query.trim());
        prompt
    }
}
