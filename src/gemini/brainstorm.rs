//! Project brainstorm: business goal → structured project proposals.
//!
//! The request asks the text model for JSON that follows
//! [`response_schema`]; [`parse_proposals`] decodes that JSON and checks every
//! proposal before it is handed to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::envelope::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use super::error::ApiError;

/// Number of proposals requested per goal.
pub const PROPOSAL_COUNT: usize = 3;

/// Number of deliverables every proposal must list.
pub const DELIVERABLES_PER_PROPOSAL: usize = 3;

const SYSTEM_PROMPT: &str = "You are a senior Solutions Architect at a top-tier tech \
consultancy. Your task is to transform a high-level business goal into three distinct, \
structured project proposals suitable for client presentation. Each proposal must include \
a compelling title, a realistic tech stack, and three precise, high-impact key deliverables. \
Respond strictly as a JSON array.";

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// One project idea returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// Client-facing project title.
    pub title: String,
    /// Comma-separated main technologies.
    pub tech_stack: String,
    /// Exactly [`DELIVERABLES_PER_PROPOSAL`] measurable deliverables.
    pub deliverables: Vec<String>,
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  Technology stack: {}", self.tech_stack)?;
        write!(f, "  Key deliverables:")?;
        for deliverable in &self.deliverables {
            write!(f, "\n    - {deliverable}")?;
        }
        Ok(())
    }
}

/// Render proposals as numbered plain-text cards (`#1: …`).
pub fn render_proposals(proposals: &[Proposal]) -> String {
    proposals
        .iter()
        .enumerate()
        .map(|(i, p)| format!("#{}: {p}", i + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// The user turn sent for `goal`.
pub fn user_prompt(goal: &str) -> String {
    format!(
        "The client's primary business goal is: \"{goal}\". Generate {PROPOSAL_COUNT} distinct project ideas."
    )
}

/// Schema of the JSON array the model must return.
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "A compelling, client-facing title for the project."
                },
                "techStack": {
                    "type": "STRING",
                    "description": "A concise list of main technologies (e.g., 'React, Python/Django, PostgreSQL, AWS Lambda')."
                },
                "deliverables": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Exactly three specific, measurable deliverables."
                }
            },
            "propertyOrdering": ["title", "techStack", "deliverables"]
        }
    })
}

/// Build the `generateContent` body for `goal` (already trimmed).
pub fn build_request(goal: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(user_prompt(goal))],
        system_instruction: Some(Content::text(SYSTEM_PROMPT)),
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".into()),
            response_schema: Some(response_schema()),
            ..Default::default()
        }),
        model: None,
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Decode and validate the proposals carried by `response`.
///
/// Fails with [`ApiError::MalformedResponse`] when the text part is missing,
/// is not a JSON array of proposals, is empty, or any proposal has a blank
/// title / tech stack or a deliverable count other than
/// [`DELIVERABLES_PER_PROPOSAL`].
pub fn parse_proposals(response: &GenerateContentResponse) -> Result<Vec<Proposal>, ApiError> {
    let text = response.first_text()?;

    let proposals: Vec<Proposal> = serde_json::from_str(text.trim()).map_err(|e| {
        ApiError::MalformedResponse(format!("proposal JSON does not match schema: {e}"))
    })?;

    if proposals.is_empty() {
        return Err(ApiError::MalformedResponse("no proposals returned".into()));
    }
    if proposals.len() != PROPOSAL_COUNT {
        log::warn!(
            "expected {PROPOSAL_COUNT} proposals, model returned {}",
            proposals.len()
        );
    }

    for (index, proposal) in proposals.iter().enumerate() {
        validate(proposal, index)?;
    }

    Ok(proposals)
}

fn validate(proposal: &Proposal, index: usize) -> Result<(), ApiError> {
    let n = index + 1;
    if proposal.title.trim().is_empty() {
        return Err(ApiError::MalformedResponse(format!("proposal {n} has no title")));
    }
    if proposal.tech_stack.trim().is_empty() {
        return Err(ApiError::MalformedResponse(format!(
            "proposal {n} has no tech stack"
        )));
    }
    if proposal.deliverables.len() != DELIVERABLES_PER_PROPOSAL {
        return Err(ApiError::MalformedResponse(format!(
            "proposal {n} lists {} deliverables, expected {DELIVERABLES_PER_PROPOSAL}",
            proposal.deliverables.len()
        )));
    }
    if proposal.deliverables.iter().any(|d| d.trim().is_empty()) {
        return Err(ApiError::MalformedResponse(format!(
            "proposal {n} has a blank deliverable"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
