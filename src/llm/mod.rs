//! Generation client for session analysis.
//!
//! Talks to Ollama's `/api/generate` endpoint with a ranked list of models.
//! Rate-limit responses get a bounded fixed-delay retry against the same
//! model; any other failure falls through to the next model in the list. The
//! last model's error is returned if every model fails.

pub mod recover;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::campaign::analysis::SessionAnalysis;
use crate::config::GenerationConfig;
use crate::error::{Error, Result};

/// Instruction block prepended to every transcript.
pub const SESSION_ANALYSIS_PROMPT: &str = "\
You are an archivist for a tabletop RPG campaign. Analyze the session \
transcript below and respond with a single JSON object, no prose, with these \
keys:
  \"summary\": a narrative summary of the session (3-6 sentences),
  \"highlights\": major plot events, as strings,
  \"low_points\": major setbacks for the group, as strings,
  \"memorable_quotes\": objects with \"speaker\" and \"quote\",
  \"personas\": every character in the session, as objects with \"name\" and \
any of \"role\" (PC, NPC, DM, Monster), \"player_name\", \"description\", \
\"voice_description\", \"gender\", \"race\", \"class\", \"level\", \
\"alignment\", \"status\", \"faction\", \"aliases\", \"highlights\", \
\"low_points\",
  \"moments\": key epic or funny moments, as objects with \"title\" and \
\"description\".
Use names exactly as they appear in the transcript.";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct GenerationClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    models: Vec<String>,
    retry_max_attempts: u32,
    retry_delay: Duration,
}

impl GenerationClient {
    pub fn new(config: &GenerationConfig) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/generate", config.host.trim_end_matches('/')),
            models: config.models.clone(),
            retry_max_attempts: config.retry_max_attempts.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        })
    }

    /// Analyze a session transcript into the structured payload.
    pub fn analyze_session(&self, transcript: &str) -> Result<SessionAnalysis> {
        let prompt = format!("{SESSION_ANALYSIS_PROMPT}\n\nTranscript:\n{transcript}");
        let raw = self.generate(&prompt)?;
        parse_analysis(&raw)
    }

    /// Run the prompt against each configured model in order until one
    /// succeeds.
    pub fn generate(&self, prompt: &str) -> Result<String> {
        let mut last_err = Error::Provider("no generation models configured".into());
        for model in &self.models {
            match self.generate_with_model(model, prompt) {
                Ok(text) => return Ok(text),
                Err(err) => {
                    warn!(model = %model, error = %err, "generation failed, trying next model");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    fn generate_with_model(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            format: "json",
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let response = self
                .http
                .post(&self.endpoint)
                .json(&request)
                .send()
                .map_err(|e| Error::Provider(format!("generation request failed: {e}")))?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt < self.retry_max_attempts {
                    debug!(model = %model, attempt, "rate limited, backing off");
                    std::thread::sleep(self.retry_delay);
                    continue;
                }
                return Err(Error::Provider(format!(
                    "model {model} rate limited after {attempt} attempts"
                )));
            }
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(Error::Provider(format!(
                    "generation request returned HTTP {status}: {body}"
                )));
            }

            let parsed: GenerateResponse = response
                .json()
                .map_err(|e| Error::Provider(format!("malformed generation response: {e}")))?;
            return Ok(parsed.response);
        }
    }
}

/// Parse model output into a [`SessionAnalysis`], falling back to recovery
/// parsing when the strict parse fails.
pub fn parse_analysis(raw: &str) -> Result<SessionAnalysis> {
    match serde_json::from_str(raw) {
        Ok(analysis) => Ok(analysis),
        Err(_) => {
            let value = recover::clean_and_parse_json(raw)?;
            serde_json::from_value(value)
                .map_err(|e| Error::Parse(format!("analysis payload has wrong shape: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_payload_parses() {
        let raw = r#"{"summary": "The party rested.", "personas": [{"name": "Grog"}]}"#;
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.summary, "The party rested.");
        assert_eq!(analysis.personas.len(), 1);
    }

    #[test]
    fn fenced_payload_parses_via_recovery() {
        let raw = "```json\n{\"summary\": \"Fenced output\"}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.summary, "Fenced output");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_analysis("no json here at all").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
