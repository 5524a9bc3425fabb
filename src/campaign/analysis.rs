//! Session-analysis payload: the structured contract between the generative
//! model and the ingestion orchestrator.
//!
//! Remote models are loose about shapes, so highlight and quote entries
//! accept either bare strings or structured objects (untagged). Field
//! accessors normalize both forms.

use serde::{Deserialize, Serialize};

use crate::campaign::types::Role;

/// Full analysis of one session, as produced by the generative model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionAnalysis {
    /// Narrative summary of the session. Overwrites the stored summary.
    #[serde(default)]
    pub summary: String,
    /// Major plot events not tied to a single character.
    #[serde(default)]
    pub highlights: Vec<HighlightEntry>,
    /// Major group setbacks.
    #[serde(default)]
    pub low_points: Vec<HighlightEntry>,
    #[serde(default)]
    pub memorable_quotes: Vec<QuoteEntry>,
    /// Every character identified in the session.
    #[serde(default)]
    pub personas: Vec<PersonaMention>,
    /// Key epic or funny moments.
    #[serde(default)]
    pub moments: Vec<MomentEntry>,
}

/// One mentioned character with whatever attributes the model could infer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaMention {
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub voice_description: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default, alias = "class_name")]
    pub class: Option<String>,
    #[serde(default)]
    pub alignment: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Actions and moments unique to this character.
    #[serde(default)]
    pub highlights: Vec<HighlightEntry>,
    #[serde(default)]
    pub low_points: Vec<HighlightEntry>,
}

/// A highlight, either a bare string or `{name, highlight}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HighlightEntry {
    Text(String),
    Structured {
        #[serde(default)]
        name: Option<String>,
        #[serde(alias = "text")]
        highlight: String,
    },
}

impl HighlightEntry {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Structured { highlight, .. } => highlight,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Structured { name, .. } => name.as_deref(),
        }
    }
}

/// A quote, either a bare string or `{speaker, quote}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteEntry {
    Text(String),
    Structured {
        #[serde(default)]
        speaker: Option<String>,
        #[serde(alias = "text")]
        quote: String,
    },
}

impl QuoteEntry {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Structured { quote, .. } => quote,
        }
    }

    pub fn speaker(&self) -> &str {
        match self {
            Self::Text(_) => "Unknown",
            Self::Structured { speaker, .. } => speaker.as_deref().unwrap_or("Unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentEntry {
    pub title: String,
    pub description: String,
}
