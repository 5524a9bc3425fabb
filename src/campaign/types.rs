//! Core campaign type definitions.
//!
//! Defines [`Role`], [`ProcessingStatus`] (the ingestion state machine),
//! [`SourceType`] (chunk provenance), [`HighlightKind`], and the row structs
//! for the primary tables. All cross-entity references are integer IDs;
//! lookups go through [`crate::campaign::store`].

use serde::{Deserialize, Serialize};

/// Character role within a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Player character.
    #[serde(rename = "PC")]
    Pc,
    /// Non-player character.
    #[serde(rename = "NPC")]
    Npc,
    /// Dungeon master / game master.
    #[serde(rename = "DM")]
    Dm,
    Monster,
}

impl Role {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pc => "PC",
            Self::Npc => "NPC",
            Self::Dm => "DM",
            Self::Monster => "Monster",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PC" => Ok(Self::Pc),
            "NPC" => Ok(Self::Npc),
            "DM" => Ok(Self::Dm),
            "Monster" => Ok(Self::Monster),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Session processing lifecycle.
///
/// Ingestion walks `Resolving -> Persisting -> Indexing -> Completed`;
/// `Error` is terminal and reachable from any step. `Pending` and `Uploaded`
/// precede ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Uploaded,
    Resolving,
    Persisting,
    Indexing,
    Completed,
    Error,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploaded => "uploaded",
            Self::Resolving => "resolving",
            Self::Persisting => "persisting",
            Self::Indexing => "indexing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProcessingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "uploaded" => Ok(Self::Uploaded),
            "resolving" => Ok(Self::Resolving),
            "persisting" => Ok(Self::Persisting),
            "indexing" => Ok(Self::Indexing),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            _ => Err(format!("unknown processing status: {s}")),
        }
    }
}

/// Provenance of a stored chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Persona,
    SessionSummary,
    Highlight,
    Quote,
    Moment,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persona => "persona",
            Self::SessionSummary => "session_summary",
            Self::Highlight => "highlight",
            Self::Quote => "quote",
            Self::Moment => "moment",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persona" => Ok(Self::Persona),
            "session_summary" => Ok(Self::SessionSummary),
            "highlight" => Ok(Self::Highlight),
            "quote" => Ok(Self::Quote),
            "moment" => Ok(Self::Moment),
            _ => Err(format!("unknown source type: {s}")),
        }
    }
}

/// Highlights and low points share one table, split by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    High,
    Low,
}

impl HighlightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub campaign_id: i64,
    pub name: String,
    pub summary: Option<String>,
    pub status: ProcessingStatus,
    pub error_message: Option<String>,
    pub created_at: String,
}

/// A campaign character record.
///
/// `id` is stable for the life of the entity and `campaign_id` never changes.
/// Highlights and quotes hold a nullable back-reference to a persona; the
/// persona never holds live pointers to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: i64,
    pub campaign_id: i64,
    /// Session that first introduced this persona, if known.
    pub session_id: Option<i64>,
    pub name: String,
    pub role: Role,
    pub description: Option<String>,
    pub voice_description: Option<String>,
    pub gender: Option<String>,
    pub race: Option<String>,
    /// Character class (e.g. Wizard, Fighter).
    pub class: Option<String>,
    pub level: Option<i64>,
    pub alignment: Option<String>,
    /// Alive, Dead, Missing, Captured, and so on.
    pub status: String,
    pub faction: Option<String>,
    /// Known nicknames and alternate spellings, stored as a JSON array.
    pub aliases: Vec<String>,
    pub player_name: Option<String>,
    pub summary: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub id: i64,
    pub text: String,
    /// Display name, usually the character the highlight belongs to.
    pub name: Option<String>,
    pub kind: HighlightKind,
    pub session_id: i64,
    pub persona_id: Option<i64>,
    pub campaign_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    /// Captured even when not linked to a persona.
    pub speaker_name: Option<String>,
    pub session_id: i64,
    pub persona_id: Option<i64>,
    pub campaign_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    pub id: i64,
    pub session_id: i64,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub created_at: String,
}

/// Parse a raw aliases column into a list of strings.
///
/// One failure policy: NULL, empty, or malformed JSON all yield an empty list.
pub fn parse_aliases(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !s.trim().is_empty() => {
            serde_json::from_str::<Vec<String>>(s).unwrap_or_default()
        }
        _ => Vec::new(),
    }
}
