//! Campaign knowledge index for tabletop RPG archives.
//!
//! Lorekeeper stores short text chunks describing the events, characters, and
//! quotes of a campaign, embeds them into a semantic vector space, and answers
//! "find relevant chunks for this query" requests used to ground a
//! conversational assistant. Its second responsibility is entity resolution:
//! when structured session analysis arrives, it decides whether each named
//! character is new or an existing persona under a variant spelling, nickname,
//! or alias, and merges records accordingly.
//!
//! # Architecture
//!
//! - **Storage**: SQLite. Entities (campaigns, sessions, personas, highlights,
//!   quotes, moments) are primary records; chunks are a derived, rebuildable
//!   projection holding text plus a JSON embedding vector.
//! - **Embeddings**: remote provider (Ollama by default) behind the
//!   [`embedding::EmbeddingProvider`] trait, injected at call time.
//! - **Search**: brute-force cosine similarity over a campaign's chunks,
//!   loaded in memory at query time. Valid while corpora stay in the low
//!   thousands of chunks.
//! - **Resolution**: exact / substring / fuzzy / alias cascade, first hit wins.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, and helpers
//! - [`embedding`] — Text-to-vector embedding via a remote provider
//! - [`llm`] — Generative model client: ranked model fallback and JSON recovery
//! - [`campaign`] — Core engine: chunk store, search, resolve, merge, ingest
//! - [`cli`] — Terminal commands over the engine

pub mod campaign;
pub mod cli;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod llm;

pub use error::{Error, Result};
