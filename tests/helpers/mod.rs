#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use lorekeeper::campaign::store::{self, NewPersona};
use lorekeeper::db;
use lorekeeper::embedding::EmbeddingProvider;
use lorekeeper::{Error, Result};
use rusqlite::Connection;

pub const DIMS: usize = 8;

/// Open a fresh in-memory database with the schema applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Deterministic embedder. Each distinct text maps to a fixed vector, so a
/// query embeds identically to a chunk with the same text. Counts calls and
/// can be switched into a failing mode.
pub struct FakeEmbedder {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let embedder = Self::new();
        embedder.fail.store(true, Ordering::SeqCst);
        embedder
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for FakeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Provider("embedding backend offline".into()));
        }
        Ok(embedding_for(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// The vector [`FakeEmbedder`] produces for `text`: a unit spike whose
/// position depends on the text's bytes, plus a smaller length-dependent
/// component so near-collisions still differ.
pub fn embedding_for(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    let spike = text.bytes().map(usize::from).sum::<usize>() % DIMS;
    v[spike] = 1.0;
    v[(spike + text.len()) % DIMS] += 0.25;
    v
}

pub fn seed_campaign(conn: &Connection) -> i64 {
    store::create_campaign(conn, "Curse of Strahd", Some("Gothic horror in Barovia")).unwrap()
}

pub fn seed_session(conn: &Connection, campaign_id: i64, name: &str) -> i64 {
    store::create_session(conn, campaign_id, name).unwrap()
}

pub fn seed_persona(conn: &Connection, campaign_id: i64, name: &str) -> i64 {
    let new = NewPersona {
        name: name.to_string(),
        ..NewPersona::default()
    };
    store::insert_persona(conn, campaign_id, None, &new).unwrap()
}
