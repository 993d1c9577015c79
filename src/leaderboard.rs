use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::game::SessionResult;
use crate::store::KvStore;

/// Key of the single record holding the board
pub const LEADERBOARD_KEY: &str = "multiplication_leaderboard";
/// Maximum number of ranked entries kept
pub const CAPACITY: usize = 10;
/// Version written to the persisted record
pub const FORMAT_VERSION: u32 = 1;

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 20;

/// One ranked historical result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub player_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub accuracy: u32,
    /// seconds
    pub time_completed: u64,
    pub date: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn new(player_name: String, result: &SessionResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_name,
            score: result.score,
            total_questions: result.total_questions,
            accuracy: result.accuracy,
            time_completed: result.elapsed_seconds,
            date: Utc::now(),
        }
    }
}

/// Ranking rule: score desc, then accuracy desc, then time asc.
///
/// Equal keys compare `Equal`; callers rely on a stable sort to keep insertion order.
pub fn rank_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.accuracy.cmp(&a.accuracy))
        .then_with(|| a.time_completed.cmp(&b.time_completed))
}

/// Sort by the ranking rule and drop everything past `CAPACITY`
pub fn rank(entries: &mut Vec<LeaderboardEntry>) {
    entries.sort_by(rank_order);
    entries.truncate(CAPACITY);
}

/// Trim and check a player name; returns the trimmed name
pub fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(Error::InvalidName { len });
    }
    Ok(name.to_string())
}

#[derive(Serialize)]
struct StoredBoardRef<'a> {
    version: u32,
    entries: &'a [LeaderboardEntry],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBoard {
    Versioned {
        version: u32,
        entries: Vec<LeaderboardEntry>,
    },
    // unversioned layout: a bare array of entries
    Legacy(Vec<LeaderboardEntry>),
}

pub fn encode(entries: &[LeaderboardEntry]) -> Result<String> {
    Ok(serde_json::to_string(&StoredBoardRef {
        version: FORMAT_VERSION,
        entries,
    })?)
}

pub fn decode(text: &str) -> Result<Vec<LeaderboardEntry>> {
    let stored: StoredBoard =
        serde_json::from_str(text).map_err(|e| Error::PersistenceRead(e.to_string()))?;
    let mut entries = match stored {
        StoredBoard::Versioned { version, entries } if version == FORMAT_VERSION => entries,
        StoredBoard::Versioned { version, .. } => {
            return Err(Error::PersistenceRead(format!(
                "unsupported leaderboard version {}",
                version
            )))
        }
        StoredBoard::Legacy(entries) => {
            info!("migrating unversioned leaderboard ({} entries)", entries.len());
            entries
        }
    };
    rank(&mut entries);
    Ok(entries)
}

/// Ranked top-10 board backed by a key-value store.
///
/// Storage failures are logged and never returned: the in-memory board is
/// always the source of truth for the UI.
#[derive(Debug)]
pub struct Leaderboard<S: KvStore> {
    store: S,
    entries: Vec<LeaderboardEntry>,
}

impl<S: KvStore> Leaderboard<S> {
    /// Create a board and load whatever the store holds
    pub fn open(store: S) -> Self {
        let mut board = Self {
            store,
            entries: Vec::new(),
        };
        board.load();
        board
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reload from the store. A read failure leaves the board empty.
    pub fn load(&mut self) -> &[LeaderboardEntry] {
        self.entries = match self.read_persisted() {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error loading leaderboard: {}", e);
                Vec::new()
            }
        };
        &self.entries
    }

    /// Name a finished session and insert it.
    ///
    /// Returns the zero-based rank of the new entry, or `None` if it did not
    /// make the top `CAPACITY`. Only an invalid name is reported as an error.
    pub fn add_entry(&mut self, player_name: &str, result: &SessionResult) -> Result<Option<usize>> {
        let player_name = validate_name(player_name)?;
        let entry = LeaderboardEntry::new(player_name, result);
        let id = entry.id.clone();

        self.entries.push(entry);
        rank(&mut self.entries);

        if let Err(e) = self.persist() {
            error!("Error adding leaderboard entry: {}", e);
        }

        let placed = self.entries.iter().position(|e| e.id == id);
        info!(
            "leaderboard entry {} -> {}",
            id,
            placed.map_or("not ranked".to_string(), |r| format!("rank {}", r + 1))
        );
        Ok(placed)
    }

    /// Remove every entry. The in-memory board is cleared even if the store fails.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.remove(LEADERBOARD_KEY) {
            error!("Error clearing leaderboard: {}", e);
        }
    }

    fn read_persisted(&self) -> Result<Vec<LeaderboardEntry>> {
        let stored = self
            .store
            .get(LEADERBOARD_KEY)
            .map_err(|e| Error::PersistenceRead(e.to_string()))?;
        match stored {
            Some(text) => decode(&text),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self) -> Result<()> {
        let text = encode(&self.entries).map_err(|e| Error::PersistenceWrite(e.to_string()))?;
        self.store
            .set(LEADERBOARD_KEY, &text)
            .map_err(|e| Error::PersistenceWrite(e.to_string()))
    }
}
