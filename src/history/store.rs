//! Per-identity conversation transcripts.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One utterance in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    /// Build a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    /// Build an assistant turn.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// Handle to one identity's transcript.
///
/// Cheap to clone; every clone shares the same underlying turn list, so
/// concurrent sessions for one identity append to a single history.
#[derive(Debug, Clone)]
pub struct Transcript {
    inner: Arc<TranscriptInner>,
}

#[derive(Debug)]
struct TranscriptInner {
    /// Identity the transcript belongs to.
    identity: String,
    /// Ordered turns, append-only.
    turns: RwLock<Vec<Turn>>,
}

impl Transcript {
    fn new(identity: String) -> Self {
        Self {
            inner: Arc::new(TranscriptInner {
                identity,
                turns: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Identity this transcript belongs to.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.inner.identity
    }

    /// Append a user turn.
    pub fn append_user(&self, text: impl Into<String>) {
        self.append(Turn::user(text));
    }

    /// Append an assistant turn.
    pub fn append_assistant(&self, text: impl Into<String>) {
        self.append(Turn::assistant(text));
    }

    /// Append one turn to the end of the transcript.
    pub fn append(&self, turn: Turn) {
        self.inner.turns.write().unwrap().push(turn);
    }

    /// Ordered copy of the transcript contents.
    ///
    /// Reflects every append that completed before the call returned.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.inner.turns.read().unwrap().clone()
    }

    /// Number of turns recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.turns.read().unwrap().len()
    }

    /// Check whether the transcript has no turns yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide store of transcripts, keyed by identity.
///
/// Transcripts are created on first use and live until the process exits.
/// There is no eviction and no size cap: history must survive any number of
/// reconnects, so memory grows with the number of identities and turns.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    inner: Arc<HistoryStoreInner>,
}

#[derive(Debug)]
struct HistoryStoreInner {
    transcripts: RwLock<HashMap<String, Transcript>>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HistoryStoreInner {
                transcripts: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Get the transcript for an identity, creating an empty one if absent.
    ///
    /// Two sessions racing on the same identity always end up sharing one
    /// transcript; the slot is re-checked under the write lock before insert.
    #[must_use]
    pub fn get_or_create(&self, identity: &str) -> Transcript {
        {
            let guard = self.inner.transcripts.read().unwrap();
            if let Some(transcript) = guard.get(identity) {
                return transcript.clone();
            }
        }

        let mut guard = self.inner.transcripts.write().unwrap();
        guard
            .entry(identity.to_string())
            .or_insert_with(|| Transcript::new(identity.to_string()))
            .clone()
    }

    /// Get the transcript for an identity if one exists.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<Transcript> {
        self.inner.transcripts.read().unwrap().get(identity).cloned()
    }

    /// Number of identities with a transcript.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.transcripts.read().unwrap().len()
    }

    /// Check whether the store holds no transcripts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_append_order() {
        let store = HistoryStore::new();
        let transcript = store.get_or_create("alice");

        assert!(transcript.is_empty());

        transcript.append_user("Hello");
        transcript.append_assistant("Hi there!");
        transcript.append_user("How are you?");
        transcript.append_assistant("Fine, thanks.");

        let turns = transcript.snapshot();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0], Turn::user("Hello"));
        assert_eq!(turns[1], Turn::assistant("Hi there!"));
        assert_eq!(turns[2].speaker, Speaker::User);
        assert_eq!(turns[3].speaker, Speaker::Assistant);
    }

    #[test]
    fn test_store_shares_one_transcript_per_identity() {
        let store = HistoryStore::new();

        let first = store.get_or_create("bob");
        first.append_user("remember this");

        let second = store.get_or_create("bob");
        assert_eq!(second.len(), 1);
        assert_eq!(store.len(), 1);

        second.append_assistant("noted");
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_identities_are_isolated() {
        let store = HistoryStore::new();

        store.get_or_create("alice").append_user("a");
        store.get_or_create("bob").append_user("b");

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("alice").unwrap().len(), 1);
        assert_eq!(store.get("bob").unwrap().len(), 1);
        assert!(store.get("carol").is_none());
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let store = HistoryStore::new();
        let transcript = store.get_or_create("alice");

        transcript.append_user("one");
        let snapshot = transcript.snapshot();

        transcript.append_assistant("two");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_concurrent_get_or_create_is_atomic() {
        let store = HistoryStore::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let transcript = store.get_or_create("shared");
                    transcript.append_user(format!("message {i}"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("shared").unwrap().len(), 8);
    }
}
