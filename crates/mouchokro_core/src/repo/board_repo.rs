//! Typed persistence of the two board records.
//!
//! # Responsibility
//! - Encode/decode `Topic` and the member collection as JSON under fixed keys.
//! - Turn storage and decoding failures into "absent" on load.
//!
//! # Invariants
//! - An empty stored collection loads as `Some(vec![])`, never as absent.
//! - Loaded collections never contain two members with the same id.

use crate::model::member::{Member, MemberId};
use crate::model::topic::Topic;
use crate::repo::kv_repo::{KvStore, RepoResult};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

/// Storage key of the topic record.
pub const TOPIC_KEY: &str = "mouchokro_topic";
/// Storage key of the member collection record.
pub const MEMBERS_KEY: &str = "mouchokro_members";

/// Board state repository over any key-value store.
pub struct BoardStateRepository<S: KvStore> {
    store: S,
}

impl<S: KvStore> BoardStateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Loads the topic, or `None` when missing, unreadable or malformed.
    pub fn load_topic(&self) -> Option<Topic> {
        self.load_record(TOPIC_KEY)
    }

    /// Loads the member collection, or `None` when missing, unreadable or
    /// malformed.
    pub fn load_members(&self) -> Option<Vec<Member>> {
        let members: Vec<Member> = self.load_record(MEMBERS_KEY)?;
        Some(dedupe_members(members))
    }

    pub fn save_topic(&mut self, topic: &Topic) -> RepoResult<()> {
        self.save_record(TOPIC_KEY, topic)
    }

    pub fn save_members(&mut self, members: &[Member]) -> RepoResult<()> {
        self.save_record(MEMBERS_KEY, members)
    }

    fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.load_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(
                    "event=record_load module=repo status=error key={} error_code=store_unavailable error={}",
                    key, err
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event=record_load module=repo status=error key={} error_code=record_corrupt error={}",
                    key, err
                );
                None
            }
        }
    }

    fn save_record<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> RepoResult<()> {
        let raw = serde_json::to_string(value)?;
        self.store.save_raw(key, &raw)
    }
}

/// Keeps the first member for every id and drops later duplicates.
fn dedupe_members(members: Vec<Member>) -> Vec<Member> {
    let total = members.len();
    let mut seen: HashSet<MemberId> = HashSet::with_capacity(total);
    let unique: Vec<Member> = members
        .into_iter()
        .filter(|member| seen.insert(member.id))
        .collect();

    if unique.len() != total {
        warn!(
            "event=record_load module=repo status=repaired key={} dropped_duplicates={}",
            MEMBERS_KEY,
            total - unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::{BoardStateRepository, MEMBERS_KEY, TOPIC_KEY};
    use crate::model::member::Member;
    use crate::model::position::Position;
    use crate::model::topic::Topic;
    use crate::repo::kv_repo::MemoryKvStore;
    use uuid::Uuid;

    #[test]
    fn missing_records_load_as_absent() {
        let repo = BoardStateRepository::new(MemoryKvStore::new());
        assert_eq!(repo.load_topic(), None);
        assert_eq!(repo.load_members(), None);
    }

    #[test]
    fn corrupt_json_loads_as_absent() {
        let store = MemoryKvStore::new()
            .with_entry(TOPIC_KEY, "{not json")
            .with_entry(MEMBERS_KEY, "{\"title\":\"wrong shape\"}");
        let repo = BoardStateRepository::new(store);
        assert_eq!(repo.load_topic(), None);
        assert_eq!(repo.load_members(), None);
    }

    #[test]
    fn null_topic_loads_as_absent() {
        let repo = BoardStateRepository::new(MemoryKvStore::new().with_entry(TOPIC_KEY, "null"));
        assert_eq!(repo.load_topic(), None);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let id = Uuid::new_v4();
        let mut first = Member::blank(id, Position::ORIGIN);
        first.name = "first".to_string();
        let mut second = Member::blank(id, Position::ORIGIN);
        second.name = "second".to_string();
        let raw = serde_json::to_string(&vec![first, second]).unwrap();

        let repo = BoardStateRepository::new(MemoryKvStore::new().with_entry(MEMBERS_KEY, raw));
        let members = repo.load_members().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "first");
    }

    #[test]
    fn save_writes_json_text_under_fixed_keys() {
        let mut repo = BoardStateRepository::new(MemoryKvStore::new());
        repo.save_topic(&Topic::new("T", "D")).unwrap();
        repo.save_members(&[]).unwrap();

        let store = repo.into_store();
        assert_eq!(
            store.get(TOPIC_KEY),
            Some("{\"title\":\"T\",\"description\":\"D\"}")
        );
        assert_eq!(store.get(MEMBERS_KEY), Some("[]"));
    }
}
