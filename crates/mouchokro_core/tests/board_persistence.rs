use mouchokro_core::{
    compute_placement, open_store, BoardService, BoardStateRepository, KvStore, Member,
    MemberPatch, MemoryKvStore, Position, RepoError, RepoResult, SqliteKvStore, Topic, TopicPatch, Vote, MEMBERS_KEY,
    TOPIC_KEY,
};
use uuid::Uuid;

/// Store whose reads and writes always fail.
struct BrokenStore;

impl KvStore for BrokenStore {
    fn load_raw(&self, _key: &str) -> RepoResult<Option<String>> {
        Err(RepoError::Db(mouchokro_core::db::DbError::Sqlite(
            rusqlite::Error::QueryReturnedNoRows,
        )))
    }

    fn save_raw(&mut self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(RepoError::Db(mouchokro_core::db::DbError::Sqlite(
            rusqlite::Error::QueryReturnedNoRows,
        )))
    }
}

#[test]
fn topic_round_trips_through_sqlite() {
    let mut repo = BoardStateRepository::new(SqliteKvStore::open_in_memory().unwrap());
    repo.save_topic(&Topic::new("T", "D")).unwrap();

    assert_eq!(repo.load_topic(), Some(Topic::new("T", "D")));
}

#[test]
fn empty_member_collection_is_distinct_from_absent() {
    let mut repo = BoardStateRepository::new(SqliteKvStore::open_in_memory().unwrap());
    assert_eq!(repo.load_members(), None);

    repo.save_members(&[]).unwrap();
    assert_eq!(repo.load_members(), Some(Vec::new()));
}

#[test]
fn member_collection_round_trips_in_order() {
    let mut repo = BoardStateRepository::new(SqliteKvStore::open_in_memory().unwrap());
    let members: Vec<Member> = (0..3)
        .map(|i| {
            let mut member = Member::blank(Uuid::new_v4(), Position::new(i as f64, -(i as f64)));
            member.name = format!("member-{i}");
            member.score = i;
            member
        })
        .collect();

    repo.save_members(&members).unwrap();
    assert_eq!(repo.load_members(), Some(members));
}

#[test]
fn board_state_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let (id, anchor) = {
        let mut board = BoardService::open(SqliteKvStore::open(&path).unwrap());
        board.set_topic(TopicPatch {
            title: Some("বাজেট".to_string()),
            description: Some("আলোচনা".to_string()),
        });
        let id = board.add_member();
        board.update_member(id, MemberPatch::name("Rina"));
        board.vote(id, Vote::Up);
        board.drag_member(id, 15.0, -5.0);
        board.pan_board(300.0, 300.0);
        let anchor = board.member(id).unwrap().anchor();
        (id, anchor)
    };

    let board = BoardService::open(SqliteKvStore::open(&path).unwrap());
    assert_eq!(board.topic(), &Topic::new("বাজেট", "আলোচনা"));
    let member = board.member(id).expect("member should be rehydrated");
    assert_eq!(member.name, "Rina");
    assert_eq!(member.score, 1);
    assert_eq!(member.anchor(), anchor);
    assert_eq!(board.pan_offset(), Position::ORIGIN);
}

#[test]
fn every_mutation_writes_full_state() {
    let mut board = BoardService::open(MemoryKvStore::new());
    assert!(board.store().is_empty());

    let id = board.add_member();
    let stored: Vec<Member> =
        serde_json::from_str(board.store().get(MEMBERS_KEY).unwrap()).unwrap();
    assert_eq!(stored, board.members());

    board.update_member(id, MemberPatch::opinion("opinion text"));
    let stored: Vec<Member> =
        serde_json::from_str(board.store().get(MEMBERS_KEY).unwrap()).unwrap();
    assert_eq!(stored[0].opinion, "opinion text");

    board.set_topic(TopicPatch::title("New title"));
    let stored: Topic = serde_json::from_str(board.store().get(TOPIC_KEY).unwrap()).unwrap();
    assert_eq!(stored.title, "New title");
}

#[test]
fn unavailable_storage_falls_back_to_defaults_and_keeps_working() {
    let mut board = BoardService::open(BrokenStore);
    assert_eq!(board.topic(), &Topic::default());
    assert!(board.members().is_empty());

    let id = board.add_member();
    assert!(board.update_member(id, MemberPatch::name("still works")));
    board.set_topic(TopicPatch::title("edited"));

    assert_eq!(board.member(id).unwrap().name, "still works");
    assert_eq!(board.topic().title, "edited");
}

#[test]
fn corrupt_records_fall_back_to_defaults() {
    let store = MemoryKvStore::new()
        .with_entry(TOPIC_KEY, "\u{0}garbage")
        .with_entry(MEMBERS_KEY, "[{\"id\": 42}]");

    let board = BoardService::open(store);
    assert_eq!(board.topic(), &Topic::default());
    assert!(board.members().is_empty());
}

#[test]
fn open_store_degrades_to_memory_when_path_is_unusable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("board.sqlite3");

    let mut store = open_store(&path);
    store.save_raw("k", "v").unwrap();
    assert_eq!(store.load_raw("k").unwrap().as_deref(), Some("v"));
    assert!(!path.exists());
}

#[test]
fn overflowing_drag_is_dropped_and_collection_survives_reload() {
    let mut board = BoardService::open(MemoryKvStore::new());
    let keep = board.add_member();
    board.update_member(keep, MemberPatch::name("keep me"));
    let dragged = board.add_member();

    assert!(board.drag_member(dragged, 1e308, 0.0));
    assert!(!board.drag_member(dragged, 1e308, 0.0));
    assert_eq!(board.member(dragged).unwrap().x, compute_placement(1).x + 1e308);

    let board = BoardService::open(board.into_store());
    assert_eq!(board.members().len(), 2);
    assert_eq!(board.member(keep).unwrap().name, "keep me");
    assert!(board.member(dragged).unwrap().anchor().is_finite());
}

#[test]
fn non_finite_position_patch_is_refused_without_write() {
    let mut board = BoardService::open(MemoryKvStore::new());
    let id = board.add_member();
    let stored_before = board.store().get(MEMBERS_KEY).unwrap().to_string();

    assert!(!board.update_member(id, MemberPatch::position(Position::new(f64::NAN, 0.0))));
    assert!(!board.update_member(id, MemberPatch {
        y: Some(f64::INFINITY),
        ..MemberPatch::default()
    }));

    assert_eq!(board.member(id).unwrap().anchor(), compute_placement(0));
    assert_eq!(board.store().get(MEMBERS_KEY).unwrap(), stored_before);
}
