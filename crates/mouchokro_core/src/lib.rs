//! Core domain logic for the Mouchokro opinion board.
//! This crate is the single source of truth for board invariants.

pub mod db;
pub mod gesture;
pub mod layout;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use gesture::{DragSession, DragTarget, PanOffset};
pub use layout::{cell_center, compute_placement, CELL_HEIGHT, CELL_WIDTH};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingConfig};
pub use model::member::{CellMode, Member, MemberId, MemberPatch, Vote};
pub use model::position::Position;
pub use model::topic::{Topic, TopicPatch};
pub use repo::board_repo::{BoardStateRepository, MEMBERS_KEY, TOPIC_KEY};
pub use repo::kv_repo::{open_store, KvStore, MemoryKvStore, RepoError, RepoResult, SqliteKvStore};
pub use service::board_service::{
    BoardService, ConnectionLine, IdGenerator, Modal, UuidGenerator,
};
pub use service::links::{split_links, LinkView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
