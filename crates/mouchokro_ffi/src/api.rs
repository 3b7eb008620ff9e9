//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the board session to Dart via FRB as synchronous calls.
//! - Translate between string ids / flat DTOs and core types.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One board session exists per process; calls are applied in arrival order.
//! - Unknown member ids are not errors: the call succeeds with `changed=false`.

use log::warn;
use mouchokro_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_store,
    split_links, BoardService, CellMode, KvStore, Member, MemberId, MemberPatch, Modal,
    TopicPatch, Vote,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const BOARD_DB_FILE_NAME: &str = "mouchokro_board.sqlite3";
const BOARD_DB_PATH_ENV: &str = "MOUCHOKRO_DB_PATH";

type SessionBoard = BoardService<Box<dyn KvStore + Send>>;

static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static BOARD_SESSION: OnceLock<Mutex<SessionBoard>> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Topic card content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicView {
    pub title: String,
    pub description: String,
}

/// One member cell as rendered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberView {
    /// Stable member ID in string form.
    pub member_id: String,
    pub name: String,
    pub opinion: String,
    /// Raw comma-delimited links, as typed.
    pub links: String,
    /// Top-left anchor in board-local pixels.
    pub x: f64,
    pub y: f64,
    pub score: i64,
    /// `editing|viewing`.
    pub mode: String,
    /// Name with the anonymous fallback applied.
    pub display_name: String,
    /// Opinion with the empty fallback applied.
    pub display_opinion: String,
    /// Heading for the member detail modal.
    pub detail_title: String,
    /// Opinion text for the member detail modal, with its own fallback.
    pub detail_opinion: String,
}

/// Line from the board origin to one cell center.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionLineView {
    pub member_id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Clickable link derived from member link text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
    pub href: String,
    pub label: String,
}

/// Full render state of the board session.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub topic: TopicView,
    /// Members in insertion order.
    pub members: Vec<MemberView>,
    pub lines: Vec<ConnectionLineView>,
    /// Pan offset applied to the whole board layer.
    pub pan_x: f64,
    pub pan_y: f64,
    /// `none|editing_topic|viewing_member`.
    pub modal: String,
    /// Set when `modal == "viewing_member"`.
    pub viewed_member_id: Option<String>,
    /// `none|board|member`.
    pub drag_target: String,
}

/// Generic action response envelope for board commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    /// `false` only for malformed input.
    pub ok: bool,
    /// Whether board state changed.
    pub changed: bool,
    /// Affected or created member ID.
    pub member_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl BoardActionResponse {
    fn applied(changed: bool, member_id: Option<MemberId>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed,
            member_id: member_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn for_member(changed: bool, member_id: MemberId, done: &str) -> Self {
        let message = if changed {
            done.to_string()
        } else {
            "No matching member; nothing changed.".to_string()
        };
        Self::applied(changed, Some(member_id), message)
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            member_id: None,
            message: message.into(),
        }
    }
}

/// Returns the full render state of the board.
///
/// # FFI contract
/// - Sync call; first call opens the board database.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardSnapshot {
    with_board(|board| to_snapshot(board))
}

/// Edits the topic; `None` fields are left unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_topic(title: Option<String>, description: Option<String>) -> BoardActionResponse {
    let patch = TopicPatch { title, description };
    if patch.is_empty() {
        return BoardActionResponse::applied(false, None, "Nothing to update.");
    }
    with_board(|board| board.set_topic(patch));
    BoardActionResponse::applied(true, None, "Topic saved.")
}

/// Adds a blank member at the next spiral position.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_member() -> BoardActionResponse {
    let id = with_board(|board| board.add_member());
    BoardActionResponse::applied(true, Some(id), "Member added.")
}

/// Edits member text fields; `None` fields are left unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn board_update_member(
    member_id: String,
    name: Option<String>,
    opinion: Option<String>,
    links: Option<String>,
) -> BoardActionResponse {
    let id = match parse_member_id(&member_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let patch = MemberPatch {
        name,
        opinion,
        links,
        ..MemberPatch::default()
    };
    let changed = with_board(|board| board.update_member(id, patch));
    BoardActionResponse::for_member(changed, id, "Member updated.")
}

/// Removes a member. Unknown ids are a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn board_remove_member(member_id: String) -> BoardActionResponse {
    let id = match parse_member_id(&member_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let changed = with_board(|board| board.remove_member(id));
    BoardActionResponse::for_member(changed, id, "Member removed.")
}

/// Votes on a member: positive `direction` adds one, negative subtracts one.
#[flutter_rust_bridge::frb(sync)]
pub fn board_vote(member_id: String, direction: i32) -> BoardActionResponse {
    let id = match parse_member_id(&member_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let vote = match direction.signum() {
        1 => Vote::Up,
        -1 => Vote::Down,
        _ => return BoardActionResponse::failure("board_vote failed: direction must be non-zero"),
    };
    let changed = with_board(|board| board.vote(id, vote));
    BoardActionResponse::for_member(changed, id, "Vote recorded.")
}

/// Starts a board pan gesture.
#[flutter_rust_bridge::frb(sync)]
pub fn board_pan_start() -> BoardActionResponse {
    let started = with_board(|board| board.begin_board_drag());
    gesture_response(started, "Pan started.")
}

/// Starts dragging one member cell.
#[flutter_rust_bridge::frb(sync)]
pub fn board_member_drag_start(member_id: String) -> BoardActionResponse {
    let id = match parse_member_id(&member_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let started = with_board(|board| board.begin_member_drag(id));
    gesture_response(started, "Drag started.")
}

/// Applies one pointer delta to the active gesture.
#[flutter_rust_bridge::frb(sync)]
pub fn board_drag_update(dx: f64, dy: f64) -> BoardActionResponse {
    if !dx.is_finite() || !dy.is_finite() {
        return BoardActionResponse::failure("board_drag_update failed: delta must be finite");
    }
    let applied = with_board(|board| board.drag_by(dx, dy));
    gesture_response(applied, "Delta applied.")
}

/// Releases the active gesture.
#[flutter_rust_bridge::frb(sync)]
pub fn board_drag_end() -> BoardActionResponse {
    let ended = with_board(|board| board.end_drag().is_some());
    gesture_response(ended, "Gesture ended.")
}

/// Aborts the active gesture; applied deltas are kept.
#[flutter_rust_bridge::frb(sync)]
pub fn board_drag_cancel() -> BoardActionResponse {
    let cancelled = with_board(|board| board.cancel_drag().is_some());
    gesture_response(cancelled, "Gesture cancelled.")
}

/// Opens the topic editor modal.
#[flutter_rust_bridge::frb(sync)]
pub fn board_open_topic_editor() {
    with_board(|board| board.open_topic_editor());
}

/// Opens the member detail modal.
#[flutter_rust_bridge::frb(sync)]
pub fn board_view_member(member_id: String) -> BoardActionResponse {
    let id = match parse_member_id(&member_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let shown = with_board(|board| board.view_member(id));
    BoardActionResponse::for_member(shown, id, "Member shown.")
}

/// Closes whichever modal is open.
#[flutter_rust_bridge::frb(sync)]
pub fn board_close_modal() {
    with_board(|board| board.close_modal());
}

/// Switches a member cell into editing mode.
#[flutter_rust_bridge::frb(sync)]
pub fn board_edit_cell(member_id: String) -> BoardActionResponse {
    let id = match parse_member_id(&member_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let changed = with_board(|board| board.edit_cell(id));
    BoardActionResponse::applied(changed, Some(id), "Cell mode updated.")
}

/// Switches a member cell back to viewing mode.
#[flutter_rust_bridge::frb(sync)]
pub fn board_save_cell(member_id: String) -> BoardActionResponse {
    let id = match parse_member_id(&member_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let changed = with_board(|board| board.save_cell(id));
    BoardActionResponse::applied(changed, Some(id), "Cell mode updated.")
}

/// Splits a member's raw link text into clickable links.
///
/// Returns an empty list for unknown or malformed ids.
#[flutter_rust_bridge::frb(sync)]
pub fn member_links(member_id: String) -> Vec<LinkItem> {
    let Ok(id) = Uuid::parse_str(member_id.trim()) else {
        return Vec::new();
    };
    let raw = with_board(|board| board.member(id).map(|member| member.links.clone()));
    raw.map(|raw| {
        split_links(&raw)
            .into_iter()
            .map(|link| LinkItem {
                href: link.href,
                label: link.label,
            })
            .collect()
    })
    .unwrap_or_default()
}

fn gesture_response(applied: bool, message: &str) -> BoardActionResponse {
    if applied {
        BoardActionResponse::applied(true, None, message)
    } else {
        BoardActionResponse::applied(false, None, "No gesture change.")
    }
}

fn parse_member_id(raw: &str) -> Result<MemberId, BoardActionResponse> {
    Uuid::parse_str(raw.trim()).map_err(|err| {
        BoardActionResponse::failure(format!("invalid member id `{}`: {err}", raw.trim()))
    })
}

fn resolve_board_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(BOARD_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BOARD_DB_FILE_NAME)
        })
        .clone()
}

fn with_board<T>(f: impl FnOnce(&mut SessionBoard) -> T) -> T {
    let session = BOARD_SESSION
        .get_or_init(|| Mutex::new(BoardService::open(open_store(resolve_board_db_path()))));
    let mut guard = lock_session(session);
    f(&mut guard)
}

fn lock_session(session: &Mutex<SessionBoard>) -> MutexGuard<'_, SessionBoard> {
    session.lock().unwrap_or_else(|poisoned| {
        warn!("event=session_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

fn to_snapshot(board: &SessionBoard) -> BoardSnapshot {
    let pan = board.pan_offset();
    let (modal, viewed_member_id) = match board.modal() {
        Modal::None => ("none", None),
        Modal::EditingTopic => ("editing_topic", None),
        Modal::ViewingMember(id) => ("viewing_member", Some(id.to_string())),
    };
    let drag_target = match board.active_drag().map(|session| session.target()) {
        None => "none",
        Some(mouchokro_core::DragTarget::Board) => "board",
        Some(mouchokro_core::DragTarget::Member(_)) => "member",
    };

    BoardSnapshot {
        topic: TopicView {
            title: board.topic().title.clone(),
            description: board.topic().description.clone(),
        },
        members: board
            .members()
            .iter()
            .map(|member| to_member_view(member, board.cell_mode(member.id)))
            .collect(),
        lines: board
            .connection_lines()
            .into_iter()
            .map(|line| ConnectionLineView {
                member_id: line.member_id.to_string(),
                x1: line.from.x,
                y1: line.from.y,
                x2: line.to.x,
                y2: line.to.y,
            })
            .collect(),
        pan_x: pan.x,
        pan_y: pan.y,
        modal: modal.to_string(),
        viewed_member_id,
        drag_target: drag_target.to_string(),
    }
}

fn to_member_view(member: &Member, mode: Option<CellMode>) -> MemberView {
    MemberView {
        member_id: member.id.to_string(),
        name: member.name.clone(),
        opinion: member.opinion.clone(),
        links: member.links.clone(),
        x: member.x,
        y: member.y,
        score: member.score,
        mode: cell_mode_label(mode.unwrap_or_else(|| CellMode::initial_for(member))).to_string(),
        display_name: member.display_name().to_string(),
        display_opinion: member.display_opinion().to_string(),
        detail_title: member.detail_title(),
        detail_opinion: member.detail_opinion().to_string(),
    }
}

fn cell_mode_label(mode: CellMode) -> &'static str {
    match mode {
        CellMode::Editing => "editing",
        CellMode::Viewing => "viewing",
    }
}
