//! Board controller.
//!
//! # Responsibility
//! - Own the whole board session: topic, members, pan offset, selection,
//!   cell display modes and the active drag gesture.
//! - Mediate between layout, coordinate model and persistence.
//!
//! # Invariants
//! - Member ids are unique within the collection at all times.
//! - Every topic/member mutation is followed by a full write of that record.
//! - Operations on unknown ids are silent no-ops and never fail.
//! - Session-only state (pan, selection, cell modes, drag) is never persisted.

use crate::gesture::{DragSession, DragTarget, PanOffset};
use crate::layout::{cell_center, compute_placement};
use crate::model::member::{CellMode, Member, MemberId, MemberPatch, Vote};
use crate::model::position::Position;
use crate::model::topic::{Topic, TopicPatch};
use crate::repo::board_repo::BoardStateRepository;
use crate::repo::kv_repo::KvStore;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use uuid::Uuid;

/// Source of fresh member identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> MemberId;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> MemberId {
        Uuid::new_v4()
    }
}

/// The single modal shown over the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    None,
    EditingTopic,
    ViewingMember(MemberId),
}

/// Line from the board origin to one member cell center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionLine {
    pub member_id: MemberId,
    pub from: Position,
    pub to: Position,
}

/// Board session controller.
pub struct BoardService<S: KvStore, G: IdGenerator = UuidGenerator> {
    repo: BoardStateRepository<S>,
    ids: G,
    topic: Topic,
    members: Vec<Member>,
    cell_modes: HashMap<MemberId, CellMode>,
    pan: PanOffset,
    modal: Modal,
    drag: Option<DragSession>,
}

impl<S: KvStore> BoardService<S, UuidGenerator> {
    /// Rehydrates a board from `store`, using defaults for absent records.
    pub fn open(store: S) -> Self {
        Self::with_id_generator(store, UuidGenerator)
    }
}

impl<S: KvStore, G: IdGenerator> BoardService<S, G> {
    /// Rehydrates a board using a caller-provided id generator.
    pub fn with_id_generator(store: S, ids: G) -> Self {
        let repo = BoardStateRepository::new(store);
        let (topic, topic_source) = match repo.load_topic() {
            Some(topic) => (topic, "persisted"),
            None => (Topic::default(), "default"),
        };
        let (members, members_source) = match repo.load_members() {
            Some(members) => (members, "persisted"),
            None => (Vec::new(), "default"),
        };
        let cell_modes = members
            .iter()
            .map(|member| (member.id, CellMode::initial_for(member)))
            .collect();

        info!(
            "event=board_open module=service status=ok topic_source={} members_source={} member_count={}",
            topic_source,
            members_source,
            members.len()
        );

        Self {
            repo,
            ids,
            topic,
            members,
            cell_modes,
            pan: PanOffset::new(),
            modal: Modal::None,
            drag: None,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    /// Ends the session and hands the store back.
    pub fn into_store(self) -> S {
        self.repo.into_store()
    }

    /// Merges present fields into the topic and persists it.
    pub fn set_topic(&mut self, patch: TopicPatch) {
        self.topic.apply(patch);
        self.persist_topic();
    }

    /// Adds a blank member at the next spiral position and returns its id.
    ///
    /// Existing members are never touched.
    pub fn add_member(&mut self) -> MemberId {
        let index = self.members.len();
        let id = self.fresh_id();
        let member = Member::blank(id, compute_placement(index));

        self.cell_modes.insert(id, CellMode::initial_for(&member));
        self.members.push(member);
        info!(
            "event=member_add module=service status=ok member_id={} index={}",
            id, index
        );
        self.persist_members();
        id
    }

    /// Merges present fields into the matching member.
    ///
    /// Returns `false` without writing when no member has `id`, or when the
    /// merged anchor would not be finite (JSON cannot store it).
    pub fn update_member(&mut self, id: MemberId, patch: MemberPatch) -> bool {
        let Some(member) = self.members.iter_mut().find(|member| member.id == id) else {
            debug!(
                "event=member_update module=service status=skip reason=not_found member_id={}",
                id
            );
            return false;
        };

        let mut next = member.clone();
        next.apply(patch);
        if !next.anchor().is_finite() {
            warn!(
                "event=member_update module=service status=skip reason=non_finite_anchor member_id={}",
                id
            );
            return false;
        }

        *member = next;
        self.persist_members();
        true
    }

    /// Removes the matching member and any session state bound to it.
    ///
    /// Returns `false` without writing when no member has `id`.
    pub fn remove_member(&mut self, id: MemberId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member.id != id);
        if self.members.len() == before {
            debug!(
                "event=member_remove module=service status=skip reason=not_found member_id={}",
                id
            );
            return false;
        }

        self.cell_modes.remove(&id);
        if self.modal == Modal::ViewingMember(id) {
            self.modal = Modal::None;
        }
        if self.active_drag().map(DragSession::target) == Some(DragTarget::Member(id)) {
            self.drag = None;
        }

        info!(
            "event=member_remove module=service status=ok member_id={} remaining={}",
            id,
            self.members.len()
        );
        self.persist_members();
        true
    }

    /// Moves the member score by one step.
    pub fn vote(&mut self, id: MemberId, vote: Vote) -> bool {
        let Some(score) = self.member(id).map(|member| member.score) else {
            return false;
        };
        self.update_member(id, MemberPatch::score(score.saturating_add(vote.delta())))
    }

    pub fn pan_offset(&self) -> Position {
        self.pan.offset()
    }

    /// Adds a delta to the board pan offset. Members are not touched.
    pub fn pan_board(&mut self, dx: f64, dy: f64) -> bool {
        self.pan.apply(dx, dy)
    }

    /// Adds a delta to one member anchor, independent of the pan offset.
    ///
    /// A delta that would overflow the anchor is dropped.
    pub fn drag_member(&mut self, id: MemberId, dx: f64, dy: f64) -> bool {
        let Some(anchor) = self.member(id).map(Member::anchor) else {
            return false;
        };
        self.update_member(id, MemberPatch::position(anchor.translated(dx, dy)))
    }

    pub fn active_drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Starts panning the board. Refused while another gesture is active.
    pub fn begin_board_drag(&mut self) -> bool {
        self.begin_drag(DragTarget::Board)
    }

    /// Starts dragging one cell. Refused for unknown ids or while another
    /// gesture is active, so a cell drag never also pans the board.
    pub fn begin_member_drag(&mut self, id: MemberId) -> bool {
        if self.member(id).is_none() {
            return false;
        }
        self.begin_drag(DragTarget::Member(id))
    }

    /// Applies one delta of the active gesture to its target.
    ///
    /// Returns `false` when no gesture is active.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> bool {
        let Some(session) = self.drag.as_mut() else {
            return false;
        };
        let target = session.target();
        let Some((dx, dy)) = session.accept(dx, dy) else {
            return false;
        };

        match target {
            DragTarget::Board => self.pan.apply(dx, dy),
            DragTarget::Member(id) => self.drag_member(id, dx, dy),
        }
    }

    /// Releases the active gesture. Positions stay where they are.
    pub fn end_drag(&mut self) -> Option<DragSession> {
        self.finish_drag("ok")
    }

    /// Aborts the active gesture. Deltas already applied are kept.
    pub fn cancel_drag(&mut self) -> Option<DragSession> {
        self.finish_drag("cancelled")
    }

    pub fn modal(&self) -> Modal {
        self.modal
    }

    /// Shows the topic editor, replacing any other modal.
    pub fn open_topic_editor(&mut self) {
        self.modal = Modal::EditingTopic;
    }

    /// Shows the detail modal of one member, replacing any other modal.
    pub fn view_member(&mut self, id: MemberId) -> bool {
        if self.member(id).is_none() {
            return false;
        }
        self.modal = Modal::ViewingMember(id);
        true
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    /// Member shown in the detail modal, read live from the collection.
    pub fn viewed_member(&self) -> Option<&Member> {
        match self.modal {
            Modal::ViewingMember(id) => self.member(id),
            _ => None,
        }
    }

    pub fn cell_mode(&self, id: MemberId) -> Option<CellMode> {
        self.cell_modes.get(&id).copied()
    }

    /// Viewing -> Editing. Returns `false` when no transition happened.
    pub fn edit_cell(&mut self, id: MemberId) -> bool {
        self.transition_cell(id, CellMode::Viewing, CellMode::Editing)
    }

    /// Editing -> Viewing. Returns `false` when no transition happened.
    pub fn save_cell(&mut self, id: MemberId) -> bool {
        self.transition_cell(id, CellMode::Editing, CellMode::Viewing)
    }

    /// Lines from the origin to every cell center, in member order.
    pub fn connection_lines(&self) -> Vec<ConnectionLine> {
        self.members
            .iter()
            .map(|member| ConnectionLine {
                member_id: member.id,
                from: Position::ORIGIN,
                to: cell_center(member.anchor()),
            })
            .collect()
    }

    fn begin_drag(&mut self, target: DragTarget) -> bool {
        if let Some(active) = &self.drag {
            debug!(
                "event=drag_start module=service status=skip reason=gesture_active active={:?} requested={:?}",
                active.target(),
                target
            );
            return false;
        }
        self.drag = Some(DragSession::start(target));
        true
    }

    fn finish_drag(&mut self, status: &str) -> Option<DragSession> {
        let mut session = self.drag.take()?;
        session.close();
        debug!(
            "event=drag_end module=service status={} target={:?} events={}",
            status,
            session.target(),
            session.event_count()
        );
        Some(session)
    }

    fn transition_cell(&mut self, id: MemberId, from: CellMode, to: CellMode) -> bool {
        match self.cell_modes.get_mut(&id) {
            Some(mode) if *mode == from => {
                *mode = to;
                true
            }
            _ => false,
        }
    }

    /// Draws ids until one is unused; the generator must eventually yield one.
    fn fresh_id(&mut self) -> MemberId {
        loop {
            let id = self.ids.next_id();
            if self.member(id).is_none() {
                return id;
            }
            warn!(
                "event=member_add module=service status=retry reason=id_collision member_id={}",
                id
            );
        }
    }

    fn persist_topic(&mut self) {
        if let Err(err) = self.repo.save_topic(&self.topic) {
            error!(
                "event=record_save module=service status=error record=topic error={}",
                err
            );
        }
    }

    fn persist_members(&mut self) {
        if let Err(err) = self.repo.save_members(&self.members) {
            error!(
                "event=record_save module=service status=error record=members count={} error={}",
                self.members.len(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardService, IdGenerator, Modal};
    use crate::model::member::{CellMode, MemberId, MemberPatch};
    use crate::repo::kv_repo::MemoryKvStore;
    use uuid::Uuid;

    /// Replays a fixed id list, then falls back to fresh UUIDs.
    struct ScriptedIds(Vec<MemberId>);

    impl IdGenerator for ScriptedIds {
        fn next_id(&mut self) -> MemberId {
            if self.0.is_empty() {
                Uuid::new_v4()
            } else {
                self.0.remove(0)
            }
        }
    }

    #[test]
    fn colliding_ids_are_redrawn() {
        let repeated = Uuid::new_v4();
        let other = Uuid::new_v4();
        let ids = ScriptedIds(vec![repeated, repeated, other]);
        let mut board = BoardService::with_id_generator(MemoryKvStore::new(), ids);

        let first = board.add_member();
        let second = board.add_member();
        assert_eq!(first, repeated);
        assert_eq!(second, other);
    }

    #[test]
    fn cell_modes_follow_save_and_edit() {
        let mut board = BoardService::open(MemoryKvStore::new());
        let id = board.add_member();
        assert_eq!(board.cell_mode(id), Some(CellMode::Editing));

        assert!(!board.edit_cell(id));
        assert!(board.save_cell(id));
        assert_eq!(board.cell_mode(id), Some(CellMode::Viewing));
        assert!(!board.save_cell(id));
        assert!(board.edit_cell(id));
        assert_eq!(board.cell_mode(id), Some(CellMode::Editing));
    }

    #[test]
    fn removing_viewed_member_closes_modal() {
        let mut board = BoardService::open(MemoryKvStore::new());
        let id = board.add_member();
        board.update_member(id, MemberPatch::name("Nila"));
        assert!(board.view_member(id));
        assert_eq!(board.viewed_member().map(|m| m.name.as_str()), Some("Nila"));

        assert!(board.remove_member(id));
        assert_eq!(board.modal(), Modal::None);
        assert_eq!(board.cell_mode(id), None);
    }

    #[test]
    fn modals_are_mutually_exclusive() {
        let mut board = BoardService::open(MemoryKvStore::new());
        let id = board.add_member();

        board.open_topic_editor();
        assert!(board.view_member(id));
        assert_eq!(board.modal(), Modal::ViewingMember(id));

        board.open_topic_editor();
        assert_eq!(board.modal(), Modal::EditingTopic);
        assert!(board.viewed_member().is_none());

        board.close_modal();
        assert_eq!(board.modal(), Modal::None);
    }
}
