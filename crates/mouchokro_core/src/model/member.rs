//! Member opinion cell model.
//!
//! # Responsibility
//! - Define the per-member record rendered as one hexagonal cell.
//! - Provide per-field partial updates and the cell display state machine.
//!
//! # Invariants
//! - `id` is stable and never reused for another member.
//! - `x`/`y` are the cell's top-left anchor, not its center.
//! - `links` stays raw comma-delimited text at rest.

use crate::model::position::Position;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one member cell.
pub type MemberId = Uuid;

pub const ANONYMOUS_NAME: &str = "বেনামী";
pub const EMPTY_OPINION: &str = "কোন মতামত নেই...";
/// Name used in the member detail title when the name is blank.
pub const DETAIL_FALLBACK_NAME: &str = "সদস্য";
/// Opinion shown in the member detail view when none was written.
pub const DETAIL_EMPTY_OPINION: &str = "কোন মতামত দেওয়া হয়নি";

/// One participant's opinion as stored on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub opinion: String,
    /// Comma-delimited raw link text. Split only for display.
    pub links: String,
    pub x: f64,
    pub y: f64,
    /// Older records were written without a score.
    #[serde(default)]
    pub score: i64,
}

impl Member {
    /// Creates a blank member anchored at `anchor`.
    pub fn blank(id: MemberId, anchor: Position) -> Self {
        Self {
            id,
            name: String::new(),
            opinion: String::new(),
            links: String::new(),
            x: anchor.x,
            y: anchor.y,
            score: 0,
        }
    }

    pub fn anchor(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Applies every present field of `patch`; absent fields keep their value.
    ///
    /// `id` is not part of the patch and never changes.
    pub fn apply(&mut self, patch: MemberPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(opinion) = patch.opinion {
            self.opinion = opinion;
        }
        if let Some(links) = patch.links {
            self.links = links;
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(score) = patch.score {
            self.score = score;
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            ANONYMOUS_NAME
        } else {
            self.name.as_str()
        }
    }

    pub fn display_opinion(&self) -> &str {
        if self.opinion.trim().is_empty() {
            EMPTY_OPINION
        } else {
            self.opinion.as_str()
        }
    }

    /// Heading of the member detail view, e.g. `রহিম এর মতামত`.
    pub fn detail_title(&self) -> String {
        let name = if self.name.trim().is_empty() {
            DETAIL_FALLBACK_NAME
        } else {
            self.name.as_str()
        };
        format!("{name} এর মতামত")
    }

    pub fn detail_opinion(&self) -> &str {
        if self.opinion.trim().is_empty() {
            DETAIL_EMPTY_OPINION
        } else {
            self.opinion.as_str()
        }
    }
}

/// Partial member edit.
///
/// A present field overrides the stored value; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub opinion: Option<String>,
    pub links: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub score: Option<i64>,
}

impl MemberPatch {
    pub fn name(value: impl Into<String>) -> Self {
        Self {
            name: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn opinion(value: impl Into<String>) -> Self {
        Self {
            opinion: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn links(value: impl Into<String>) -> Self {
        Self {
            links: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn position(position: Position) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Self::default()
        }
    }

    pub fn score(value: i64) -> Self {
        Self {
            score: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.opinion.is_none()
            && self.links.is_none()
            && self.x.is_none()
            && self.y.is_none()
            && self.score.is_none()
    }
}

/// Display mode of one member cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    /// Text inputs and the remove control are shown.
    Editing,
    /// Read-only summary with vote controls.
    Viewing,
}

impl CellMode {
    /// Mode a cell starts in: blank names open straight into editing.
    pub fn initial_for(member: &Member) -> Self {
        if member.name.is_empty() {
            Self::Editing
        } else {
            Self::Viewing
        }
    }

    /// Whether the remove control is offered in this mode.
    pub fn allows_remove(self) -> bool {
        matches!(self, Self::Editing)
    }
}

/// Single-step vote on a member score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellMode, Member, MemberPatch, Vote, ANONYMOUS_NAME, DETAIL_EMPTY_OPINION, EMPTY_OPINION,
    };
    use crate::model::position::Position;
    use uuid::Uuid;

    #[test]
    fn apply_merges_present_fields_only() {
        let mut member = Member::blank(Uuid::new_v4(), Position::new(1.0, 2.0));
        member.apply(MemberPatch {
            name: Some("Rahim".to_string()),
            x: Some(7.0),
            ..MemberPatch::default()
        });

        assert_eq!(member.name, "Rahim");
        assert_eq!(member.opinion, "");
        assert_eq!(member.x, 7.0);
        assert_eq!(member.y, 2.0);
        assert_eq!(member.score, 0);
    }

    #[test]
    fn initial_mode_depends_on_name() {
        let mut member = Member::blank(Uuid::new_v4(), Position::ORIGIN);
        assert_eq!(CellMode::initial_for(&member), CellMode::Editing);

        member.name = "Karim".to_string();
        assert_eq!(CellMode::initial_for(&member), CellMode::Viewing);
        assert!(!CellMode::Viewing.allows_remove());
        assert!(CellMode::Editing.allows_remove());
    }

    #[test]
    fn blank_name_displays_anonymous_label() {
        let member = Member::blank(Uuid::new_v4(), Position::ORIGIN);
        assert_eq!(member.display_name(), ANONYMOUS_NAME);
    }

    #[test]
    fn detail_view_uses_its_own_fallbacks() {
        let mut member = Member::blank(Uuid::new_v4(), Position::ORIGIN);
        assert_eq!(member.detail_title(), "সদস্য এর মতামত");
        assert_eq!(member.detail_opinion(), DETAIL_EMPTY_OPINION);
        assert_eq!(member.display_opinion(), EMPTY_OPINION);

        member.name = "Rahim".to_string();
        member.opinion = "agree".to_string();
        assert_eq!(member.detail_title(), "Rahim এর মতামত");
        assert_eq!(member.detail_opinion(), "agree");
    }

    #[test]
    fn vote_deltas_are_unit_steps() {
        assert_eq!(Vote::Up.delta(), 1);
        assert_eq!(Vote::Down.delta(), -1);
    }
}
