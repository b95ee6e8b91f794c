//! Display labels for statuses.
//!
//! Labels are presentation only. Statuses are stored by their canonical
//! `as_str` names; these tables turn them into user-facing text and back.

use crate::quest::domain::{AssignmentStatus, FulfillerStatus};

/// Maps statuses to display labels.
pub trait StatusLabels: Send + Sync {
    /// Returns the label for a fulfiller status.
    fn fulfiller(&self, status: FulfillerStatus) -> &'static str;

    /// Returns the label for an assignment status.
    fn assignment(&self, status: AssignmentStatus) -> &'static str;

    /// Resolves a fulfiller status from its label.
    fn fulfiller_from_label(&self, label: &str) -> Option<FulfillerStatus> {
        FULFILLER_STATUSES
            .into_iter()
            .find(|status| self.fulfiller(*status) == label.trim())
    }

    /// Resolves an assignment status from its label.
    fn assignment_from_label(&self, label: &str) -> Option<AssignmentStatus> {
        AssignmentStatus::ALL
            .into_iter()
            .find(|status| self.assignment(*status) == label.trim())
    }
}

const FULFILLER_STATUSES: [FulfillerStatus; 4] = [
    FulfillerStatus::Idle,
    FulfillerStatus::Working,
    FulfillerStatus::Resting,
    FulfillerStatus::Departed,
];

/// English labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLabels;

impl StatusLabels for EnglishLabels {
    fn fulfiller(&self, status: FulfillerStatus) -> &'static str {
        match status {
            FulfillerStatus::Idle => "Idle",
            FulfillerStatus::Working => "On a quest",
            FulfillerStatus::Resting => "Resting",
            FulfillerStatus::Departed => "Departed",
        }
    }

    fn assignment(&self, status: AssignmentStatus) -> &'static str {
        match status {
            AssignmentStatus::Unanswered => "Unclaimed",
            AssignmentStatus::Ongoing => "In progress",
            AssignmentStatus::Submitted => "Submitted",
            AssignmentStatus::Confirmed => "Confirmed",
            AssignmentStatus::Timeout => "Timed out",
            AssignmentStatus::ForcedEnd => "Force-ended",
        }
    }
}

/// Simplified Chinese labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChineseLabels;

impl StatusLabels for ChineseLabels {
    fn fulfiller(&self, status: FulfillerStatus) -> &'static str {
        match status {
            FulfillerStatus::Idle => "空闲",
            FulfillerStatus::Working => "执行任务",
            FulfillerStatus::Resting => "休息",
            FulfillerStatus::Departed => "已离开或不再参与",
        }
    }

    fn assignment(&self, status: AssignmentStatus) -> &'static str {
        match status {
            AssignmentStatus::Unanswered => "未接取",
            AssignmentStatus::Ongoing => "执行中",
            AssignmentStatus::Submitted => "已提交",
            AssignmentStatus::Confirmed => "已确认",
            AssignmentStatus::Timeout => "超时",
            AssignmentStatus::ForcedEnd => "强制终止",
        }
    }
}

/// Returns the label table for a locale tag, defaulting to English.
#[must_use]
pub fn labels_for(locale: &str) -> &'static dyn StatusLabels {
    let normalized = locale.trim().to_ascii_lowercase();
    if normalized == "zh" || normalized.starts_with("zh-") || normalized.starts_with("zh_") {
        &ChineseLabels
    } else {
        &EnglishLabels
    }
}
