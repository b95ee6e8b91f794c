//! Error types for guild domain validation and state transitions.

use super::{AssignmentId, AssignmentStatus, FulfillerId, FulfillerStatus};
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing domain values or applying transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuildDomainError {
    /// The quest title is empty after trimming.
    #[error("quest title must not be empty")]
    EmptyQuestTitle,

    /// The reward is negative or not a finite number.
    #[error("reward must be a finite, non-negative number, got {0}")]
    InvalidReward(String),

    /// The deadline text could not be parsed as a timestamp.
    #[error("deadline '{0}' is not a valid timestamp, expected ISO-8601 such as 2025-12-31T23:59:59")]
    InvalidDeadline(String),

    /// The display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// The platform name is empty after trimming.
    #[error("platform must not be empty")]
    EmptyPlatform,

    /// The platform handle is empty after trimming.
    #[error("platform handle must not be empty")]
    EmptyHandle,

    /// The requested assignment transition is not an edge of the state graph.
    #[error("invalid assignment transition for {assignment_id}: {from} -> {to}")]
    InvalidAssignmentTransition {
        /// Assignment being transitioned.
        assignment_id: AssignmentId,
        /// Current assignment status.
        from: AssignmentStatus,
        /// Requested target status.
        to: AssignmentStatus,
    },

    /// The fulfiller's current status does not permit the requested action.
    #[error("fulfiller {fulfiller_id} cannot {action} while {status}")]
    FulfillerStatusRejected {
        /// Fulfiller whose status blocked the action.
        fulfiller_id: FulfillerId,
        /// Status at the time of the request.
        status: FulfillerStatus,
        /// Action that was refused.
        action: FulfillerAction,
    },
}

/// Fulfiller-facing actions gated by [`FulfillerStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FulfillerAction {
    /// Claim a quest.
    Claim,
    /// Stop taking quests for a while.
    Rest,
    /// Return to the idle pool.
    Resume,
}

impl fmt::Display for FulfillerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Claim => "claim a quest",
            Self::Rest => "rest",
            Self::Resume => "resume",
        };
        f.write_str(text)
    }
}

/// Error returned while parsing fulfiller statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown fulfiller status: {0}")]
pub struct ParseFulfillerStatusError(pub String);

/// Error returned while parsing assignment statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment status: {0}")]
pub struct ParseAssignmentStatusError(pub String);

/// Error returned while parsing audit event kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown guild event: {0}")]
pub struct ParseGuildEventKindError(pub String);
