// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotdesk_domain::{Assignment, BookingPayload, Transition};

/// A command represents caller intent as data only.
///
/// Commands are the only way to request a change to an existing booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bind a pending booking to a worker.
    AssignWorker {
        /// The worker and the capacity they are assigned in.
        assignment: Assignment,
    },
    /// The assigned worker takes the job.
    Accept,
    /// The assigned worker turns the job down.
    Reject,
    /// The assigned worker begins fieldwork.
    StartWork,
    /// The assigned worker finishes the job.
    CompleteWork,
    /// Move an active booking to a different worker.
    Reassign {
        /// The replacement worker.
        assignment: Assignment,
    },
    /// Replace the descriptive payload of a pending booking.
    Amend {
        /// The new payload.
        payload: BookingPayload,
    },
    /// Close a pending booking without fulfilling it.
    Decline {
        /// Optional explanation recorded in the history.
        reason: Option<String>,
    },
}

impl Command {
    /// Returns the transition this command requests.
    #[must_use]
    pub fn transition(&self) -> Transition {
        match self {
            Self::AssignWorker { assignment } => Transition::Assign(assignment.clone()),
            Self::Accept => Transition::Accept,
            Self::Reject => Transition::Reject,
            Self::StartWork => Transition::Start,
            Self::CompleteWork => Transition::Complete,
            Self::Reassign { assignment } => Transition::Reassign(assignment.clone()),
            Self::Amend { .. } => Transition::Amend,
            Self::Decline { .. } => Transition::Decline,
        }
    }
}
