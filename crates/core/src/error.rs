// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotdesk_domain::{Denial, DomainError};

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A field-level rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// The transition validator refused the change.
    #[error("{0}")]
    Denied(Denial),
}

impl From<Denial> for CoreError {
    fn from(denial: Denial) -> Self {
        Self::Denied(denial)
    }
}
