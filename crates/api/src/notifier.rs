// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Post-commit notification hook.

use plotdesk_audit::LifecycleEvent;

/// Receives lifecycle events after they are committed.
///
/// Delivery is fire-and-forget. Implementations must return promptly and
/// must not fail the operation that produced the event; the booking is
/// already stored by the time `notify` runs.
pub trait LifecycleNotifier: Send + Sync {
    /// Hands one committed event to the dispatcher.
    fn notify(&self, event: &LifecycleEvent);
}

/// A notifier that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl LifecycleNotifier for NoopNotifier {
    fn notify(&self, _event: &LifecycleEvent) {}
}
