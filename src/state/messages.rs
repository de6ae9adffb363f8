//! Notifications from the session to the presentation layer.

use crate::domain::{Network, QueryResult};

/// Something in the session changed.
///
/// Messages only announce the change; the current state is always read
/// through [`Session::view`](super::Session::view).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMessage {
    /// A poll cycle replaced the snapshot.
    SnapshotUpdated,
    /// A poll cycle failed and retry number `attempt` is scheduled.
    CycleFailed {
        /// Retry number, starting at 1.
        attempt: u32,
    },
    /// A search finished.
    SearchCompleted(QueryResult),
    /// The wallet list was reloaded or cleared.
    WalletUpdated,
    /// The session now talks to another cluster.
    NetworkSwitched(Network),
}
