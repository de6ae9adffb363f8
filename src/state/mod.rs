//! Session state for the LazySol explorer.
//!
//! This module provides:
//!
//! - [`Session`] - The shared context owning the active gateway and its data
//! - [`poller`] - Background snapshot refresh with linear backoff
//! - [`SessionMessage`] - Change notifications for the presentation layer
//! - [`AppConfig`] - Persistent configuration with load/save capabilities
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                    Session                    │
//! ├───────────────┬───────────────┬───────────────┤
//! │   snapshot    │    search     │    wallet     │
//! │  (poller)     │  (resolver)   │  (fetcher)    │
//! └───────────────┴───────┬───────┴───────────────┘
//!                         │
//!                  Arc<Gateway> (one per network)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use crate::state::Session;
//!
//! let (session, mut messages) = Session::new(gateway);
//! session.start_polling().await;
//! while let Some(message) = messages.recv().await {
//!     let state = session.view().await;
//! }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod messages;
pub mod poller;
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::AppConfig;
pub use messages::SessionMessage;
pub use poller::{CycleOutcome, PollerHandle, PollerPhase, run_cycle};
pub use session::{Session, SessionState, Snapshot};
