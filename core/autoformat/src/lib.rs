//! # autoformat-core
//!
//! Reformat-on-save scheduling for interactive editors.
//!
//! The editor saves a document; a little later, once the save has settled
//! and the user is still in the editor, an external cleanup command runs on
//! it and the result is saved again. This crate decides *when* that happens
//! and *on which documents*; the editor itself sits behind the [`Host`] and
//! [`EventSource`] traits.
//!
//! ## Design Principles
//!
//! - **Single sequence**: every entry point takes `&mut self`. Threaded hosts
//!   share one `Mutex<Scheduler>` between event delivery and the [`Ticker`].
//! - **Explicit time**: callers pass `now`, so the policy is testable without
//!   sleeping.
//! - **Best effort**: a failing document never stops a pass and is never
//!   retried; a failing pass never leaves the scheduler stuck.

pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod executor;
pub mod gate;
pub mod host;
pub mod pending;
pub mod router;
pub mod scheduler;
pub mod state;
pub mod ticker;

pub use clock::QuiescenceClock;
pub use config::{default_config_path, load_config, SchedulerConfig};
pub use document::{DocumentId, WindowHandle};
pub use error::{ConfigError, HostError, Result, SchedulerError};
pub use executor::{processing_order, BatchReport};
pub use gate::{BlockReason, GateDecision};
pub use host::{
    BuildAction, BuildScope, EventSource, Host, HostEvent, HostEventKind, SubscriptionId,
};
pub use pending::PendingSet;
pub use router::EventRouter;
pub use scheduler::{Scheduler, TickOutcome};
pub use state::SchedulerState;
pub use ticker::{SharedScheduler, Ticker};
