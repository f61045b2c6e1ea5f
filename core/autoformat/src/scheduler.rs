//! The reformat scheduler: one instance per host session.
//!
//! Owns every piece of mutable state and exposes two entry points, both
//! taking `&mut self` so the caller's single sequence (or single mutex, see
//! [`crate::ticker`]) is the only synchronization needed:
//!
//! - [`Scheduler::handle_event`] for host lifecycle notifications
//! - [`Scheduler::on_tick`] for clock ticks
//!
//! ## Usage
//!
//! ```ignore
//! let mut scheduler = Scheduler::new(host, config)?;
//! scheduler.attach(&mut event_source)?;
//! scheduler.handle_event(&event, Utc::now());
//! scheduler.on_tick(Utc::now());
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::clock::QuiescenceClock;
use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::executor::{run_batch, BatchReport};
use crate::gate::{evaluate, GateDecision};
use crate::host::{EventSource, Host, HostEvent};
use crate::router::EventRouter;
use crate::state::SchedulerState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Detached, or the clock is stopped for a pass in progress.
    ClockStopped,
    Skipped { decision: GateDecision },
    Completed { report: BatchReport },
    Aborted { message: String },
}

pub struct Scheduler<H: Host> {
    host: H,
    config: SchedulerConfig,
    state: SchedulerState,
    clock: QuiescenceClock,
    router: EventRouter,
}

impl<H: Host> Scheduler<H> {
    pub fn new(host: H, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let clock = QuiescenceClock::new(config.tick_interval());
        Ok(Self {
            host,
            config,
            state: SchedulerState::new(),
            clock,
            router: EventRouter::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn clock(&self) -> &QuiescenceClock {
        &self.clock
    }

    pub fn is_attached(&self) -> bool {
        self.router.is_connected()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Subscribes to host events and starts the clock.
    ///
    /// When the host lacks the reformat command the scheduler stays inert:
    /// nothing is subscribed and every tick is a no-op.
    pub fn attach<S: EventSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        if !self.host.has_command(&self.config.reformat_command) {
            info!(
                command = %self.config.reformat_command,
                "Reformat command unavailable; scheduler stays inert"
            );
            return Err(SchedulerError::CommandUnavailable(
                self.config.reformat_command.clone(),
            ));
        }

        self.router.connect(source);
        self.clock.start();
        info!(
            command = %self.config.reformat_command,
            tick_interval_ms = self.config.tick_interval_ms,
            "Scheduler attached"
        );
        Ok(())
    }

    /// Unsubscribes from host events and stops the clock. Safe to repeat.
    pub fn detach<S: EventSource + ?Sized>(&mut self, source: &mut S) {
        let released = self.router.disconnect(source);
        self.clock.stop();
        if released > 0 {
            info!("Scheduler detached");
        }
    }

    // ── Entry points ─────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &HostEvent, now: DateTime<Utc>) {
        self.router.route(&mut self.state, &self.config, event, now);
    }

    pub fn on_tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.clock.is_running() {
            return TickOutcome::ClockStopped;
        }

        let decision = evaluate(&mut self.state, &self.host, &self.config, now);
        if decision != GateDecision::Ready {
            debug!(decision = ?decision, "Tick skipped");
            return TickOutcome::Skipped { decision };
        }

        match run_batch(
            &mut self.state,
            &mut self.clock,
            &mut self.host,
            &self.config,
            now,
        ) {
            Ok(report) => TickOutcome::Completed { report },
            Err(err) => {
                let message = format!("Reformat pass failed: {}", err);
                error!(error = %err, "Reformat pass failed");
                self.host.notify_error(&message);
                TickOutcome::Aborted { message }
            }
        }
    }
}
