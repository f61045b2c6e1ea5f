//! Background thread that drives the quiescence clock.
//!
//! Ticks and host events must never interleave inside the scheduler, so both
//! go through the same `Mutex`. The thread holds the lock only for the length
//! of one `on_tick` call.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration as StdDuration, Instant};
use tracing::warn;

use crate::host::Host;
use crate::scheduler::Scheduler;

pub type SharedScheduler<H> = Arc<Mutex<Scheduler<H>>>;

const FALLBACK_INTERVAL_MS: u64 = 1000;

pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<H: Host + Send + 'static>(scheduler: SharedScheduler<H>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || run(scheduler, thread_stop));
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stops the thread and waits for it to exit. Safe to repeat.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("Ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<H: Host>(scheduler: SharedScheduler<H>, stop: Arc<AtomicBool>) {
    loop {
        let interval = match scheduler.lock() {
            Ok(guard) => guard
                .clock()
                .interval()
                .to_std()
                .unwrap_or(StdDuration::from_millis(FALLBACK_INTERVAL_MS)),
            Err(_) => {
                warn!("Scheduler lock poisoned; ticker stopping");
                return;
            }
        };

        let deadline = Instant::now() + interval;
        loop {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }

        match scheduler.lock() {
            Ok(mut guard) => {
                guard.on_tick(Utc::now());
            }
            Err(_) => {
                warn!("Scheduler lock poisoned; ticker stopping");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::document::{DocumentId, WindowHandle};
    use crate::error::HostError;
    use crate::host::{EventSource, HostEvent, HostEventKind, SubscriptionId};

    #[derive(Default)]
    struct CountingHost {
        commands: usize,
    }

    impl Host for CountingHost {
        fn has_command(&self, _name: &str) -> bool {
            true
        }
        fn execute_command(&mut self, _name: &str) -> Result<(), HostError> {
            self.commands += 1;
            Ok(())
        }
        fn active_window(&self) -> Option<WindowHandle> {
            None
        }
        fn activate_window(&mut self, _window: &WindowHandle) -> Result<(), HostError> {
            Ok(())
        }
        fn activate_document(&mut self, _document: &DocumentId) -> Result<(), HostError> {
            Ok(())
        }
        fn is_saved(&self, _document: &DocumentId) -> Option<bool> {
            Some(true)
        }
        fn save_document(&mut self, _document: &DocumentId) -> Result<(), HostError> {
            Ok(())
        }
        fn is_foreground(&self) -> bool {
            true
        }
        fn notify_error(&mut self, _message: &str) {}
    }

    struct NullSource;

    impl EventSource for NullSource {
        fn subscribe(&mut self, kind: HostEventKind) -> SubscriptionId {
            SubscriptionId(kind as u64)
        }
        fn unsubscribe(&mut self, _id: SubscriptionId) {}
    }

    #[test]
    fn ticker_drives_a_pass_and_shuts_down() {
        let config = SchedulerConfig {
            tick_interval_ms: 20,
            ..SchedulerConfig::default()
        };
        let mut scheduler = Scheduler::new(CountingHost::default(), config).expect("scheduler");
        scheduler.attach(&mut NullSource).expect("attach");
        let start = Utc::now() - chrono::Duration::seconds(1);
        scheduler.handle_event(&HostEvent::SolutionOpened, start);
        scheduler.handle_event(
            &HostEvent::DocumentSaved {
                document: DocumentId::new("/repo/a.cs"),
            },
            start,
        );
        let shared = Arc::new(Mutex::new(scheduler));

        let mut ticker = Ticker::spawn(Arc::clone(&shared));
        let deadline = Instant::now() + StdDuration::from_secs(5);
        loop {
            let commands = shared.lock().expect("lock").host().commands;
            if commands > 0 || Instant::now() > deadline {
                break;
            }
            thread::sleep(StdDuration::from_millis(10));
        }
        ticker.shutdown();
        ticker.shutdown();

        let guard = shared.lock().expect("lock");
        assert_eq!(guard.host().commands, 1);
        assert!(guard.state().pending.is_empty());
        assert!(!guard.state().is_reformatting);
    }

    #[test]
    fn poisoned_lock_stops_the_ticker() {
        let config = SchedulerConfig {
            tick_interval_ms: 20,
            ..SchedulerConfig::default()
        };
        let mut scheduler = Scheduler::new(CountingHost::default(), config).expect("scheduler");
        scheduler.attach(&mut NullSource).expect("attach");
        let shared = Arc::new(Mutex::new(scheduler));
        let mut ticker = Ticker::spawn(Arc::clone(&shared));

        let poisoner = Arc::clone(&shared);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().expect("lock");
            panic!("host callback panicked");
        })
        .join();
        assert!(shared.is_poisoned());

        let deadline = Instant::now() + StdDuration::from_secs(5);
        while !ticker
            .handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
        {
            assert!(Instant::now() < deadline, "ticker kept running");
            thread::sleep(StdDuration::from_millis(10));
        }
        ticker.shutdown();
        assert!(ticker.handle.is_none());
    }
}
