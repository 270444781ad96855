//! A 1ms-tick periodic event scheduler. Grounded on `original_source/src/World/EventMgr.h`: a
//! background thread walks a list of events once per tick, firing each whose period has
//! elapsed. The list is guarded by a re-entrant mutex because a callback is allowed to register
//! or deregister further events on the same `EventMgr` it is running under — a plain
//! `std::sync::Mutex` would deadlock the moment that happened.

use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const TICK_PERIOD: Duration = Duration::from_millis(1);

/// The four event slots the orchestrator registers. `3` is skipped in the source enum this is
/// translated from and is not reused here either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventId {
    ProcessIncoming = 0,
    SendKeepAlive = 1,
    SendPing = 2,
    PeriodicSave = 4,
}

type Callback = Arc<Mutex<Box<dyn FnMut() + Send>>>;

pub struct Event {
    id: EventId,
    period: Duration,
    remaining: Duration,
    enabled: bool,
    callback: Callback,
}

impl Event {
    pub fn new(id: EventId, period: Duration, enabled: bool, callback: Box<dyn FnMut() + Send>) -> Self {
        Event {
            id,
            period,
            remaining: period,
            enabled,
            callback: Arc::new(Mutex::new(callback)),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Advances the countdown by `diff`. Fires (and resets the countdown to a fresh period)
    /// once `diff` catches up to or passes the remaining time. Returns a handle to the callback
    /// on fire without invoking it, so the caller can run it after releasing any borrow held
    /// over the event list.
    fn advance(&mut self, diff: Duration) -> Option<Callback> {
        if !self.enabled {
            return None;
        }
        if diff >= self.remaining {
            self.remaining = self.period;
            Some(Arc::clone(&self.callback))
        } else {
            self.remaining -= diff;
            None
        }
    }
}

type EventList = Arc<ReentrantMutex<RefCell<Vec<Event>>>>;

/// A cheaply cloneable handle to the event list, handed to callbacks so they can register or
/// deregister events from inside their own invocation.
#[derive(Clone)]
pub struct EventRegistry {
    events: EventList,
}

impl EventRegistry {
    fn new() -> Self {
        EventRegistry {
            events: Arc::new(ReentrantMutex::new(RefCell::new(Vec::new()))),
        }
    }

    pub fn add_event(&self, event: Event) {
        let guard = self.events.lock();
        guard.borrow_mut().push(event);
    }

    pub fn remove_event(&self, id: EventId) {
        let guard = self.events.lock();
        guard.borrow_mut().retain(|e| e.id() != id);
    }

    pub fn has_event(&self, id: EventId) -> bool {
        let guard = self.events.lock();
        let found = guard.borrow().iter().any(|e| e.id() == id);
        found
    }

    pub fn set_enabled(&self, id: EventId, enabled: bool) {
        let guard = self.events.lock();
        if let Some(event) = guard.borrow_mut().iter_mut().find(|e| e.id() == id) {
            event.set_enabled(enabled);
        };
    }

    /// Advances every event by `diff`, firing any whose period elapsed. Callbacks may
    /// reentrantly call back into `self` (the re-entrant mutex makes the outer lock safe to
    /// re-take, but the `RefCell` underneath it is not reentrant) — so fired callbacks are only
    /// collected here, and run after the borrow below is dropped.
    fn process(&self, diff: Duration) {
        let fired: Vec<Callback> = {
            let guard = self.events.lock();
            let mut events = guard.borrow_mut();
            events.iter_mut().filter_map(|event| event.advance(diff)).collect()
        };
        for callback in fired {
            (*callback.lock().unwrap())();
        }
    }
}

pub struct EventMgr {
    registry: EventRegistry,
    running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl EventMgr {
    pub fn new() -> Self {
        EventMgr {
            registry: EventRegistry::new(),
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    pub fn registry(&self) -> EventRegistry {
        self.registry.clone()
    }

    pub fn add_event(&self, event: Event) {
        self.registry.add_event(event);
    }

    pub fn remove_event(&self, id: EventId) {
        self.registry.remove_event(id);
    }

    pub fn set_enabled(&self, id: EventId, enabled: bool) {
        self.registry.set_enabled(id, enabled);
    }

    /// Processes one tick's worth of events synchronously, without the background thread —
    /// used by the orchestrator's own tests and by anything embedding the scheduler into an
    /// externally-driven loop.
    pub fn process_once(&self, diff: Duration) {
        self.registry.process(diff);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let registry = self.registry.clone();
        let running = Arc::clone(&self.running);
        self.thread = Some(thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                thread::sleep(TICK_PERIOD);
                registry.process(TICK_PERIOD);
            }
        }));
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Default for EventMgr {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventMgr {
    fn drop(&mut self) {
        self.stop();
    }
}
