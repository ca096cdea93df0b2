//! Dedicated OS-thread input interceptor using `rdev`.
//!
//! Two hook modes:
//!
//! * **suppressing** (`rdev::grab`) — the push-to-talk key's own press and
//!   release events are swallowed so no other application observes them;
//!   everything else passes through unmodified.
//! * **passive** (`rdev::listen`) — edges are observed without altering the
//!   event stream.
//!
//! Either way the hook blocks its thread forever while healthy. If the
//! platform tears the hook down later (input-storm or timeout protection)
//! the thread re-arms it after a short delay. A hook that fails within the
//! probe window right after [`InputInterceptor::start`] is reported as a
//! [`PermissionError`] instead — on macOS and Linux a denied hook fails
//! synchronously.
//!
//! # Shutdown caveat
//!
//! rdev has no graceful shutdown API. [`InputInterceptor::stop`] sets a flag
//! that turns the callback into a pass-through (no edges emitted, nothing
//! suppressed); the OS thread itself remains parked in the event loop until
//! the process exits. It consumes no meaningful CPU there.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc as std_mpsc, Arc,
};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use super::{HotkeyEdge, PermissionError};

/// How long a hook must survive before it is considered armed. Platform
/// permission failures surface well within this window.
const PROBE_WINDOW: Duration = Duration::from_millis(300);

/// Delay before re-arming a hook the platform tore down mid-flight.
const REARM_DELAY: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// InputInterceptor
// ---------------------------------------------------------------------------

/// Seam between the orchestrator and the platform input hook.
///
/// The production implementation is [`RdevInterceptor`]; tests substitute a
/// fake that records calls and lets the test drive edges directly.
pub trait InputInterceptor: Send {
    /// Install the hook and begin forwarding edges on `edges`.
    ///
    /// # Errors
    ///
    /// [`PermissionError`] when the OS rejects low-level input access.
    /// Callers are expected to retry with backoff.
    fn start(&mut self, edges: mpsc::Sender<HotkeyEdge>) -> Result<(), PermissionError>;

    /// Stop forwarding (and suppressing) events.
    fn stop(&mut self);
}

// ---------------------------------------------------------------------------
// RdevInterceptor
// ---------------------------------------------------------------------------

/// rdev-backed interceptor watching a single key.
pub struct RdevInterceptor {
    key: rdev::Key,
    swallow: bool,
    /// Stop flag of the currently armed hook, if any.
    session: Option<Arc<AtomicBool>>,
}

impl RdevInterceptor {
    /// Watch `key`; when `swallow` is set the key's own events are grabbed
    /// so no other listener observes them.
    pub fn new(key: rdev::Key, swallow: bool) -> Self {
        Self {
            key,
            swallow,
            session: None,
        }
    }
}

impl InputInterceptor for RdevInterceptor {
    fn start(&mut self, edges: mpsc::Sender<HotkeyEdge>) -> Result<(), PermissionError> {
        // Re-starting replaces any previous session.
        self.stop();

        let stop = Arc::new(AtomicBool::new(false));
        let (probe_tx, probe_rx) = std_mpsc::channel::<String>();

        let key = self.key;
        let swallow = self.swallow;
        let stop_hook = Arc::clone(&stop);

        std::thread::Builder::new()
            .name("input-hook".into())
            .spawn(move || hook_thread(key, swallow, stop_hook, edges, probe_tx))
            .map_err(|e| PermissionError(format!("cannot spawn input-hook thread: {e}")))?;

        // A denied hook errors out almost immediately; one that survives the
        // probe window is armed and will block its thread from here on.
        match probe_rx.recv_timeout(PROBE_WINDOW) {
            Ok(message) => Err(PermissionError(message)),
            Err(_) => {
                self.session = Some(stop);
                Ok(())
            }
        }
    }

    fn stop(&mut self) {
        if let Some(flag) = self.session.take() {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

impl Drop for RdevInterceptor {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Hook thread
// ---------------------------------------------------------------------------

/// Body of the dedicated hook thread: arm, and re-arm on platform teardown.
fn hook_thread(
    key: rdev::Key,
    swallow: bool,
    stop: Arc<AtomicBool>,
    edges: mpsc::Sender<HotkeyEdge>,
    probe_tx: std_mpsc::Sender<String>,
) {
    // One Pressed edge per physical hold: OS auto-repeat re-delivers
    // KeyPress while the key is down.
    let pressed = Arc::new(AtomicBool::new(false));
    let mut first_attempt = Some(probe_tx);

    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }

        let attempt_started = Instant::now();
        let result = if swallow {
            run_grab(key, &stop, &pressed, &edges)
        } else {
            run_listen(key, &stop, &pressed, &edges)
        };

        let Err(message) = result else {
            return;
        };

        // An error inside the probe window is a startup denial — report it
        // and let the caller's retry loop own the backoff.
        if attempt_started.elapsed() < PROBE_WINDOW {
            if let Some(tx) = first_attempt.take() {
                let _ = tx.send(message);
                return;
            }
        }

        first_attempt = None;
        log::warn!("input-hook: hook dropped by the platform ({message}); re-arming");
        std::thread::sleep(REARM_DELAY);
    }
}

/// Suppressing hook: matched events are swallowed by returning `None`.
fn run_grab(
    key: rdev::Key,
    stop: &Arc<AtomicBool>,
    pressed: &Arc<AtomicBool>,
    edges: &mpsc::Sender<HotkeyEdge>,
) -> Result<(), String> {
    let stop = Arc::clone(stop);
    let pressed = Arc::clone(pressed);
    let edges = edges.clone();

    rdev::grab(move |event: rdev::Event| -> Option<rdev::Event> {
        if stop.load(Ordering::Relaxed) {
            return Some(event);
        }

        match event.event_type {
            rdev::EventType::KeyPress(k) if k == key => {
                if !pressed.swap(true, Ordering::Relaxed) {
                    let _ = edges.blocking_send(HotkeyEdge::Pressed(k));
                }
                None
            }
            rdev::EventType::KeyRelease(k) if k == key => {
                if pressed.swap(false, Ordering::Relaxed) {
                    let _ = edges.blocking_send(HotkeyEdge::Released(k));
                }
                None
            }
            _ => Some(event),
        }
    })
    .map_err(|e| format!("{e:?}"))
}

/// Passive hook: edges are observed, nothing is suppressed.
fn run_listen(
    key: rdev::Key,
    stop: &Arc<AtomicBool>,
    pressed: &Arc<AtomicBool>,
    edges: &mpsc::Sender<HotkeyEdge>,
) -> Result<(), String> {
    let stop = Arc::clone(stop);
    let pressed = Arc::clone(pressed);
    let edges = edges.clone();

    rdev::listen(move |event: rdev::Event| {
        if stop.load(Ordering::Relaxed) {
            return;
        }

        match event.event_type {
            rdev::EventType::KeyPress(k) if k == key => {
                if !pressed.swap(true, Ordering::Relaxed) {
                    let _ = edges.blocking_send(HotkeyEdge::Pressed(k));
                }
            }
            rdev::EventType::KeyRelease(k) if k == key => {
                if pressed.swap(false, Ordering::Relaxed) {
                    let _ = edges.blocking_send(HotkeyEdge::Released(k));
                }
            }
            _ => {}
        }
    })
    .map_err(|e| format!("{e:?}"))
}
