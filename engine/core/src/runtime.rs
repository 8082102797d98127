//! Session Runtime
//!
//! Drives a [`GestureSession`] on a tokio task. Pointer events, playback
//! status reports and re-measure requests arrive over an mpsc channel; the
//! loop sleeps until the session's earliest deadline in between. Inputs
//! are processed strictly in arrival order, and every focus announcement a
//! frame produces is queued on the feedback channel before the next input
//! is read.
//!
//! Dropping every [`SessionHandle`] ends the loop and tears the session
//! down. [`SessionRuntime::run`] hands the torn-down session back so the
//! host (or a test) can inspect the screen's final state.

use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::adaptive::AdaptiveSettings;
use crate::events::{now, PointerEvent, SessionOutput};
use crate::geometry::Point;
use crate::media::PlaybackStatus;
use crate::navigation::NavigationSink;
use crate::session::{GestureSession, ScreenHandler};

/// Capacity of the session input channel
pub const INPUT_CHANNEL_CAPACITY: usize = 64;

/// Input accepted by a running session
#[derive(Clone, Debug, PartialEq)]
pub enum SessionInput {
    /// Touch event
    Pointer(PointerEvent),
    /// Playback status report
    Playback(PlaybackStatus),
    /// Layout changed (window resize, orientation)
    Remeasure,
    /// Switch assistance profile
    Adaptive(AdaptiveSettings),
}

/// Errors from a session handle
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// The session loop has ended
    #[error("session closed")]
    Closed,
}

/// Cloneable sender for a running session
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionInput>,
}

impl SessionHandle {
    /// Send an input
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the session loop has ended.
    pub async fn send(&self, input: SessionInput) -> Result<(), RuntimeError> {
        self.tx.send(input).await.map_err(|_| RuntimeError::Closed)
    }

    /// Finger down at `point`, stamped now
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the session loop has ended.
    pub async fn press(&self, point: Point) -> Result<(), RuntimeError> {
        self.send(SessionInput::Pointer(PointerEvent::press(point, now())))
            .await
    }

    /// Finger moved to `point`, stamped now
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the session loop has ended.
    pub async fn move_to(&self, point: Point) -> Result<(), RuntimeError> {
        self.send(SessionInput::Pointer(PointerEvent::moved(point, now())))
            .await
    }

    /// Finger lifted at `point`, stamped now
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the session loop has ended.
    pub async fn release(&self, point: Point) -> Result<(), RuntimeError> {
        self.send(SessionInput::Pointer(PointerEvent::release(point, now())))
            .await
    }

    /// Whether the session loop is still running
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Tokio driver for one mounted screen
pub struct SessionRuntime<H, N> {
    session: GestureSession<H>,
    inputs: mpsc::Receiver<SessionInput>,
    navigator: N,
    observer: Option<mpsc::UnboundedSender<SessionOutput>>,
}

impl<H: ScreenHandler, N: NavigationSink> SessionRuntime<H, N> {
    /// Wrap a session; it is mounted when [`run`](Self::run) starts
    pub fn new(session: GestureSession<H>, navigator: N) -> (Self, SessionHandle) {
        let (tx, inputs) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let runtime = Self {
            session,
            inputs,
            navigator,
            observer: None,
        };
        (runtime, SessionHandle { tx })
    }

    /// Mirror every [`SessionOutput`] to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: mpsc::UnboundedSender<SessionOutput>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run until every handle is dropped, then tear down
    pub async fn run(mut self) -> GestureSession<H> {
        let outputs = self.session.mount(now());
        self.dispatch(outputs);
        debug!("Session runtime started");

        loop {
            let deadline = self.session.next_deadline();
            tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(input) => self.handle_input(input),
                    None => break,
                },
                () = sleep_until(deadline) => {
                    let outputs = self.session.poll(now());
                    self.dispatch(outputs);
                }
            }
        }

        self.session.teardown();
        debug!("Session runtime finished");
        self.session
    }

    fn handle_input(&mut self, input: SessionInput) {
        trace!(?input, "Session input");
        match input {
            SessionInput::Pointer(event) => {
                let outputs = self.session.handle_event(event);
                self.dispatch(outputs);
            }
            SessionInput::Playback(status) => self.session.on_playback_status(status),
            SessionInput::Remeasure => self.session.remeasure(now()),
            SessionInput::Adaptive(settings) => self.session.apply_adaptive(settings),
        }
    }

    fn dispatch(&mut self, outputs: Vec<SessionOutput>) {
        for output in outputs {
            if let SessionOutput::Navigate(request) = &output {
                self.navigator.navigate(request.clone());
            }
            if let Some(observer) = &self.observer {
                // Observers are optional; a dropped one is not an error
                let _ = observer.send(output);
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
