//! Continuous listening supervisor
//!
//! Capture backends end sessions on their own (silence timeouts, device
//! hiccups). While the session's listening toggle is on, the listener starts a
//! new capture session as soon as the previous one ends, so listening looks
//! continuous until the user turns it off.

use std::future::Future;

use tokio::sync::mpsc;

use super::{Outcome, Session};
use crate::voice::{SpeechCapture, SpeechEvent};

/// Event channel depth between capture and session
const EVENT_BUFFER: usize = 64;

/// Drives a [`Session`] from a [`SpeechCapture`]
pub struct Listener<C> {
    capture: C,
    events_tx: mpsc::Sender<SpeechEvent>,
    events_rx: mpsc::Receiver<SpeechEvent>,
    sessions_started: usize,
}

impl<C: SpeechCapture> Listener<C> {
    #[must_use]
    pub fn new(capture: C) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            capture,
            events_tx,
            events_rx,
            sessions_started: 0,
        }
    }

    /// Listen until `shutdown` resolves or capture becomes unavailable
    ///
    /// Events are handled strictly one at a time; a quote fetch in progress
    /// holds back everything queued behind it, but never `shutdown`, which
    /// abandons the event being handled. `on_outcome` sees the result of every
    /// event handled to completion.
    ///
    /// Listening is announced only once the first capture session has started.
    pub async fn run<F, O>(&mut self, session: &mut Session, shutdown: F, mut on_outcome: O)
    where
        F: Future<Output = ()>,
        O: FnMut(&Session, &Outcome),
    {
        if !self.begin(session).await {
            return;
        }
        session.start_listening();

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    self.capture.stop();
                    session.stop_listening();
                    break;
                }
                event = self.events_rx.recv() => {
                    match event {
                        Some(SpeechEvent::End) => {
                            if !session.is_listening() {
                                break;
                            }
                            tracing::debug!(capture = self.capture.name(), "capture session ended, restarting");
                            if !self.begin(session).await {
                                break;
                            }
                        }
                        Some(event) => {
                            tokio::select! {
                                biased;

                                () = &mut shutdown => {
                                    tracing::debug!("shutdown while handling an event");
                                    self.capture.stop();
                                    session.stop_listening();
                                    break;
                                }
                                outcome = session.handle_event(event) => on_outcome(session, &outcome),
                            }
                        }
                        None => break,
                    }
                }
            }
        }
    }

    async fn begin(&mut self, session: &mut Session) -> bool {
        match self.capture.start(self.events_tx.clone()).await {
            Ok(()) => {
                self.sessions_started += 1;
                true
            }
            Err(e) => {
                session.recognition_unavailable(&e.to_string());
                false
            }
        }
    }

    /// Capture sessions started so far
    #[must_use]
    pub const fn sessions_started(&self) -> usize {
        self.sessions_started
    }
}
