//! Speech capture sessions
//!
//! A [`SpeechCapture`] runs one capture session at a time and reports what it
//! hears as [`SpeechEvent`]s on a channel. Every session finishes with exactly
//! one [`SpeechEvent::End`], whether it was stopped, timed out on silence, or
//! failed. Deciding whether to start another session is the listener's job.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{Mutex, mpsc, oneshot, watch};

use super::capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
use super::segmenter::SpeechSegmenter;
use super::stt::SpeechToText;
use crate::{Error, Result};

/// Microphone polling interval
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A recognized piece of speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    /// Complete result rather than a partial hypothesis
    pub is_final: bool,
}

impl Utterance {
    #[must_use]
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    #[must_use]
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// Event emitted by a capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Recognized speech
    Result(Utterance),
    /// A recognition attempt failed; the session keeps going
    Error(String),
    /// The session is over
    End,
}

/// A source of capture sessions
#[async_trait]
pub trait SpeechCapture: Send {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Begin a capture session delivering events to `events`
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecognitionUnavailable`] when no session can be started
    async fn start(&mut self, events: mpsc::Sender<SpeechEvent>) -> Result<()>;

    /// Ask the current session to end; its `End` event still arrives
    fn stop(&mut self);
}

#[async_trait]
impl<T: SpeechCapture + ?Sized> SpeechCapture for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn start(&mut self, events: mpsc::Sender<SpeechEvent>) -> Result<()> {
        (**self).start(events).await
    }

    fn stop(&mut self) {
        (**self).stop();
    }
}

/// Microphone capture segmented by energy and transcribed by STT
///
/// Each session runs on its own OS thread because cpal streams cannot move
/// between threads. A session ends on [`SpeechCapture::stop`] or after
/// `session_timeout` without speech.
pub struct MicrophoneCapture {
    stt: Arc<SpeechToText>,
    session_timeout: Duration,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl MicrophoneCapture {
    #[must_use]
    pub fn new(stt: SpeechToText, session_timeout: Duration) -> Self {
        Self {
            stt: Arc::new(stt),
            session_timeout,
            stop_flag: None,
        }
    }
}

#[async_trait]
impl SpeechCapture for MicrophoneCapture {
    fn name(&self) -> &'static str {
        "microphone"
    }

    async fn start(&mut self, events: mpsc::Sender<SpeechEvent>) -> Result<()> {
        self.stop();

        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel();
        let runtime = tokio::runtime::Handle::current();
        let session = MicSession {
            stt: Arc::clone(&self.stt),
            timeout: self.session_timeout,
            stop: Arc::clone(&stop),
            events,
            runtime,
        };

        std::thread::Builder::new()
            .name("rajesh-mic".to_string())
            .spawn(move || session.run(ready_tx))
            .map_err(|e| Error::RecognitionUnavailable(e.to_string()))?;

        ready_rx
            .await
            .map_err(|_| Error::RecognitionUnavailable("capture thread exited".to_string()))??;

        self.stop_flag = Some(stop);
        tracing::debug!("microphone session started");
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(flag) = self.stop_flag.take() {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

/// State owned by one microphone session thread
struct MicSession {
    stt: Arc<SpeechToText>,
    timeout: Duration,
    stop: Arc<AtomicBool>,
    events: mpsc::Sender<SpeechEvent>,
    runtime: tokio::runtime::Handle,
}

impl MicSession {
    fn run(self, ready: oneshot::Sender<Result<()>>) {
        let mut capture = match AudioCapture::open().and_then(|mut c| c.start().map(|()| c)) {
            Ok(capture) => capture,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        let _ = ready.send(Ok(()));

        let mut segmenter = SpeechSegmenter::default();
        let mut last_activity = Instant::now();

        while !self.stop.load(Ordering::Relaxed) {
            std::thread::sleep(POLL_INTERVAL);

            if let Some(segment) = segmenter.push(&capture.take_buffer()) {
                self.transcribe(&segment);
                last_activity = Instant::now();
            } else if !segmenter.is_idle() {
                last_activity = Instant::now();
            } else if last_activity.elapsed() > self.timeout {
                tracing::debug!("microphone session timed out on silence");
                break;
            }
        }

        capture.stop();
        let _ = self.events.blocking_send(SpeechEvent::End);
    }

    fn transcribe(&self, segment: &[f32]) {
        let event = match samples_to_wav(segment, SAMPLE_RATE)
            .and_then(|wav| self.runtime.block_on(self.stt.transcribe(&wav)))
        {
            Ok(text) if text.trim().is_empty() => return,
            Ok(text) => SpeechEvent::Result(Utterance::final_text(text)),
            Err(e) => SpeechEvent::Error(e.to_string()),
        };
        let _ = self.events.blocking_send(event);
    }
}

/// Typed utterances from stdin, one final result per line
///
/// Stdin is shared across sessions so buffered input survives a restart.
/// Once stdin closes no further session can start.
pub struct ConsoleCapture {
    lines: Arc<Mutex<Lines<BufReader<Stdin>>>>,
    closed: Arc<AtomicBool>,
    stop_tx: Option<watch::Sender<bool>>,
}

impl Default for ConsoleCapture {
    fn default() -> Self {
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())),
            closed: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
        }
    }
}

#[async_trait]
impl SpeechCapture for ConsoleCapture {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn start(&mut self, events: mpsc::Sender<SpeechEvent>) -> Result<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(Error::RecognitionUnavailable("console input closed".to_string()));
        }
        self.stop();

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let lines = Arc::clone(&self.lines);
        let closed = Arc::clone(&self.closed);

        tokio::spawn(async move {
            loop {
                let line = tokio::select! {
                    _ = stop_rx.changed() => break,
                    line = async { lines.lock().await.next_line().await } => line,
                };

                let event = match line {
                    Ok(Some(text)) if text.trim().is_empty() => continue,
                    Ok(Some(text)) => SpeechEvent::Result(Utterance::final_text(text)),
                    Ok(None) => {
                        closed.store(true, Ordering::Relaxed);
                        break;
                    }
                    Err(e) => SpeechEvent::Error(e.to_string()),
                };

                if events.send(event).await.is_err() {
                    break;
                }
            }
            let _ = events.send(SpeechEvent::End).await;
        });

        self.stop_tx = Some(stop_tx);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(true);
        }
    }
}
