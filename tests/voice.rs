//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::{Json, Router, body::Bytes, http::HeaderMap, http::StatusCode, routing::post};
use rajesh::Error;
use rajesh::voice::{
    ENERGY_THRESHOLD, SAMPLE_RATE, SegmenterState, SpeechSegmenter, SpeechToText, TextToSpeech,
    rms, samples_to_wav,
};
use serde_json::json;
use tokio_test::assert_ok;

mod common;
use common::spawn_server;

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

#[test]
fn test_rms_levels() {
    assert!(rms(&[]).abs() < f32::EPSILON);
    assert!(rms(&generate_silence(0.1)).abs() < f32::EPSILON);

    // sine RMS is amplitude / sqrt(2)
    let level = rms(&generate_sine_samples(440.0, 0.5, 0.5));
    assert!((level - 0.5 / 2f32.sqrt()).abs() < 0.01);
    assert!(level > ENERGY_THRESHOLD);
}

#[test]
fn test_segmenter_starts_idle_and_ignores_silence() {
    let mut segmenter = SpeechSegmenter::default();
    assert_eq!(segmenter.state(), SegmenterState::Idle);

    assert!(segmenter.push(&generate_silence(1.0)).is_none());
    assert!(segmenter.push(&[]).is_none());
    assert!(segmenter.is_idle());
}

#[test]
fn test_segmenter_emits_utterance_after_silence() {
    let mut segmenter = SpeechSegmenter::default();
    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    let silence = generate_silence(0.6);

    assert!(segmenter.push(&speech).is_none());
    assert_eq!(segmenter.state(), SegmenterState::Speaking);

    let segment = segmenter.push(&silence).expect("utterance complete");
    assert_eq!(segment.len(), speech.len() + silence.len());
    assert!(segmenter.is_idle());
}

#[test]
fn test_segmenter_waits_through_short_pauses() {
    let mut segmenter = SpeechSegmenter::default();

    segmenter.push(&generate_sine_samples(440.0, 0.3, 0.3));
    // 0.25s pause, then more speech: still one utterance
    assert!(segmenter.push(&generate_silence(0.25)).is_none());
    assert!(segmenter.push(&generate_sine_samples(440.0, 0.3, 0.3)).is_none());
    assert!(segmenter.push(&generate_silence(0.25)).is_none());
    assert_eq!(segmenter.state(), SegmenterState::Speaking);

    let segment = segmenter.push(&generate_silence(0.4)).expect("utterance complete");
    assert_eq!(segment.len(), (SAMPLE_RATE as usize * 15) / 10);
}

#[test]
fn test_segmenter_drops_short_blips() {
    let mut segmenter = SpeechSegmenter::default();

    segmenter.push(&generate_sine_samples(440.0, 0.1, 0.3));
    assert!(segmenter.push(&generate_silence(0.6)).is_none());
    assert!(segmenter.is_idle());
}

#[test]
fn test_segmenter_threshold_and_reset() {
    let mut quiet = SpeechSegmenter::new(0.5);
    assert!(quiet.push(&generate_sine_samples(440.0, 0.5, 0.3)).is_none());
    assert!(quiet.is_idle());

    let mut segmenter = SpeechSegmenter::default();
    segmenter.push(&generate_sine_samples(440.0, 0.5, 0.3));
    segmenter.reset();
    assert!(segmenter.is_idle());
    assert!(segmenter.push(&generate_silence(0.6)).is_none());
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = assert_ok!(samples_to_wav(&samples, SAMPLE_RATE));

    // Check WAV header magic
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");

    // WAV should have reasonable size
    assert!(wav_data.len() > 44); // WAV header is 44 bytes
}

#[test]
fn test_wav_is_mono_16_bit() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), original_samples.len());
    assert_eq!(read_samples[0], 0);
    assert!(read_samples[3] > 32000);
    assert!(read_samples[4] < -32000);
}

#[test]
fn test_whisper_requires_key() {
    let err = SpeechToText::new_whisper(String::new(), "whisper-1".to_string(), "en-IN");
    assert!(matches!(err, Err(Error::Config(_))));
}

type Captured = Arc<Mutex<Option<(String, Vec<u8>)>>>;

async fn spawn_whisper(status: StatusCode) -> (String, Captured) {
    let captured = Captured::default();
    let sink = captured.clone();
    let router = Router::new().route(
        "/v1/audio/transcriptions",
        post(move |headers: HeaderMap, body: Bytes| {
            let sink = sink.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                *sink.lock().unwrap() = Some((auth, body.to_vec()));
                if status.is_success() {
                    (status, Json(json!({ "text": "price of reliance" })))
                } else {
                    (status, Json(json!({ "error": { "message": "bad key" } })))
                }
            }
        }),
    );
    let base = spawn_server(router).await;
    (format!("{base}/v1/audio/transcriptions"), captured)
}

#[tokio::test]
async fn test_transcribe_posts_wav_with_language_hint() {
    let (url, captured) = spawn_whisper(StatusCode::OK).await;
    let stt = SpeechToText::new_whisper("sk-test".to_string(), "whisper-1".to_string(), "en-IN")
        .unwrap()
        .with_url(url);

    let wav = samples_to_wav(&generate_sine_samples(440.0, 0.1, 0.3), SAMPLE_RATE).unwrap();
    let text = stt.transcribe(&wav).await.unwrap();

    assert_eq!(text, "price of reliance");

    let (auth, body) = captured.lock().unwrap().take().unwrap();
    assert_eq!(auth, "Bearer sk-test");
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("name=\"model\""));
    assert!(body.contains("whisper-1"));
    assert!(body.contains("name=\"language\""));
    assert!(body.contains("filename=\"audio.wav\""));
}

#[tokio::test]
async fn test_transcribe_reports_api_errors() {
    let (url, _captured) = spawn_whisper(StatusCode::UNAUTHORIZED).await;
    let stt = SpeechToText::new_whisper("sk-bad".to_string(), "whisper-1".to_string(), "en-IN")
        .unwrap()
        .with_url(url);

    let err = stt.transcribe(b"RIFF").await.unwrap_err();
    assert!(matches!(err, Error::Stt(ref msg) if msg.contains("401")));
}

#[tokio::test]
async fn test_openai_tts_request_shape() {
    let seen: Arc<Mutex<Option<(String, serde_json::Value)>>> = Arc::default();
    let sink = seen.clone();
    let router = Router::new().route(
        "/v1/audio/speech",
        post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
            let sink = sink.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                *sink.lock().unwrap() = Some((auth, body));
                Bytes::from_static(b"ID3fake-mp3")
            }
        }),
    );
    let base = spawn_server(router).await;

    let tts = TextToSpeech::openai(
        "sk-test".to_string(),
        "tts-1".to_string(),
        "alloy".to_string(),
        1.25,
    )
    .unwrap()
    .with_url(format!("{base}/v1/audio/speech"));

    let audio = tts.synthesize("TCS is up").await.unwrap();
    assert_eq!(audio, b"ID3fake-mp3");

    let (auth, body) = seen.lock().unwrap().take().unwrap();
    assert_eq!(auth, "Bearer sk-test");
    assert_eq!(
        body,
        json!({ "model": "tts-1", "input": "TCS is up", "voice": "alloy", "speed": 1.25 })
    );
}

#[tokio::test]
async fn test_tts_error_status() {
    let router = Router::new().route(
        "/speech",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let base = spawn_server(router).await;
    let tts = TextToSpeech::elevenlabs("key".to_string(), "voice".to_string())
        .unwrap()
        .with_url(format!("{base}/speech"));

    let err = tts.synthesize("hello").await.unwrap_err();
    assert!(matches!(err, Error::Tts(ref msg) if msg.contains("429") && msg.contains("slow down")));
}
