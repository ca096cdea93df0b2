//! Microphone capture via `cpal`.
//!
//! cpal streams are not `Send`, so the stream lives on a dedicated worker
//! thread; [`CpalRecorder`] is a thin command-channel client that satisfies
//! the [`Recorder`] seam the orchestrator uses. The stream callback appends
//! f32 samples to a scratch buffer; stopping drains the scratch on every
//! exit path, downmixes, resamples to 16 kHz and returns an [`AudioClip`].
//!
//! While a session is active a meter thread samples the scratch every 50 ms
//! (~20 Hz), maps the window's power from [-50 dB, 0 dB] onto [0, 1] and
//! publishes it through an atomic cell for whatever UI wants a VU bar.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    mpsc as std_mpsc, Arc, Mutex,
};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::clip::AudioClip;
use super::convert::{f32_to_i16, level_from_rms, resample_to_16k, stereo_to_mono};

/// Cadence of the amplitude meter (50 ms ≈ 20 Hz).
const METER_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// RecorderError
// ---------------------------------------------------------------------------

/// Errors raised while opening or starting the capture device.
#[derive(Debug, Clone, Error)]
pub enum RecorderError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    /// The device exists but cannot be opened — busy, misconfigured, or the
    /// OS denied microphone access.
    #[error("failed to start recording: {0}")]
    FailedToStart(String),
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Seam between the orchestrator and the capture device.
pub trait Recorder: Send {
    /// `true` when an input device is present. Checked before every
    /// recording attempt; with cpal this is the closest observable proxy for
    /// microphone permission.
    fn device_available(&self) -> bool;

    /// Begin capturing. Any in-progress session is reset first (idempotent
    /// restart — previous audio is discarded).
    fn start_recording(&mut self) -> Result<(), RecorderError>;

    /// Stop capturing and return the finished clip, or `None` when nothing
    /// was recording. The scratch buffer is released on every exit path.
    fn stop_recording(&mut self) -> Option<AudioClip>;
}

// ---------------------------------------------------------------------------
// CpalRecorder
// ---------------------------------------------------------------------------

enum WorkerCommand {
    DeviceAvailable(std_mpsc::Sender<bool>),
    Start(std_mpsc::Sender<Result<(), RecorderError>>),
    Stop(std_mpsc::Sender<Option<AudioClip>>),
    Quit,
}

/// cpal-backed recorder. Public methods round-trip over a command channel to
/// the worker thread that owns the stream; each call blocks only for the few
/// milliseconds the worker needs.
pub struct CpalRecorder {
    commands: std_mpsc::Sender<WorkerCommand>,
    level: Arc<AtomicU32>,
}

impl CpalRecorder {
    /// Spawn the worker thread and return the client handle.
    pub fn new() -> Self {
        let (tx, rx) = std_mpsc::channel();
        let level = Arc::new(AtomicU32::new(0.0_f32.to_bits()));

        let worker_level = Arc::clone(&level);
        std::thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || worker_loop(rx, worker_level))
            .expect("failed to spawn audio-capture thread");

        Self {
            commands: tx,
            level,
        }
    }

    /// Most recent amplitude sample in `[0.0, 1.0]`; `0.0` while idle.
    pub fn level(&self) -> f32 {
        f32::from_bits(self.level.load(Ordering::Relaxed))
    }
}

impl Default for CpalRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder for CpalRecorder {
    fn device_available(&self) -> bool {
        let (reply_tx, reply_rx) = std_mpsc::channel();
        if self
            .commands
            .send(WorkerCommand::DeviceAvailable(reply_tx))
            .is_err()
        {
            return false;
        }
        reply_rx.recv().unwrap_or(false)
    }

    fn start_recording(&mut self) -> Result<(), RecorderError> {
        let (reply_tx, reply_rx) = std_mpsc::channel();
        self.commands
            .send(WorkerCommand::Start(reply_tx))
            .map_err(|_| RecorderError::FailedToStart("capture worker is gone".into()))?;
        reply_rx
            .recv()
            .map_err(|_| RecorderError::FailedToStart("capture worker is gone".into()))?
    }

    fn stop_recording(&mut self) -> Option<AudioClip> {
        let (reply_tx, reply_rx) = std_mpsc::channel();
        self.commands.send(WorkerCommand::Stop(reply_tx)).ok()?;
        reply_rx.recv().ok()?
    }
}

impl Drop for CpalRecorder {
    fn drop(&mut self) {
        let _ = self.commands.send(WorkerCommand::Quit);
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

/// One armed capture session owned by the worker.
struct Session {
    /// Keeps the cpal stream alive; dropping it stops the hardware stream.
    _stream: cpal::Stream,
    scratch: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
    channels: u16,
    meter_stop: Arc<AtomicBool>,
    meter: Option<std::thread::JoinHandle<()>>,
}

impl Session {
    /// Tear the session down and drain the scratch buffer.
    fn finish(mut self, level: &Arc<AtomicU32>) -> Vec<f32> {
        self.meter_stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.meter.take() {
            let _ = handle.join();
        }
        level.store(0.0_f32.to_bits(), Ordering::Relaxed);

        let mut scratch = self.scratch.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *scratch)
    }
}

fn worker_loop(commands: std_mpsc::Receiver<WorkerCommand>, level: Arc<AtomicU32>) {
    let mut session: Option<Session> = None;

    while let Ok(command) = commands.recv() {
        match command {
            WorkerCommand::DeviceAvailable(reply) => {
                let available = cpal::default_host().default_input_device().is_some();
                let _ = reply.send(available);
            }

            WorkerCommand::Start(reply) => {
                // Idempotent restart: discard any previous session first.
                if let Some(previous) = session.take() {
                    let _ = previous.finish(&level);
                }
                let result = open_session(&level);
                match result {
                    Ok(new_session) => {
                        session = Some(new_session);
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            WorkerCommand::Stop(reply) => {
                let clip = session.take().map(|s| {
                    let sample_rate = s.sample_rate;
                    let channels = s.channels;
                    let raw = s.finish(&level);
                    let mono = stereo_to_mono(&raw, channels);
                    let resampled = resample_to_16k(&mono, sample_rate);
                    AudioClip::from_samples(f32_to_i16(&resampled))
                });
                let _ = reply.send(clip);
            }

            WorkerCommand::Quit => break,
        }
    }

    // Scratch is released even when the client vanishes mid-recording.
    if let Some(s) = session.take() {
        let _ = s.finish(&level);
    }
}

/// Open the default input device and start streaming into a fresh scratch
/// buffer, with a meter thread publishing amplitude samples.
fn open_session(level: &Arc<AtomicU32>) -> Result<Session, RecorderError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(RecorderError::NoDevice)?;

    let supported = device
        .default_input_config()
        .map_err(|e| RecorderError::FailedToStart(e.to_string()))?;
    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels();
    let config: cpal::StreamConfig = supported.into();

    let scratch = Arc::new(Mutex::new(Vec::<f32>::new()));

    let stream_scratch = Arc::clone(&scratch);
    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = stream_scratch.lock() {
                    buf.extend_from_slice(data);
                }
            },
            |err: cpal::StreamError| {
                log::error!("audio: cpal stream error: {err}");
            },
            None,
        )
        .map_err(|e| RecorderError::FailedToStart(e.to_string()))?;

    stream
        .play()
        .map_err(|e| RecorderError::FailedToStart(e.to_string()))?;

    let meter_stop = Arc::new(AtomicBool::new(false));
    let meter = spawn_meter(
        Arc::clone(&scratch),
        Arc::clone(level),
        Arc::clone(&meter_stop),
        sample_rate,
        channels,
    );

    Ok(Session {
        _stream: stream,
        scratch,
        sample_rate,
        channels,
        meter_stop,
        meter: Some(meter),
    })
}

/// Meter thread: every 50 ms compute the RMS of the most recent window of
/// the scratch buffer and publish the mapped level.
fn spawn_meter(
    scratch: Arc<Mutex<Vec<f32>>>,
    level: Arc<AtomicU32>,
    stop: Arc<AtomicBool>,
    sample_rate: u32,
    channels: u16,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("audio-meter".into())
        .spawn(move || {
            let window = (sample_rate as usize / 20) * channels.max(1) as usize;

            while !stop.load(Ordering::Relaxed) {
                std::thread::sleep(METER_INTERVAL);

                let rms = {
                    let Ok(buf) = scratch.lock() else { break };
                    let tail = &buf[buf.len().saturating_sub(window)..];
                    if tail.is_empty() {
                        0.0
                    } else {
                        let mean_sq =
                            tail.iter().map(|s| s * s).sum::<f32>() / tail.len() as f32;
                        mean_sq.sqrt()
                    }
                };

                level.store(level_from_rms(rms).to_bits(), Ordering::Relaxed);
            }
        })
        .expect("failed to spawn audio-meter thread")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
