//! Recording feedback cues.
//!
//! A short rising chirp when recording starts, a falling one when it stops.
//! rodio's `OutputStream` is not `Send`, so playback lives on a dedicated
//! thread; [`SoundPlayer`] is a cheap cloneable handle that enqueues cues.
//! A machine without an audio output degrades to a logged warning — cues
//! are feedback, never load-bearing.

use std::sync::mpsc;
use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, Sink, Source};

// ---------------------------------------------------------------------------
// Cue
// ---------------------------------------------------------------------------

/// Which feedback sound to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Recording started — rising two-tone.
    Start,
    /// Recording stopped — falling two-tone.
    Stop,
}

// ---------------------------------------------------------------------------
// SoundPlayer
// ---------------------------------------------------------------------------

/// Handle to the playback thread.
#[derive(Clone)]
pub struct SoundPlayer {
    cues: mpsc::Sender<Cue>,
}

impl SoundPlayer {
    /// Spawn the playback thread and return its handle.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<Cue>();

        std::thread::Builder::new()
            .name("sound-cues".into())
            .spawn(move || playback_loop(rx))
            .expect("failed to spawn sound-cues thread");

        Self { cues: tx }
    }

    /// Enqueue a cue. Never blocks; a dead playback thread is ignored.
    pub fn play(&self, cue: Cue) {
        let _ = self.cues.send(cue);
    }
}

// ---------------------------------------------------------------------------
// Playback thread
// ---------------------------------------------------------------------------

fn playback_loop(cues: mpsc::Receiver<Cue>) {
    let Ok((_stream, handle)) = OutputStream::try_default() else {
        log::warn!("sound: no audio output available; cues disabled");
        while cues.recv().is_ok() {}
        return;
    };

    while let Ok(cue) = cues.recv() {
        let sink = match Sink::try_new(&handle) {
            Ok(sink) => sink,
            Err(e) => {
                log::warn!("sound: cannot open sink: {e}");
                continue;
            }
        };

        let (first, second) = match cue {
            Cue::Start => (440.0, 880.0),
            Cue::Stop => (880.0, 440.0),
        };

        sink.append(tone(first));
        sink.append(tone(second));
        sink.detach();
    }
}

/// One 80 ms tone at a gentle volume.
fn tone(frequency: f32) -> impl Source<Item = f32> + Send {
    SineWave::new(frequency)
        .take_duration(Duration::from_millis(80))
        .amplify(0.20)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
