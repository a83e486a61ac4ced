//! Game sounds, synthesized with fundsp and played through rodio.

use fundsp::{hpc::*, prelude::*};
use rodio::{self, OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;
use tracing::warn;

/// Sound output. Holding the stream keeps the device alive; without a device
/// the game simply runs silent.
pub struct Audio {
    _stream: Option<OutputStream>,
    handle: Option<OutputStreamHandle>,
}

impl Audio {
    pub fn open() -> Self {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Self {
                _stream: Some(stream),
                handle: Some(handle),
            },
            Err(err) => {
                warn!(%err, "no audio output device, playing without sound");
                Self {
                    _stream: None,
                    handle: None,
                }
            }
        }
    }

    fn sink(&self) -> Option<Sink> {
        let handle = self.handle.as_ref()?;
        Sink::try_new(handle).ok()
    }

    /// Rising chirp: the light turned green, go.
    pub fn play_green(&self) {
        if let Some(sink) = self.sink() {
            play_chirp(sink, 440.0, 880.0);
        }
    }

    /// Falling chirp: the light turned red, freeze.
    pub fn play_red(&self) {
        if let Some(sink) = self.sink() {
            play_chirp(sink, 660.0, 220.0);
        }
    }

    /// Sawtooth drop for any loss.
    pub fn play_loss(&self) {
        if let Some(sink) = self.sink() {
            // Frequency ramp 300Hz to 60Hz over 0.5s, fading out over 0.6s.
            let freq = lfo(|t: f64| lerp11(300.0, 60.0, (t / 0.5).min(1.0)));
            let gain = lfo(|t: f64| lerp11(0.15, 0.0, (t / 0.6).min(1.0)));
            let sound = freq >> saw() >> mul(gain);

            let source = rodio::source::from_iter(sound.take(44100 * 0.6))
                .convert_samples::<f32>()
                .periodic_samples(Duration::from_secs_f32(1.0 / 44100.0), 1);

            sink.append(source);
            sink.detach();
        }
    }

    /// Three-note arpeggio for a win.
    pub fn play_win(&self) {
        if let Some(sink) = self.sink() {
            // C5, E5, G5 steps with a gentle fade.
            let freq = lfo(|t: f64| {
                if t < 0.12 {
                    523.25
                } else if t < 0.24 {
                    659.25
                } else {
                    783.99
                }
            });
            let gain = lfo(|t: f64| lerp11(0.12, 0.0, (t / 0.5).min(1.0)));
            let sound = freq >> sine() >> mul(gain);

            let source = rodio::source::from_iter(sound.take(44100 * 0.5))
                .convert_samples::<f32>()
                .periodic_samples(Duration::from_secs_f32(1.0 / 44100.0), 1);

            sink.append(source);
            sink.detach();
        }
    }
}

fn play_chirp(sink: Sink, from_hz: f64, to_hz: f64) {
    let freq = lfo(move |t: f64| lerp11(from_hz, to_hz, (t / 0.1).min(1.0)));
    let gain = lfo(|t: f64| lerp11(0.1, 0.0, (t / 0.15).min(1.0)));
    let sound = freq >> sine() >> mul(gain);

    let source = rodio::source::from_iter(sound.take(44100 * 0.15))
        .convert_samples::<f32>()
        .periodic_samples(Duration::from_secs_f32(1.0 / 44100.0), 1);

    sink.append(source);
    sink.detach();
}
