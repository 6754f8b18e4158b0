/// Sound engine: procedural chiptune effects via rodio.
///
/// Every effect is rendered once at init into an in-memory WAV buffer.
/// Playback is fire-and-forget through a detached Sink.
///
/// Build without the "sound" feature to get a silent stub.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_star: Arc<Vec<u8>>,
        sfx_exit: Arc<Vec<u8>>,
        sfx_level: Arc<Vec<u8>>,
        sfx_caught: Arc<Vec<u8>>,
        sfx_complete: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            let wav = |s: Vec<f32>| Arc::new(make_wav(&s));

            Some(SoundEngine {
                _stream: stream,
                handle,
                // C6 E6 G6
                sfx_star: wav(arpeggio(&[1047.0, 1319.0, 1568.0], 0.045, 0.25)),
                // G5 C6
                sfx_exit: wav(arpeggio(&[784.0, 1047.0], 0.1, 0.3)),
                // C5 E5 G5 C6
                sfx_level: wav(arpeggio(&[523.0, 659.0, 784.0, 1047.0], 0.1, 0.3)),
                sfx_caught: wav(sweep(440.0, 180.0, 0.45, 0.3)),
                sfx_complete: wav(arpeggio(&[523.0, 659.0, 784.0, 1047.0, 1319.0, 1568.0], 0.09, 0.3)),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_star(&self) { self.play(&self.sfx_star); }
        pub fn play_exit_open(&self) { self.play(&self.sfx_exit); }
        pub fn play_level_clear(&self) { self.play(&self.sfx_level); }
        pub fn play_caught(&self) { self.play(&self.sfx_caught); }
        pub fn play_complete(&self) { self.play(&self.sfx_complete); }
    }

    /// Notes played back to back, sine + 3rd harmonic for a square-ish tone.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * note_dur) as usize;
        let mut samples = Vec::with_capacity(n * notes.len());
        for &freq in notes {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Linear pitch slide from `from` to `to` Hz with a fading envelope.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq * TAU / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - t).powf(0.6) * volume
            })
            .collect()
    }

    /// 16-bit mono PCM WAV.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
        buf.extend_from_slice(&2u16.to_le_bytes()); // block align
        buf.extend_from_slice(&16u16.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_star(&self) {}
    pub fn play_exit_open(&self) {}
    pub fn play_level_clear(&self) {}
    pub fn play_caught(&self) {}
    pub fn play_complete(&self) {}
}
