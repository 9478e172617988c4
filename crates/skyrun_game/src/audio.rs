//! Background music collaborator.
//!
//! The simulation never touches an audio device; the host routes session
//! events into a `Soundtrack`. The default build uses `SilentSoundtrack`.
//! With the `audio` feature, `RodioSoundtrack` loops a WAV file.

use crate::session::SessionEvent;

pub trait Soundtrack {
    fn play(&mut self);
    fn pause(&mut self);
    fn rewind(&mut self);
}

/// Pause on a fall; rewind and play on revive.
pub fn route_session_event(soundtrack: &mut dyn Soundtrack, event: SessionEvent) {
    match event {
        SessionEvent::FellOut => soundtrack.pause(),
        SessionEvent::Revived => {
            soundtrack.rewind();
            soundtrack.play();
        }
    }
}

#[derive(Debug, Default)]
pub struct SilentSoundtrack {
    playing: bool,
}

impl SilentSoundtrack {
    #[allow(dead_code)]
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Soundtrack for SilentSoundtrack {
    fn play(&mut self) {
        self.playing = true;
        log::debug!("Music: play (silent)");
    }

    fn pause(&mut self) {
        self.playing = false;
        log::debug!("Music: pause (silent)");
    }

    fn rewind(&mut self) {
        log::debug!("Music: rewind (silent)");
    }
}

#[cfg(feature = "audio")]
pub use device::RodioSoundtrack;

#[cfg(feature = "audio")]
mod device {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::Soundtrack;

    pub struct RodioSoundtrack {
        _stream: OutputStream,
        _handle: OutputStreamHandle,
        sink: Sink,
        path: PathBuf,
    }

    impl RodioSoundtrack {
        pub fn open(path: &Path, volume: f32) -> Result<Self, String> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| format!("Failed to open audio output: {e}"))?;
            let sink = Sink::try_new(&handle)
                .map_err(|e| format!("Failed to create audio sink: {e}"))?;
            sink.set_volume(volume);
            sink.pause();
            let soundtrack = Self {
                _stream: stream,
                _handle: handle,
                sink,
                path: path.to_path_buf(),
            };
            soundtrack.queue_from_start()?;
            Ok(soundtrack)
        }

        fn queue_from_start(&self) -> Result<(), String> {
            let file = File::open(&self.path)
                .map_err(|e| format!("Failed to read {}: {e}", self.path.display()))?;
            let source = Decoder::new(BufReader::new(file))
                .map_err(|e| format!("Failed to decode {}: {e}", self.path.display()))?;
            self.sink.append(source.repeat_infinite());
            Ok(())
        }
    }

    impl Soundtrack for RodioSoundtrack {
        fn play(&mut self) {
            self.sink.play();
        }

        fn pause(&mut self) {
            self.sink.pause();
        }

        fn rewind(&mut self) {
            // Clearing also pauses; the caller resumes with `play`.
            self.sink.clear();
            if let Err(err) = self.queue_from_start() {
                log::warn!("Music rewind failed: {err}");
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        Play,
        Pause,
        Rewind,
    }

    #[derive(Debug, Default)]
    pub struct RecordingSoundtrack {
        pub calls: Vec<Call>,
    }

    impl Soundtrack for RecordingSoundtrack {
        fn play(&mut self) {
            self.calls.push(Call::Play);
        }

        fn pause(&mut self) {
            self.calls.push(Call::Pause);
        }

        fn rewind(&mut self) {
            self.calls.push(Call::Rewind);
        }
    }

    #[test]
    fn fall_pauses_music() {
        let mut soundtrack = RecordingSoundtrack::default();
        route_session_event(&mut soundtrack, SessionEvent::FellOut);
        assert_eq!(soundtrack.calls, vec![Call::Pause]);
    }

    #[test]
    fn revive_restarts_music_from_the_top() {
        let mut soundtrack = RecordingSoundtrack::default();
        route_session_event(&mut soundtrack, SessionEvent::Revived);
        assert_eq!(soundtrack.calls, vec![Call::Rewind, Call::Play]);
    }

    #[test]
    fn silent_soundtrack_tracks_play_state() {
        let mut soundtrack = SilentSoundtrack::default();
        assert!(!soundtrack.is_playing());
        soundtrack.play();
        assert!(soundtrack.is_playing());
        route_session_event(&mut soundtrack, SessionEvent::FellOut);
        assert!(!soundtrack.is_playing());
        route_session_event(&mut soundtrack, SessionEvent::Revived);
        assert!(soundtrack.is_playing());
    }
}
