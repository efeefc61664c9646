//! Audio system for background music and sound effects

use crate::session::Sound;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{debug, warn};

const BGM_FILE: &str = "theme.wav";

/// Anything that can play the game's sound requests
pub trait SoundPlayer {
    fn play(&mut self, sound: Sound);
}

/// A missing player plays nothing
impl<P: SoundPlayer> SoundPlayer for Option<P> {
    fn play(&mut self, sound: Sound) {
        if let Some(player) = self {
            player.play(sound);
        }
    }
}

fn sfx_filename(sound: Sound) -> &'static str {
    match sound {
        Sound::Move => "move.wav",
        Sound::Rotate => "rotate.wav",
        Sound::Drop => "drop.wav",
        Sound::GameOver => "game_over.wav",
    }
}

/// Audio manager handles all sound playback. Every failure is swallowed;
/// the game never depends on sound.
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    bgm_sink: Option<Sink>,
    assets_path: PathBuf,
    bgm_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl AudioManager {
    /// Open the default output device. None if there is no device or no
    /// asset directory.
    pub fn new() -> Option<Self> {
        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                warn!("No audio output: {}", e);
                return None;
            }
        };
        let Some(assets_path) = Self::find_assets_path() else {
            warn!("No assets directory found, running without sound");
            return None;
        };

        Some(Self {
            _stream: stream,
            stream_handle,
            bgm_sink: None,
            assets_path,
            bgm_volume: 0.25,
            sfx_volume: 0.5,
            muted: false,
        })
    }

    fn find_assets_path() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("assets"),
            std::env::current_exe().ok()?.parent()?.join("assets"),
        ];

        paths.into_iter().find(|p| p.join("sfx").exists())
    }

    /// Set BGM volume (0.0 to 1.0)
    pub fn set_bgm_volume(&mut self, volume: f32) {
        self.bgm_volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.bgm_sink {
            sink.set_volume(self.bgm_volume);
        }
    }

    /// Set SFX volume (0.0 to 1.0)
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.pause_bgm();
        }
    }

    /// Play background music from the start, looping
    pub fn play_bgm(&mut self) {
        self.stop_bgm();
        if self.muted {
            return;
        }

        let path = self.assets_path.join("bgm").join(BGM_FILE);
        let Ok(file) = File::open(&path) else {
            debug!("BGM not found at {}", path.display());
            return;
        };
        let Ok(sink) = Sink::try_new(&self.stream_handle) else { return };
        let Ok(decoder) = Decoder::new(BufReader::new(file)) else { return };

        sink.set_volume(self.bgm_volume);
        sink.append(decoder.repeat_infinite());
        self.bgm_sink = Some(sink);
    }

    pub fn stop_bgm(&mut self) {
        if let Some(sink) = self.bgm_sink.take() {
            sink.stop();
        }
    }

    pub fn pause_bgm(&mut self) {
        if let Some(sink) = &self.bgm_sink {
            sink.pause();
        }
    }

    /// Resume paused music; starts it if none was loaded yet
    pub fn resume_bgm(&mut self) {
        if self.muted {
            return;
        }
        match &self.bgm_sink {
            Some(sink) => sink.play(),
            None => self.play_bgm(),
        }
    }
}

impl SoundPlayer for AudioManager {
    fn play(&mut self, sound: Sound) {
        if self.muted || self.sfx_volume <= 0.0 {
            return;
        }

        let path = self.assets_path.join("sfx").join(sfx_filename(sound));
        let Ok(file) = File::open(&path) else { return };
        let Ok(decoder) = Decoder::new(BufReader::new(file)) else { return };
        if let Ok(sink) = Sink::try_new(&self.stream_handle) {
            sink.set_volume(self.sfx_volume);
            sink.append(decoder);
            sink.detach();
        }
    }
}
