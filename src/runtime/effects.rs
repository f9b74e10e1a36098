use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::audio::{AudioGraph, Band, DspParams, MediaCmd, MediaEvent, MediaPlayer, RodioGraph};
use crate::config::Settings;
use crate::metadata::{MetadataOutcome, MetadataWorker};
use crate::notify::Notifier;
use crate::playback::Effect;

/// The collaborators the controller's effects are executed against.
pub struct Services {
    media: MediaPlayer,
    graph: AudioGraph<RodioGraph>,
    metadata: MetadataWorker,
    pub notifier: Notifier,
}

/// The media command an effect turns into, if it is one.
pub fn media_command(effect: &Effect) -> Option<MediaCmd> {
    Some(match effect {
        Effect::Load { token, path } => MediaCmd::Load {
            token: *token,
            path: path.clone(),
        },
        Effect::Release(token) => MediaCmd::Release(*token),
        Effect::Unload => MediaCmd::Unload,
        Effect::StartPlayback => MediaCmd::Play,
        Effect::PausePlayback => MediaCmd::Pause,
        Effect::Seek(secs) => MediaCmd::Seek(*secs),
        Effect::SetLoop(on) => MediaCmd::SetLoop(*on),
        Effect::ResumeContext
        | Effect::ResetEqualizer
        | Effect::ExtractMetadata(_)
        | Effect::Notify(_) => return None,
    })
}

impl Services {
    /// Spawn the media thread and metadata worker and wire the audio graph once.
    pub fn start(settings: &Settings) -> Self {
        let params = Arc::new(DspParams::default());
        let media = MediaPlayer::spawn(Arc::clone(&params));
        let mut graph = AudioGraph::new(
            RodioGraph::new(params),
            settings.audio.volume,
            settings.audio.eq,
        );
        if let Err(e) = graph.build() {
            warn!("audio graph setup failed, output stays silent: {e}");
        }

        Self {
            media,
            graph,
            metadata: MetadataWorker::spawn(),
            notifier: Notifier::new(Duration::from_millis(settings.ui.notification_ms)),
        }
    }

    pub fn volume(&self) -> f32 {
        self.graph.volume()
    }

    pub fn eq(&self) -> crate::audio::EqSettings {
        self.graph.eq()
    }

    pub fn step_volume(&mut self, delta: f32) {
        let applied = self.graph.set_volume(self.graph.volume() + delta);
        debug!(volume = applied, "volume changed");
    }

    pub fn step_band(&mut self, band: Band, delta: f32) {
        let current = self.graph.eq().get(band);
        let applied = self.graph.set_band_clamped(band, current + delta);
        debug!(%band, gain = applied, "equalizer band changed");
    }

    pub fn media_events(&self) -> Vec<MediaEvent> {
        self.media.try_events()
    }

    pub fn metadata_outcomes(&self) -> Vec<MetadataOutcome> {
        self.metadata.try_outcomes()
    }

    pub fn notify(&mut self, message: impl Into<String>, now: Instant) {
        self.notifier.post(message, now);
    }

    /// Run effects in order.
    pub fn apply(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            if let Some(cmd) = media_command(&effect) {
                if self.media.send(cmd).is_err() {
                    warn!("media thread is gone; dropping {effect:?}");
                }
                continue;
            }
            match effect {
                Effect::ResumeContext => {
                    self.graph.ensure_running();
                }
                Effect::ResetEqualizer => self.graph.reset_eq(),
                Effect::ExtractMetadata(request) => self.metadata.request(request),
                Effect::Notify(message) => self.notifier.post(message, now),
                _ => {}
            }
        }
    }

    /// Stop both worker threads and wait for them.
    pub fn shutdown(&self) {
        self.media.quit();
        self.metadata.quit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ResourceToken;
    use std::path::PathBuf;

    #[test]
    fn media_effects_map_to_commands() {
        let token = ResourceToken(4);
        assert_eq!(
            media_command(&Effect::Load {
                token,
                path: PathBuf::from("/a.mp3")
            }),
            Some(MediaCmd::Load {
                token,
                path: PathBuf::from("/a.mp3")
            })
        );
        assert_eq!(
            media_command(&Effect::Release(token)),
            Some(MediaCmd::Release(token))
        );
        assert_eq!(media_command(&Effect::StartPlayback), Some(MediaCmd::Play));
        assert_eq!(media_command(&Effect::PausePlayback), Some(MediaCmd::Pause));
        assert_eq!(media_command(&Effect::Seek(2.5)), Some(MediaCmd::Seek(2.5)));
        assert_eq!(
            media_command(&Effect::SetLoop(true)),
            Some(MediaCmd::SetLoop(true))
        );
        assert_eq!(media_command(&Effect::Unload), Some(MediaCmd::Unload));
    }

    #[test]
    fn local_effects_are_not_media_commands() {
        assert_eq!(media_command(&Effect::ResumeContext), None);
        assert_eq!(media_command(&Effect::ResetEqualizer), None);
        assert_eq!(media_command(&Effect::Notify("hi".into())), None);
    }
}
