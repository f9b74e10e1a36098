use std::path::PathBuf;

use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::audio::{MediaEvent, MediaEventKind, PlayRejection, ResourceToken};
use crate::error::{PlayerError, Result};
use crate::library::{Track, TrackId};
use crate::lyrics::{Cue, LyricLine, LyricTracker};
use crate::metadata::{MetadataOutcome, MetadataRequest, SelectionId};
use crate::playlist::{Advance, PlaylistStore, SortKey};

use super::resource::{BoundResource, ResourceMinter};
use super::state::{Artwork, NowPlaying, Phase, PlaybackState};

/// User-level requests.
#[derive(Debug)]
pub enum Command {
    /// Select the track at an index and play it; toggles play/pause when it
    /// is already the current track.
    Activate(usize),
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
    /// Absolute position in seconds.
    Seek(f64),
    /// Relative jump in seconds.
    SeekBy(f64),
    Remove(usize),
    Clear,
    /// Put every equalizer band back to 0 dB.
    ResetEqualizer,
    ToggleShuffle,
    ToggleRepeat,
    SortBy(SortKey),
    AddTracks(Vec<Track>),
    AddTrack(Track),
    AttachLyrics { file_stem: String, cues: Vec<Cue> },
}

/// Work for the collaborators, in the order it must happen.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Load { token: ResourceToken, path: PathBuf },
    Release(ResourceToken),
    Unload,
    StartPlayback,
    PausePlayback,
    Seek(f64),
    SetLoop(bool),
    ResumeContext,
    ResetEqualizer,
    ExtractMetadata(MetadataRequest),
    Notify(String),
}

#[derive(Debug)]
struct Bound {
    resource: BoundResource,
    selection: SelectionId,
    ready: bool,
}

/// The playback state machine.
///
/// Every input (command, media event, metadata outcome) is handled
/// synchronously against the current state and returns the effects to run.
/// Nothing here touches audio hardware, so the whole machine is testable
/// with fake collaborators.
pub struct Controller<R> {
    store: PlaylistStore,
    rng: R,
    state: PlaybackState,
    bound: Option<Bound>,
    minter: ResourceMinter,
    generation: u64,
    now_playing: NowPlaying,
    lyrics: LyricTracker,
}

impl<R: Rng> Controller<R> {
    pub fn new(rng: R) -> Self {
        Self {
            store: PlaylistStore::new(),
            rng,
            state: PlaybackState::default(),
            bound: None,
            minter: ResourceMinter::default(),
            generation: 0,
            now_playing: NowPlaying::placeholder(),
            lyrics: LyricTracker::new(),
        }
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn now_playing(&self) -> &NowPlaying {
        &self.now_playing
    }

    /// The active lyric line. Only shown while playing.
    pub fn lyric(&self) -> Option<&LyricLine> {
        if self.state.is_playing() && !self.lyrics.line().text.is_empty() {
            Some(self.lyrics.line())
        } else {
            None
        }
    }

    pub fn selection(&self) -> Option<SelectionId> {
        self.bound.as_ref().map(|b| b.selection)
    }

    pub fn bound_token(&self) -> Option<ResourceToken> {
        self.bound.as_ref().map(|b| b.resource.token())
    }

    pub fn handle(&mut self, cmd: Command) -> Vec<Effect> {
        let mut fx = Vec::new();
        match cmd {
            Command::Activate(index) => self.activate(index, &mut fx),
            Command::Play => self.play(&mut fx),
            Command::Pause => self.pause(&mut fx),
            Command::PlayPause => {
                if self.state.is_playing() {
                    self.pause(&mut fx);
                } else if self.state.phase == Phase::Loading && self.state.play_intent {
                    // Cancel a start that is still waiting for the source.
                    self.state.play_intent = false;
                    debug!("pending start cancelled");
                } else {
                    self.play(&mut fx);
                }
            }
            Command::Next => self.advance(&mut fx),
            Command::Previous => {
                if let Some(index) = self.store.previous_target(&mut self.rng) {
                    fx.push(Effect::ResumeContext);
                    self.select(index, true, &mut fx);
                }
            }
            Command::Seek(secs) => self.seek(secs, &mut fx),
            Command::SeekBy(delta) => self.seek(self.state.position + delta, &mut fx),
            Command::Remove(index) => {
                if let Some(removal) = self.store.remove(index) {
                    info!(track = %removal.track.id, was_current = removal.was_current, "removed track");
                    fx.push(Effect::Notify(format!(
                        "Removed \"{}\"",
                        removal.track.shown_title()
                    )));
                    self.resync(&mut fx);
                }
            }
            Command::Clear => {
                self.store.clear();
                self.go_idle(&mut fx);
                fx.push(Effect::Unload);
                fx.push(Effect::SetLoop(false));
                fx.push(Effect::ResetEqualizer);
                fx.push(Effect::Notify("Playlist cleared".into()));
            }
            Command::ResetEqualizer => {
                fx.push(Effect::ResetEqualizer);
                fx.push(Effect::Notify("Equalizer reset".into()));
            }
            Command::ToggleShuffle => {
                let on = self.store.toggle_shuffle(&mut self.rng);
                fx.push(Effect::SetLoop(self.store.repeating()));
                fx.push(Effect::Notify(format!("Shuffle {}", on_off(on))));
                self.resync(&mut fx);
            }
            Command::ToggleRepeat => {
                let on = self.store.toggle_repeat();
                fx.push(Effect::SetLoop(on));
                fx.push(Effect::Notify(format!("Repeat {}", on_off(on))));
            }
            Command::SortBy(key) => {
                self.store.sort_by(key);
                let name = match key {
                    SortKey::Title => "title",
                    SortKey::Artist => "artist",
                    SortKey::AddedAt => "date added",
                };
                fx.push(Effect::Notify(format!("Sorted by {name}")));
            }
            Command::AddTracks(tracks) => {
                let offered = tracks.len();
                let added = self.store.add_many(tracks, &mut self.rng);
                info!(offered, added, "added tracks");
                fx.push(Effect::Notify(match added {
                    0 => "No new tracks: all are already in the playlist".to_string(),
                    1 => "Added 1 track".to_string(),
                    n => format!("Added {n} tracks"),
                }));
                self.resync(&mut fx);
            }
            Command::AddTrack(track) => {
                let name = track.display_name.clone();
                match self.store.add_one(track, &mut self.rng) {
                    Ok(id) => {
                        info!(track = %id, "added track");
                        fx.push(Effect::Notify(format!("Added \"{name}\"")));
                        self.resync(&mut fx);
                    }
                    Err(e) => {
                        warn!("{e}");
                        fx.push(Effect::Notify(e.to_string()));
                    }
                }
            }
            Command::AttachLyrics { file_stem, cues } => match self.attach_lyrics(&file_stem, cues) {
                Ok(name) => fx.push(Effect::Notify(format!("Loaded lyrics for \"{name}\""))),
                Err(e) => {
                    warn!("{e}");
                    fx.push(Effect::Notify(e.to_string()));
                }
            },
        }
        fx
    }

    /// React to the media thread. Events from a resource that is no longer
    /// bound are dropped.
    pub fn on_media(&mut self, event: MediaEvent) -> Vec<Effect> {
        let mut fx = Vec::new();
        let Some(bound) = self.bound.as_mut() else {
            debug!(token = %event.token, kind = ?event.kind, "media event with nothing bound");
            return fx;
        };
        if bound.resource.token() != event.token {
            debug!(token = %event.token, kind = ?event.kind, "ignoring event from superseded source");
            return fx;
        }

        match event.kind {
            MediaEventKind::Ready { duration } => {
                bound.ready = true;
                self.state.duration = duration;
                self.state.buffering = false;
                if self.state.play_intent {
                    fx.push(Effect::StartPlayback);
                } else {
                    self.state.phase = Phase::Paused;
                }
            }
            MediaEventKind::Play | MediaEventKind::Playing => {
                self.state.phase = Phase::Playing;
                self.state.play_intent = true;
                self.state.buffering = false;
                self.refresh_lyric();
            }
            MediaEventKind::Waiting => self.state.buffering = true,
            MediaEventKind::Pause => {
                self.state.phase = Phase::Paused;
                self.state.play_intent = false;
                self.state.buffering = false;
                self.lyrics.clear();
            }
            MediaEventKind::TimeUpdate(secs) => {
                self.state.position = secs;
                if !self.state.is_playing() {
                    // A paused source never sends the resume signal.
                    self.state.buffering = false;
                }
                self.refresh_lyric();
            }
            MediaEventKind::Ended => self.ended(&mut fx),
            MediaEventKind::Error(kind) => {
                self.state.phase = Phase::Error;
                let err = PlayerError::Media(kind);
                error!(token = %event.token, "{err}");
                fx.push(Effect::Notify(format!("Could not play: {kind}")));
                self.settle_paused();
            }
            MediaEventKind::PlayRejected(PlayRejection::NotAllowed(reason)) => {
                warn!("{}", PlayerError::PlaybackDenied(reason));
                self.settle_paused();
            }
            MediaEventKind::PlayRejected(PlayRejection::Failed(reason)) => {
                self.state.phase = Phase::Error;
                error!(token = %event.token, "failed to start playback: {reason}");
                self.settle_paused();
            }
        }
        fx
    }

    /// Apply a finished tag read. Returns `false` when it belongs to a
    /// selection that is no longer current and was dropped.
    pub fn on_metadata(&mut self, outcome: MetadataOutcome) -> bool {
        if self.selection() != Some(outcome.selection) {
            debug!(selection = ?outcome.selection, "dropping stale metadata");
            return false;
        }
        let id = outcome.selection.track;
        let Some(track) = self.store.tracks().iter().find(|t| t.id == id) else {
            return false;
        };
        let display_name = track.display_name.clone();
        let shown_title = track.shown_title().to_string();
        let artist = track.artist.clone();

        match outcome.result {
            Ok(tags) => {
                let title = tags.title.unwrap_or(shown_title);
                let artist = tags.artist.unwrap_or(artist);
                if self.store.update_tags(id, &title, &artist) {
                    debug!(track = %id, %title, %artist, "updated tags");
                }
                self.now_playing = NowPlaying {
                    title,
                    artist,
                    art: tags
                        .picture
                        .map(|p| Artwork::Embedded {
                            mime: p.mime,
                            bytes: p.bytes,
                        })
                        .unwrap_or_default(),
                };
            }
            Err(e) => {
                warn!(track = %id, "{}", PlayerError::MetadataExtraction(e));
                self.now_playing = NowPlaying {
                    title: display_name,
                    artist: String::new(),
                    art: Artwork::Placeholder,
                };
            }
        }
        true
    }

    fn activate(&mut self, index: usize, fx: &mut Vec<Effect>) {
        let Some(track) = self.store.get(index) else {
            return;
        };
        let already_bound = self.store.current_index() == Some(index)
            && self.bound.as_ref().map(|b| b.resource.track()) == Some(track.id);

        if !already_bound {
            fx.push(Effect::ResumeContext);
            self.select(index, true, fx);
        } else if self.state.is_playing() {
            self.pause(fx);
        } else {
            self.play(fx);
        }
    }

    fn next_selection(&mut self, track: TrackId) -> SelectionId {
        self.generation += 1;
        SelectionId {
            track,
            generation: self.generation,
        }
    }

    /// Bind the track at `index`: release the previous resource, load the new
    /// one and ask for its tags under a fresh selection id.
    fn select(&mut self, index: usize, intent: bool, fx: &mut Vec<Effect>) {
        if !self.store.set_current(index) {
            return;
        }
        let Some(track) = self.store.current() else {
            return;
        };
        let id = track.id;
        let handle = track.handle.clone();
        let title = track.shown_title().to_string();
        let artist = track.artist.clone();

        if let Some(old) = self.bound.take() {
            fx.push(Effect::Release(old.resource.release()));
        }
        let resource = self.minter.bind(id, handle.clone());
        let selection = self.next_selection(id);
        debug!(track = %id, token = %resource.token(), generation = selection.generation, intent, "selecting track");

        fx.push(Effect::Load {
            token: resource.token(),
            path: handle.path().to_path_buf(),
        });
        fx.push(Effect::ExtractMetadata(MetadataRequest { selection, handle }));

        self.bound = Some(Bound {
            resource,
            selection,
            ready: false,
        });
        self.state = PlaybackState {
            phase: Phase::Loading,
            play_intent: intent,
            buffering: false,
            position: 0.0,
            duration: None,
        };
        self.now_playing = NowPlaying {
            title,
            artist,
            art: Artwork::Placeholder,
        };
        self.lyrics.clear();
    }

    /// Follow the store's current index after it changed underneath us.
    fn resync(&mut self, fx: &mut Vec<Effect>) {
        let Some(index) = self.store.current_index() else {
            self.go_idle(fx);
            return;
        };
        let current = self.store.current().map(|t| t.id);
        let bound = self.bound.as_ref().map(|b| b.resource.track());
        if current != bound {
            let intent = self.state.play_intent;
            if intent {
                fx.push(Effect::ResumeContext);
            }
            self.select(index, intent, fx);
        }
    }

    fn go_idle(&mut self, fx: &mut Vec<Effect>) {
        if let Some(old) = self.bound.take() {
            fx.push(Effect::Release(old.resource.release()));
        }
        self.state = PlaybackState::default();
        self.now_playing = NowPlaying::placeholder();
        self.lyrics.clear();
    }

    fn play(&mut self, fx: &mut Vec<Effect>) {
        let Some(index) = self.store.current_index() else {
            debug!("play with no current track");
            return;
        };
        if self.state.is_playing() {
            return;
        }
        let Some(bound) = self.bound.as_mut() else {
            fx.push(Effect::ResumeContext);
            self.select(index, true, fx);
            return;
        };

        if !bound.ready {
            fx.push(Effect::ResumeContext);
            if self.state.phase == Phase::Loading {
                self.state.play_intent = true;
            } else {
                // The last load failed; try it again.
                self.select(index, true, fx);
            }
            return;
        }

        // Re-enter the selection so the tags are read again for this play.
        self.generation += 1;
        let selection = SelectionId {
            track: bound.resource.track(),
            generation: self.generation,
        };
        bound.selection = selection;
        let handle = bound.resource.handle().clone();

        self.state.play_intent = true;
        fx.push(Effect::ResumeContext);
        fx.push(Effect::ExtractMetadata(MetadataRequest { selection, handle }));
        fx.push(Effect::StartPlayback);
    }

    fn pause(&mut self, fx: &mut Vec<Effect>) {
        if self.state.is_playing() {
            self.state.play_intent = false;
            fx.push(Effect::PausePlayback);
        }
    }

    fn advance(&mut self, fx: &mut Vec<Effect>) {
        match self.store.next_target(&mut self.rng) {
            Some(Advance::To(index)) => {
                fx.push(Effect::ResumeContext);
                self.select(index, true, fx);
            }
            Some(Advance::Stop) => {
                debug!("end of playlist");
                if self.state.is_playing() {
                    fx.push(Effect::PausePlayback);
                }
                self.settle_paused();
            }
            None => {}
        }
    }

    fn ended(&mut self, fx: &mut Vec<Effect>) {
        self.state.phase = Phase::Ended;
        self.lyrics.clear();
        if self.store.repeating() {
            debug!("looping current track");
            self.state.position = 0.0;
            fx.push(Effect::ResumeContext);
            fx.push(Effect::Seek(0.0));
            fx.push(Effect::StartPlayback);
        } else {
            self.advance(fx);
        }
    }

    /// Clear play-intent and come to rest in `Paused` (or stay `Idle`).
    fn settle_paused(&mut self) {
        self.state.play_intent = false;
        self.state.buffering = false;
        if self.state.phase != Phase::Idle {
            self.state.phase = Phase::Paused;
        }
        self.lyrics.clear();
    }

    fn seek(&mut self, secs: f64, fx: &mut Vec<Effect>) {
        if !self.bound.as_ref().is_some_and(|b| b.ready) {
            return;
        }
        let upper = self.state.duration.unwrap_or(f64::INFINITY);
        let target = if secs.is_finite() {
            secs.max(0.0).min(upper)
        } else {
            0.0
        };
        self.state.position = target;
        fx.push(Effect::Seek(target));
        self.refresh_lyric();
    }

    fn refresh_lyric(&mut self) {
        if !self.state.is_playing() {
            self.lyrics.clear();
            return;
        }
        match self.store.current().and_then(|t| t.lyrics.as_deref()) {
            Some(cues) => {
                self.lyrics.update(cues, self.state.position);
            }
            None => {
                self.lyrics.clear();
            }
        }
    }

    fn attach_lyrics(&mut self, file_stem: &str, cues: Vec<Cue>) -> Result<String> {
        let track = self.store.current().ok_or(PlayerError::NoCurrentTrack)?;
        if track.display_name.to_lowercase() != file_stem.to_lowercase() {
            return Err(PlayerError::LyricMismatch {
                lyrics: file_stem.to_string(),
                track: track.display_name.clone(),
            });
        }
        if track.has_lyrics() {
            return Err(PlayerError::LyricsAlreadyLoaded(track.display_name.clone()));
        }
        if cues.is_empty() {
            return Err(PlayerError::LyricParseEmpty(file_stem.to_string()));
        }

        let id = track.id;
        let name = track.display_name.clone();
        self.store.set_lyrics(id, cues);
        self.lyrics.clear();
        self.refresh_lyric();
        Ok(name)
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
