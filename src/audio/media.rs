//! The media thread: owns the output stream and the current `Sink`, takes
//! [`MediaCmd`]s and reports token-tagged [`MediaEvent`]s.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info, warn};

use super::backend::DspParams;
use super::source::EqSource;
use super::types::{
    MediaCmd, MediaErrorKind, MediaEvent, MediaEventKind, PlayRejection, ResourceToken,
};

const TICK: Duration = Duration::from_millis(200);

/// Open `path` and return a paused sink positioned at `start_at`.
fn open_sink(
    stream: &OutputStream,
    path: &Path,
    params: &Arc<DspParams>,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), MediaErrorKind> {
    let file = File::open(path).map_err(|e| {
        warn!("failed to open {}: {e}", path.display());
        MediaErrorKind::Open
    })?;
    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| {
        warn!("failed to decode {}: {e}", path.display());
        MediaErrorKind::Decode
    })?;
    let duration = decoder.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    // `skip_duration` is the fallback seek; a zero skip is free.
    sink.append(EqSource::new(
        decoder.skip_duration(start_at),
        Arc::clone(params),
    ));
    Ok((sink, duration))
}

fn to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::ZERO)
}

struct Loaded {
    token: ResourceToken,
    path: PathBuf,
    sink: Sink,
    duration: Option<Duration>,
}

struct MediaThread {
    stream: Option<OutputStream>,
    params: Arc<DspParams>,
    events: Sender<MediaEvent>,
    loaded: Option<Loaded>,
    playing: bool,
    looping: bool,
}

impl MediaThread {
    fn emit(&self, token: ResourceToken, kind: MediaEventKind) {
        // The receiver only goes away during shutdown.
        let _ = self.events.send(MediaEvent { token, kind });
    }

    /// The output stream is opened lazily so a missing device can be retried
    /// on the next load.
    fn stream(&mut self) -> Result<&OutputStream, MediaErrorKind> {
        if self.stream.is_none() {
            match OutputStreamBuilder::open_default_stream() {
                Ok(mut stream) => {
                    // rodio logs to stderr on drop, which would garble the TUI.
                    stream.log_on_drop(false);
                    info!("opened default audio output");
                    self.stream = Some(stream);
                }
                Err(e) => {
                    warn!("no audio output device: {e}");
                    return Err(MediaErrorKind::Output);
                }
            }
        }
        self.stream.as_ref().ok_or(MediaErrorKind::Output)
    }

    fn reopen(&mut self, start_at: Duration) -> Result<(), MediaErrorKind> {
        let Some(path) = self.loaded.as_ref().map(|l| l.path.clone()) else {
            return Ok(());
        };
        let params = Arc::clone(&self.params);
        let (sink, _) = open_sink(self.stream()?, &path, &params, start_at)?;
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.sink.stop();
            loaded.sink = sink;
        }
        Ok(())
    }

    fn drop_loaded(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            loaded.sink.stop();
            debug!(token = %loaded.token, "released source");
        }
        self.playing = false;
    }

    fn handle(&mut self, cmd: MediaCmd) {
        match cmd {
            MediaCmd::Load { token, path } => self.load(token, path),
            MediaCmd::Play => self.play(),
            MediaCmd::Pause => {
                if let Some(loaded) = &self.loaded {
                    loaded.sink.pause();
                    self.playing = false;
                    self.emit(loaded.token, MediaEventKind::Pause);
                }
            }
            MediaCmd::Seek(secs) => self.seek(to_duration(secs)),
            MediaCmd::SetLoop(looping) => self.looping = looping,
            MediaCmd::Release(token) => {
                if self.loaded.as_ref().is_some_and(|l| l.token == token) {
                    self.drop_loaded();
                }
            }
            MediaCmd::Unload => self.drop_loaded(),
            // Handled by the loop.
            MediaCmd::Quit => {}
        }
    }

    fn load(&mut self, token: ResourceToken, path: PathBuf) {
        self.drop_loaded();
        let params = Arc::clone(&self.params);
        let opened = self
            .stream()
            .and_then(|stream| open_sink(stream, &path, &params, Duration::ZERO));

        match opened {
            Ok((sink, duration)) => {
                debug!(%token, path = %path.display(), ?duration, "loaded source");
                self.loaded = Some(Loaded {
                    token,
                    path,
                    sink,
                    duration,
                });
                self.emit(
                    token,
                    MediaEventKind::Ready {
                        duration: duration.map(|d| d.as_secs_f64()),
                    },
                );
            }
            Err(kind) => self.emit(token, MediaEventKind::Error(kind)),
        }
    }

    fn play(&mut self) {
        let Some(token) = self.loaded.as_ref().map(|l| l.token) else {
            debug!("play without a loaded source");
            return;
        };
        if self.loaded.as_ref().is_some_and(|l| l.sink.empty()) {
            // Played past the end: start over.
            if let Err(kind) = self.reopen(Duration::ZERO) {
                let reason = match kind {
                    MediaErrorKind::Output => PlayRejection::NotAllowed(kind.to_string()),
                    _ => PlayRejection::Failed(kind.to_string()),
                };
                self.emit(token, MediaEventKind::PlayRejected(reason));
                return;
            }
        }
        if let Some(loaded) = &self.loaded {
            loaded.sink.play();
        }
        self.playing = true;
        self.emit(token, MediaEventKind::Play);
        self.emit(token, MediaEventKind::Playing);
    }

    fn seek(&mut self, pos: Duration) {
        let Some(token) = self.loaded.as_ref().map(|l| l.token) else {
            return;
        };
        if self.playing {
            self.emit(token, MediaEventKind::Waiting);
        }

        let sought = match self.loaded.as_ref() {
            Some(l) if !l.sink.empty() => l.sink.try_seek(pos).map_err(|e| {
                debug!("seek unsupported by source, reopening: {e}");
            }),
            _ => Err(()),
        };
        if sought.is_err() {
            if let Err(kind) = self.reopen(pos) {
                warn!(%token, "seek failed: {kind}");
                self.emit(token, MediaEventKind::Error(MediaErrorKind::Seek));
                return;
            }
        }

        if let Some(loaded) = &self.loaded {
            if self.playing {
                loaded.sink.play();
            }
        }
        self.emit(token, MediaEventKind::TimeUpdate(pos.as_secs_f64()));
        if self.playing {
            self.emit(token, MediaEventKind::Playing);
        }
    }

    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(loaded) = &self.loaded else {
            return;
        };
        let token = loaded.token;

        if !loaded.sink.empty() {
            let pos = loaded.sink.get_pos().as_secs_f64();
            self.emit(token, MediaEventKind::TimeUpdate(pos));
            return;
        }

        let end = loaded.duration.map(|d| d.as_secs_f64());
        if self.looping {
            match self.reopen(Duration::ZERO) {
                Ok(()) => {
                    if let Some(loaded) = &self.loaded {
                        loaded.sink.play();
                    }
                    self.emit(token, MediaEventKind::TimeUpdate(0.0));
                }
                Err(kind) => {
                    self.playing = false;
                    self.emit(token, MediaEventKind::Error(kind));
                }
            }
            return;
        }

        self.playing = false;
        if let Some(end) = end {
            self.emit(token, MediaEventKind::TimeUpdate(end));
        }
        self.emit(token, MediaEventKind::Ended);
    }

    fn run(mut self, rx: Receiver<MediaCmd>) {
        loop {
            match rx.recv_timeout(TICK) {
                Ok(MediaCmd::Quit) => {
                    self.drop_loaded();
                    break;
                }
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("media thread stopped");
    }
}

/// Handle to the media thread.
pub struct MediaPlayer {
    tx: Sender<MediaCmd>,
    events: Receiver<MediaEvent>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl MediaPlayer {
    pub fn spawn(params: Arc<DspParams>) -> Self {
        let (tx, rx) = mpsc::channel::<MediaCmd>();
        let (event_tx, events) = mpsc::channel::<MediaEvent>();

        let worker = MediaThread {
            stream: None,
            params,
            events: event_tx,
            loaded: None,
            playing: false,
            looping: false,
        };
        let join = thread::Builder::new()
            .name("lyrebird-media".into())
            .spawn(move || worker.run(rx))
            .map_err(|e| warn!("failed to spawn media thread: {e}"))
            .ok();

        Self {
            tx,
            events,
            join: Mutex::new(join),
        }
    }

    pub fn send(&self, cmd: MediaCmd) -> Result<(), mpsc::SendError<MediaCmd>> {
        self.tx.send(cmd)
    }

    /// Drain the events emitted since the last call.
    pub fn try_events(&self) -> Vec<MediaEvent> {
        self.events.try_iter().collect()
    }

    pub fn quit(&self) {
        let _ = self.send(MediaCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
