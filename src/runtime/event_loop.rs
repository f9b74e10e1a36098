use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::Rng;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::{App, InputMode};
use crate::audio::EQ_STEP_DB;
use crate::config;
use crate::lyrics::LyricLine;
use crate::playback::{Command, Controller};
use crate::playlist::SortKey;
use crate::runtime::effects::Services;
use crate::runtime::startup::command_for_path;
use crate::ui::{self, View};

/// How long a freshly changed lyric line stays highlighted.
const LYRIC_FLASH: Duration = Duration::from_millis(600);

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Key of the lyric line last drawn, and when it first appeared.
    lyric_seen: Option<(u64, Instant)>,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `line` changed within the last `LYRIC_FLASH`.
    fn lyric_fresh(&mut self, line: Option<&LyricLine>, now: Instant) -> bool {
        let Some(line) = line else {
            self.lyric_seen = None;
            return false;
        };
        match self.lyric_seen {
            Some((key, since)) if key == line.key => now.saturating_duration_since(since) < LYRIC_FLASH,
            _ => {
                self.lyric_seen = Some((line.key, now));
                true
            }
        }
    }
}

/// Hand a command to the controller and run what it asks for.
pub fn dispatch<R: Rng>(
    controller: &mut Controller<R>,
    services: &mut Services,
    cmd: Command,
    now: Instant,
) {
    let effects = controller.handle(cmd);
    services.apply(effects, now);
}

/// Resolve a typed path and feed the result to the controller. Failures
/// become a notice.
pub fn open_path<R: Rng>(
    path: &Path,
    settings: &config::Settings,
    controller: &mut Controller<R>,
    services: &mut Services,
    now: Instant,
) {
    match command_for_path(path, &settings.library) {
        Ok(cmd) => dispatch(controller, services, cmd, now),
        Err(e) => {
            warn!(path = %path.display(), "cannot open path: {e}");
            services.notify(e.to_string(), now);
        }
    }
}

/// Main terminal event loop: applies collaborator events, draws the UI and
/// handles input. Returns `Ok(())` when shutdown is requested.
pub fn run<R: Rng>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller<R>,
    services: &mut Services,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();

        for event in services.media_events() {
            let effects = controller.on_media(event);
            services.apply(effects, now);
        }
        for outcome in services.metadata_outcomes() {
            if !controller.on_metadata(outcome) {
                debug!("dropped stale metadata outcome");
            }
        }
        services.notifier.expire(now);

        app.follow_current(controller.store());
        app.ensure_selected_visible(controller.store());

        let lyric = controller.lyric();
        let lyric_fresh = state.lyric_fresh(lyric, now);
        let view = View {
            app,
            store: controller.store(),
            state: controller.state(),
            now_playing: controller.now_playing(),
            lyric,
            lyric_fresh,
            volume: services.volume(),
            eq: services.eq(),
            notice: services.notifier.current(now),
            ui: &settings.ui,
            controls: &settings.controls,
        };
        terminal.draw(|f| ui::draw(f, &view))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, services) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns `true` when the user asked to quit.
fn handle_key_event<R: Rng>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller<R>,
    services: &mut Services,
) -> bool {
    let now = Instant::now();

    match app.mode {
        InputMode::Filter => {
            handle_filter_key(key, app, controller, services, now);
            false
        }
        InputMode::Prompt => {
            handle_prompt_key(key, settings, app, controller, services, now);
            false
        }
        InputMode::Normal => handle_normal_key(key, settings, app, controller, services, now),
    }
}

fn handle_filter_key<R: Rng>(
    key: KeyEvent,
    app: &mut App,
    controller: &mut Controller<R>,
    services: &mut Services,
    now: Instant,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.clear_filter(controller.store()),
        KeyCode::Backspace => app.pop_filter_char(controller.store()),
        KeyCode::Char('j') | KeyCode::Char('n') if ctrl => app.next(controller.store()),
        KeyCode::Char('k') | KeyCode::Char('p') if ctrl => app.prev(controller.store()),
        KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c, controller.store()),
        KeyCode::Enter => {
            app.exit_filter_mode();
            if let Some(idx) = app.selected_visible(controller.store()) {
                dispatch(controller, services, Command::Activate(idx), now);
            }
        }
        _ => {}
    }
}

fn handle_prompt_key<R: Rng>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller<R>,
    services: &mut Services,
    now: Instant,
) {
    match key.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Backspace => app.pop_prompt_char(),
        KeyCode::Char(c) if !c.is_control() => app.push_prompt_char(c),
        KeyCode::Enter => {
            if let Some(entry) = app.take_prompt() {
                open_path(Path::new(&entry), settings, controller, services, now);
            }
        }
        _ => {}
    }
}

fn handle_normal_key<R: Rng>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller<R>,
    services: &mut Services,
    now: Instant,
) -> bool {
    let scrub = settings.controls.scrub_seconds as f64;
    let step = settings.controls.volume_step;

    let cmd = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => {
            app.enter_filter_mode();
            None
        }
        KeyCode::Char(':') => {
            app.open_prompt();
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback = false;
            app.next(controller.store());
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback = false;
            app.prev(controller.store());
            None
        }
        KeyCode::Enter => {
            app.follow_playback = true;
            app.selected_visible(controller.store()).map(Command::Activate)
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => Some(Command::PlayPause),
        KeyCode::Char('l') => Some(Command::Next),
        KeyCode::Char('h') => Some(Command::Previous),
        KeyCode::Char('L') => Some(Command::SeekBy(scrub)),
        KeyCode::Char('H') => Some(Command::SeekBy(-scrub)),
        KeyCode::Char('s') => Some(Command::ToggleShuffle),
        KeyCode::Char('r') => Some(Command::ToggleRepeat),
        KeyCode::Char('1') => Some(Command::SortBy(SortKey::Title)),
        KeyCode::Char('2') => Some(Command::SortBy(SortKey::Artist)),
        KeyCode::Char('3') => Some(Command::SortBy(SortKey::AddedAt)),
        KeyCode::Char('d') => app.selected_visible(controller.store()).map(Command::Remove),
        KeyCode::Char('C') => Some(Command::Clear),
        KeyCode::Char('0') => Some(Command::ResetEqualizer),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            services.step_volume(step);
            None
        }
        KeyCode::Char('-') => {
            services.step_volume(-step);
            None
        }
        KeyCode::Char('b') => {
            app.cycle_eq_focus();
            None
        }
        KeyCode::Char('>') | KeyCode::Char('.') => {
            services.step_band(app.eq_focus, EQ_STEP_DB);
            None
        }
        KeyCode::Char('<') | KeyCode::Char(',') => {
            services.step_band(app.eq_focus, -EQ_STEP_DB);
            None
        }
        _ => None,
    };

    if let Some(cmd) = cmd {
        dispatch(controller, services, cmd, now);
    }
    false
}
