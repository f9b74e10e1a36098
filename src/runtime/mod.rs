use std::env;
use std::path::PathBuf;
use std::time::Instant;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::playback::Controller;

mod effects;
mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();
    let log_path = logging::init(&settings.logging);
    if let Some(problem) = settings_problem {
        warn!("{problem}; using defaults");
    }
    info!(log = ?log_path, "starting lyrebird {}", env!("CARGO_PKG_VERSION"));

    let mut services = effects::Services::start(&settings);
    let mut controller = Controller::new(StdRng::from_entropy());
    let mut app = App::new();

    let now = Instant::now();
    let defaults = startup::apply_playback_defaults(&mut controller, &settings);
    services.apply(defaults, now);

    // Command-line arguments behave like prompt entries.
    for arg in env::args_os().skip(1) {
        let path = PathBuf::from(arg);
        event_loop::open_path(&path, &settings, &mut controller, &mut services, now);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut controller,
            &mut services,
            &mut state,
        )
    })();

    services.shutdown();
    info!("shutting down");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
