//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, InputMode};
use crate::audio::{Band, EqSettings};
use crate::config::{ControlsSettings, UiSettings};
use crate::lyrics::LyricLine;
use crate::playback::{Artwork, NowPlaying, Phase, PlaybackState};
use crate::playlist::PlaylistStore;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next");
    // H/L is filled dynamically from config.
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("1/2/3", "sort title/artist/added");
    map.insert("d/C", "remove/clear");
    map.insert("+/-", "volume");
    map.insert("b </>", "eq band/adjust");
    map.insert("0", "reset eq");
    map.insert("/", "search");
    map.insert(":", "add path");
    map.insert("q", "quit");
    map
});

/// Everything one frame needs, borrowed from the runtime.
pub struct View<'a> {
    pub app: &'a App,
    pub store: &'a PlaylistStore,
    pub state: &'a PlaybackState,
    pub now_playing: &'a NowPlaying,
    pub lyric: Option<&'a LyricLine>,
    /// The lyric line changed a moment ago.
    pub lyric_fresh: bool,
    pub volume: f32,
    pub eq: EqSettings,
    pub notice: Option<&'a str>,
    pub ui: &'a UiSettings,
    pub controls: &'a ControlsSettings,
}

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "s", "r", "1/2/3", "d/C", "+/-", "b </>", "0",
        "/", ":", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{scrub_seconds}s"))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `M:SS`. Negative and non-finite input renders as `0:00`.
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let total = secs.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn art_label(art: &Artwork) -> String {
    match art {
        Artwork::Placeholder => "[no art]".to_string(),
        Artwork::Embedded { mime, bytes } => {
            format!("[art: {mime}, {} KiB]", bytes.len().div_ceil(1024))
        }
    }
}

fn status_text(view: &View) -> String {
    let state = view.state;
    let mut parts: Vec<String> = Vec::new();

    let mut phase = match state.phase {
        Phase::Idle => "Stopped".to_string(),
        Phase::Loading => "Loading".to_string(),
        Phase::Playing => "Playing".to_string(),
        Phase::Paused | Phase::Ended | Phase::Error => "Paused".to_string(),
    };
    if state.buffering {
        phase.push_str(" (buffering)");
    }
    parts.push(format!(" {phase}"));

    if state.phase != Phase::Idle {
        parts.push(format!(
            "{} / {}",
            format_time(state.position),
            format_time(state.duration.unwrap_or(0.0))
        ));
    }

    parts.push(format!(
        "Shuffle: {}",
        if view.store.shuffling() { "ON" } else { "OFF" }
    ));
    parts.push(format!(
        "Repeat: {}",
        if view.store.repeating() { "ON" } else { "OFF" }
    ));

    let q = view.app.filter_query.trim();
    if view.app.mode == InputMode::Filter || !q.is_empty() {
        let mut filter_part = String::from("SEARCH:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    parts.join(" • ")
}

fn mixer_line(view: &View) -> Line<'static> {
    let mut spans = vec![Span::raw(format!(
        " vol {:>3}%  ",
        (view.volume * 100.0).round() as i32
    ))];
    for band in Band::ALL {
        let text = format!("{band} {:+.1} dB  ", view.eq.get(band));
        if band == view.app.eq_focus {
            spans.push(Span::styled(
                text,
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        } else {
            spans.push(Span::raw(text));
        }
    }
    Line::from(spans)
}

fn now_playing_lines(view: &View) -> Vec<Line<'static>> {
    let np = view.now_playing;
    let mut lines = vec![Line::from(vec![
        Span::styled(np.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(if np.artist.is_empty() {
            String::new()
        } else {
            format!(" - {}", np.artist)
        }),
        Span::raw(format!("  {}", art_label(&np.art))).dim(),
    ])];

    if view.ui.show_lyrics {
        let lyric = view.lyric.map(|l| l.text.clone()).unwrap_or_default();
        let style = if view.lyric_fresh {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::ITALIC)
        };
        lines.push(Line::from(Span::styled(lyric, style)));
    }

    lines.push(mixer_line(view));
    lines
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn track_label(view: &View, index: usize) -> String {
    let Some(track) = view.store.get(index) else {
        return String::new();
    };
    let mut label = if track.artist.trim().is_empty() {
        track.shown_title().to_string()
    } else {
        format!("{} - {}", track.artist, track.shown_title())
    };
    if track.has_lyrics() {
        label.push_str("  ♪");
    }
    label
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, view: &View) {
    let padding = Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(if view.ui.show_lyrics { 5 } else { 4 }),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(view.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" lyrebird ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(view))
        .block(Block::bordered().padding(padding).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    let now_playing = Paragraph::new(now_playing_lines(view))
        .block(Block::bordered().padding(padding).title(" now playing "))
        .wrap(Wrap { trim: false });
    frame.render_widget(now_playing, chunks[2]);

    // Main list. Only build ListItems for the visible window.
    {
        let display = view.app.display_indices(view.store);
        let current = view.store.current_index();
        let total = display.len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let sel_pos = display
            .iter()
            .position(|&i| i == view.app.selected)
            .unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = display[start..end]
            .iter()
            .map(|&i| {
                let label = track_label(view, i);
                if Some(i) == current {
                    ListItem::new(label).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                } else {
                    ListItem::new(label)
                }
            })
            .collect();

        let title = format!(" playlist ({}) ", view.store.len());
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    if view.app.mode == InputMode::Prompt {
        let popup_area = centered_rect_sized(72, 3, chunks[3]);
        frame.render_widget(Clear, popup_area);
        let prompt = Paragraph::new(format!("{}_", view.app.prompt)).block(
            Block::bordered()
                .padding(padding)
                .title(" add folder, audio file or .lrc (enter/esc) "),
        );
        frame.render_widget(prompt, popup_area);
    }

    let footer_text = match view.notice {
        Some(notice) => notice.to_string(),
        None => controls_text(view.controls.scrub_seconds),
    };
    let footer_title = if view.notice.is_some() {
        " notice "
    } else {
        " controls "
    };
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(footer_title)
                .padding(padding),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}
