use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{PlayerError, Result};
use crate::lyrics::{self, Cue};

use super::model::{AudioHandle, Track};

fn has_extension(path: &Path, wanted: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            wanted
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| !e.is_empty() && e == ext)
        })
        .unwrap_or(false)
}

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    has_extension(path, &settings.extensions)
}

pub fn is_lyric_file(path: &Path, settings: &LibrarySettings) -> bool {
    has_extension(path, std::slice::from_ref(&settings.lyric_extension))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Case-insensitive file stem used to pair audio and lyric files.
pub fn stem_key(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

fn modified_at(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Read and parse a lyric file. An empty cue list is returned as-is;
/// callers decide whether that is an error.
pub fn read_lyrics(path: &Path) -> Result<Vec<Cue>> {
    let text = fs::read_to_string(path)?;
    Ok(lyrics::parse(&text))
}

fn paired_lyrics(audio: &Path, lrc: Option<&PathBuf>) -> Option<Vec<Cue>> {
    let lrc = lrc?;
    match read_lyrics(lrc) {
        Ok(cues) if !cues.is_empty() => {
            debug!(audio = %audio.display(), "paired lyrics ({} lines)", cues.len());
            Some(cues)
        }
        Ok(_) => {
            debug!(lrc = %lrc.display(), "lyric file is empty or unparsable");
            None
        }
        Err(e) => {
            warn!(lrc = %lrc.display(), "failed to read lyric file: {e}");
            None
        }
    }
}

fn make_track(path: &Path, lrc: Option<&PathBuf>) -> Track {
    let track = Track::new(AudioHandle::new(path), modified_at(path));
    match paired_lyrics(path, lrc) {
        Some(cues) => track.with_lyrics(cues),
        None => track,
    }
}

/// Collect every audio file under `dir`, pairing `.lrc` files that sit in the
/// same directory with the same (case-insensitive) stem.
pub fn scan_folder(dir: &Path, settings: &LibrarySettings) -> Result<Vec<Track>> {
    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut audio: Vec<PathBuf> = Vec::new();
    let mut lrc: HashMap<(PathBuf, String), PathBuf> = HashMap::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                None
            }
        })
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if is_audio_file(path, settings) {
            audio.push(path.to_path_buf());
        } else if is_lyric_file(path, settings) {
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            lrc.insert((parent, stem_key(path)), path.to_path_buf());
        }
    }

    if audio.is_empty() {
        return Err(PlayerError::NoAudioFound(dir.to_path_buf()));
    }

    let tracks = audio
        .iter()
        .map(|path| {
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            make_track(path, lrc.get(&(parent, stem_key(path))))
        })
        .collect();
    Ok(tracks)
}

/// Build a single track from `path`, picking up a sibling lyric file if any.
pub fn load_file(path: &Path, settings: &LibrarySettings) -> Result<Track> {
    if !path.is_file() || !is_audio_file(path, settings) {
        return Err(PlayerError::NotAudio(path.to_path_buf()));
    }

    let key = stem_key(path);
    let sibling = path
        .parent()
        .and_then(|dir| fs::read_dir(dir).ok())
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok().map(|e| e.path()))
        .find(|p| p.is_file() && is_lyric_file(p, settings) && stem_key(p) == key);

    Ok(make_track(path, sibling.as_ref()))
}
