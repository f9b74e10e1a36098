use std::path::Path;

use rand::Rng;

use crate::config::{LibrarySettings, Settings};
use crate::error::Result;
use crate::library::{is_lyric_file, load_file, read_lyrics, scan_folder};
use crate::playback::{Command, Controller, Effect};

/// Turn a path typed at the prompt (or given on the command line) into a
/// controller command: a folder adds many, a lyric file attaches to the
/// current track, anything else is tried as a single audio file.
pub fn command_for_path(path: &Path, settings: &LibrarySettings) -> Result<Command> {
    if path.is_dir() {
        return Ok(Command::AddTracks(scan_folder(path, settings)?));
    }
    if is_lyric_file(path, settings) {
        let file_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let cues = read_lyrics(path)?;
        return Ok(Command::AttachLyrics { file_stem, cues });
    }
    Ok(Command::AddTrack(load_file(path, settings)?))
}

/// Initial shuffle/repeat modes from config. `validate` guarantees they are
/// not both on.
pub fn apply_playback_defaults<R: Rng>(
    controller: &mut Controller<R>,
    settings: &Settings,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    if settings.playback.shuffle && !controller.store().shuffling() {
        effects.extend(controller.handle(Command::ToggleShuffle));
    }
    if settings.playback.repeat && !controller.store().repeating() {
        effects.extend(controller.handle(Command::ToggleRepeat));
    }
    // The mode notices are noise at startup.
    effects.retain(|e| !matches!(e, Effect::Notify(_)));
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const LRC: &str = "[00:01.00]first\n[00:02.00]second\n";

    #[test]
    fn folder_becomes_add_tracks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("b.flac"), b"x").unwrap();

        let cmd = command_for_path(dir.path(), &LibrarySettings::default()).unwrap();
        match cmd {
            Command::AddTracks(tracks) => assert_eq!(tracks.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn audio_file_becomes_add_track() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("Song.mp3");
        std::fs::write(&song, b"x").unwrap();

        let cmd = command_for_path(&song, &LibrarySettings::default()).unwrap();
        match cmd {
            Command::AddTrack(track) => assert_eq!(track.display_name, "Song"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn lyric_file_becomes_attach() {
        let dir = tempfile::tempdir().unwrap();
        let lrc = dir.path().join("Song.LRC");
        std::fs::write(&lrc, LRC).unwrap();

        let cmd = command_for_path(&lrc, &LibrarySettings::default()).unwrap();
        match cmd {
            Command::AttachLyrics { file_stem, cues } => {
                assert_eq!(file_stem, "Song");
                assert_eq!(cues.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, b"x").unwrap();

        assert!(command_for_path(&txt, &LibrarySettings::default()).is_err());
        assert!(command_for_path(&dir.path().join("missing.mp3"), &LibrarySettings::default()).is_err());
    }

    #[test]
    fn empty_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(command_for_path(dir.path(), &LibrarySettings::default()).is_err());
    }

    #[test]
    fn playback_defaults_enable_modes_quietly() {
        let mut controller = Controller::new(StdRng::seed_from_u64(9));
        let mut settings = Settings::default();
        settings.playback.repeat = true;

        let effects = apply_playback_defaults(&mut controller, &settings);
        assert!(controller.store().repeating());
        assert!(!controller.store().shuffling());
        assert!(effects.iter().all(|e| !matches!(e, Effect::Notify(_))));
        assert!(effects.contains(&Effect::SetLoop(true)));
    }
}
