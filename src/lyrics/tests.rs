use super::*;

fn cue(time: f64, text: &str) -> Cue {
    Cue {
        time,
        text: text.to_string(),
    }
}

#[test]
fn parse_sorts_and_drops_invalid_lines() {
    let cues = parse("[01:02.50]Hello\n[00:01.000]World\nNotALine");
    assert_eq!(cues, vec![cue(1.0, "World"), cue(62.5, "Hello")]);
}

#[test]
fn parse_pads_two_digit_fractions_to_milliseconds() {
    let cues = parse("[00:03.05]a\n[00:03.050]b\n[00:03.5]c");
    // ".5" has a single fraction digit and is rejected.
    assert_eq!(cues.len(), 2);
    assert!((cues[0].time - 3.05).abs() < 1e-9);
    assert!((cues[1].time - 3.05).abs() < 1e-9);
}

#[test]
fn parse_rejects_malformed_timestamps() {
    let input = "[1:02.50]x\n[01:2.50]x\n[01:02:50]x\n[01:02.5000]x\n[aa:bb.cc]x\n[01:02.50";
    assert!(parse(input).is_empty());
}

#[test]
fn parse_drops_blank_text_and_trims() {
    let cues = parse("[00:01.00]   \n[00:02.00]  spaced out  \r\n[00:03.00]");
    assert_eq!(cues, vec![cue(2.0, "spaced out")]);
}

#[test]
fn parse_takes_first_timestamp_anywhere_on_the_line() {
    let cues = parse("intro [00:04.20]late start\n[ti:Title]\n[00:01.00][00:09.00]twice");
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0], cue(1.0, "[00:09.00]twice"));
    assert_eq!(cues[1], cue(4.2, "late start"));
}

#[test]
fn parse_empty_input_is_empty() {
    assert!(parse("").is_empty());
    assert!(parse("\n\n").is_empty());
}

#[test]
fn active_cue_resolves_latest_started_line() {
    let cues = vec![cue(0.0, "a"), cue(2.0, "b"), cue(5.0, "c")];
    assert_eq!(active_cue(&cues, 1.9).map(|c| c.text.as_str()), Some("a"));
    assert_eq!(active_cue(&cues, 2.0).map(|c| c.text.as_str()), Some("b"));
    assert_eq!(active_cue(&cues, 10.0).map(|c| c.text.as_str()), Some("c"));
    assert_eq!(active_cue(&cues, -1.0), None);
}

#[test]
fn active_cue_before_first_or_empty_is_none() {
    let cues = vec![cue(3.0, "late")];
    assert_eq!(active_cue(&cues, 2.999), None);
    assert_eq!(active_cue(&[], 1.0), None);
    assert_eq!(active_cue(&cues, f64::NAN), None);
}

#[test]
fn tracker_reports_changes_only() {
    let cues = vec![cue(1.0, "one"), cue(2.0, "two")];
    let mut t = LyricTracker::new();

    assert!(!t.update(&cues, 0.5));
    assert!(t.update(&cues, 1.0));
    assert_eq!(t.line().text, "one");
    let first_key = t.line().key;

    assert!(!t.update(&cues, 1.5));
    assert!(t.update(&cues, 2.5));
    assert_eq!(t.line().text, "two");
    assert_ne!(t.line().key, first_key);
}

#[test]
fn tracker_rekeys_repeated_text() {
    let cues = vec![cue(1.0, "la"), cue(2.0, "la")];
    let mut t = LyricTracker::new();
    t.update(&cues, 1.0);
    let k1 = t.line().key;
    assert!(t.update(&cues, 2.0));
    assert_eq!(t.line().text, "la");
    assert_ne!(t.line().key, k1);
}

#[test]
fn tracker_clear_is_idempotent() {
    let cues = vec![cue(0.0, "x")];
    let mut t = LyricTracker::new();
    t.update(&cues, 0.1);
    assert!(t.clear());
    assert!(t.line().text.is_empty());
    assert!(!t.clear());
    // After a clear the same cue shows again.
    assert!(t.update(&cues, 0.2));
}
