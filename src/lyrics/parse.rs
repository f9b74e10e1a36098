/// A single timestamped lyric line.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds.
    pub time: f64,
    pub text: String,
}

/// Parse `[MM:SS.ff]text` / `[MM:SS.fff]text` lines into cues sorted by time.
///
/// The first well-formed timestamp on a line wins and everything after it is
/// the cue text. Lines without a timestamp, or whose text is empty once
/// trimmed, are dropped. Never fails: bad input just yields fewer cues.
pub fn parse(input: &str) -> Vec<Cue> {
    let mut cues: Vec<Cue> = input
        .split('\n')
        .filter_map(|line| {
            let (time, rest) = find_timestamp(line)?;
            let text = rest.trim();
            if text.is_empty() {
                return None;
            }
            Some(Cue {
                time,
                text: text.to_string(),
            })
        })
        .collect();

    // Stable: equal timestamps keep file order.
    cues.sort_by(|a, b| a.time.total_cmp(&b.time));
    cues
}

/// Return the cue whose time is the greatest one `<= position`.
///
/// `None` when the list is empty or `position` precedes the first cue
/// (negative and NaN positions included).
pub fn active_cue(cues: &[Cue], position: f64) -> Option<&Cue> {
    let upto = cues.partition_point(|c| c.time <= position);
    upto.checked_sub(1).map(|i| &cues[i])
}

fn find_timestamp(line: &str) -> Option<(f64, &str)> {
    let bytes = line.as_bytes();
    let mut from = 0;
    while let Some(off) = line[from..].find('[') {
        let start = from + off;
        if let Some((time, consumed)) = timestamp_at(&bytes[start..]) {
            return Some((time, &line[start + consumed..]));
        }
        from = start + 1;
    }
    None
}

/// Match `[dd:dd.dd]` or `[dd:dd.ddd]` at the start of `b`, returning the
/// time in seconds and the number of bytes consumed.
fn timestamp_at(b: &[u8]) -> Option<(f64, usize)> {
    let digit = |i: usize| b.get(i).filter(|c| c.is_ascii_digit()).map(|c| u32::from(c - b'0'));

    if b.first() != Some(&b'[') {
        return None;
    }
    let minutes = digit(1)? * 10 + digit(2)?;
    if b.get(3) != Some(&b':') {
        return None;
    }
    let seconds = digit(4)? * 10 + digit(5)?;
    if b.get(6) != Some(&b'.') {
        return None;
    }

    let mut frac_digits = 0;
    let mut millis = 0;
    while frac_digits < 3 {
        match digit(7 + frac_digits) {
            Some(d) => {
                millis = millis * 10 + d;
                frac_digits += 1;
            }
            None => break,
        }
    }
    if frac_digits < 2 || b.get(7 + frac_digits) != Some(&b']') {
        return None;
    }
    // Two-digit fractions are hundredths.
    if frac_digits == 2 {
        millis *= 10;
    }

    let time = f64::from(minutes * 60 + seconds) + f64::from(millis) / 1000.0;
    Some((time, 8 + frac_digits))
}
