//! Text normalization shared by the extraction strategies.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}\f\v]+").unwrap());
static ANY_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// NFC-normalize and expand typographic ligatures.
pub fn normalize_unicode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, expanded)) => out.push_str(expanded),
            None => out.push(c),
        }
    }
    out
}

/// Collapse whitespace inside lines and condense blank lines to at most one.
///
/// Line structure survives: runs of spaces/tabs become one space, each line
/// is trimmed, and any stretch of empty lines becomes a single blank line.
pub fn collapse_layout_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<String> = unified
        .lines()
        .map(|line| HORIZONTAL_WS.replace_all(line.trim(), " ").into_owned())
        .collect();

    let joined = lines.join("\n");
    BLANK_LINES.replace_all(&joined, "\n\n").trim().to_string()
}

/// Collapse every whitespace run (including newlines) to a single space.
pub fn collapse_all_whitespace(text: &str) -> String {
    ANY_WS.replace_all(text, " ").into_owned()
}

/// Replace characters outside printable ASCII (plus `\n`, `\r`, `\t`) with a space.
pub fn strip_non_printable(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\x20'..='\x7E' | '\n' | '\r' | '\t' => c,
            _ => ' ',
        })
        .collect()
}

/// Collapse a character followed by `min_repeats` or more copies of itself to one occurrence.
pub fn collapse_repeated_chars(text: &str, min_repeats: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let keep = if run > min_repeats { 1 } else { run };
        for _ in 0..keep {
            out.push(c);
        }
    }

    out
}

/// Number of characters (not bytes) in the trimmed text.
pub fn char_count(text: &str) -> usize {
    text.trim().chars().count()
}
