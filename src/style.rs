//! Named terminal styles and escape-aware string measurement
//!
//! Styled strings carry SGR escape sequences that take no columns on screen.
//! Everything that measures or cuts a log line goes through [`Styler`] so that
//! positions always refer to terminal columns, counted per grapheme cluster,
//! and neither an escape sequence nor a cluster is ever split.

use std::fmt;
use std::str::FromStr;

use crossterm::style::{Attribute, Color, ContentStyle};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::error::LoggerError;

const ESC: char = '\x1b';

/// A named style that can be applied to a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StyleName {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    BgBlack,
    BgRed,
    BgGreen,
    BgYellow,
    BgBlue,
    BgMagenta,
    BgCyan,
    BgWhite,
    Bold,
    Dim,
    Italic,
    Underline,
    Inverse,
    Hidden,
    Strikethrough,
}

impl StyleName {
    /// Canonical name used in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleName::Black => "black",
            StyleName::Red => "red",
            StyleName::Green => "green",
            StyleName::Yellow => "yellow",
            StyleName::Blue => "blue",
            StyleName::Magenta => "magenta",
            StyleName::Cyan => "cyan",
            StyleName::White => "white",
            StyleName::Gray => "gray",
            StyleName::BgBlack => "bg_black",
            StyleName::BgRed => "bg_red",
            StyleName::BgGreen => "bg_green",
            StyleName::BgYellow => "bg_yellow",
            StyleName::BgBlue => "bg_blue",
            StyleName::BgMagenta => "bg_magenta",
            StyleName::BgCyan => "bg_cyan",
            StyleName::BgWhite => "bg_white",
            StyleName::Bold => "bold",
            StyleName::Dim => "dim",
            StyleName::Italic => "italic",
            StyleName::Underline => "underline",
            StyleName::Inverse => "inverse",
            StyleName::Hidden => "hidden",
            StyleName::Strikethrough => "strikethrough",
        }
    }

    /// Fold this style into a crossterm content style
    fn merge_into(self, style: &mut ContentStyle) {
        match self {
            StyleName::Black => style.foreground_color = Some(Color::Black),
            StyleName::Red => style.foreground_color = Some(Color::DarkRed),
            StyleName::Green => style.foreground_color = Some(Color::DarkGreen),
            StyleName::Yellow => style.foreground_color = Some(Color::DarkYellow),
            StyleName::Blue => style.foreground_color = Some(Color::DarkBlue),
            StyleName::Magenta => style.foreground_color = Some(Color::DarkMagenta),
            StyleName::Cyan => style.foreground_color = Some(Color::DarkCyan),
            StyleName::White => style.foreground_color = Some(Color::Grey),
            StyleName::Gray => style.foreground_color = Some(Color::DarkGrey),
            StyleName::BgBlack => style.background_color = Some(Color::Black),
            StyleName::BgRed => style.background_color = Some(Color::DarkRed),
            StyleName::BgGreen => style.background_color = Some(Color::DarkGreen),
            StyleName::BgYellow => style.background_color = Some(Color::DarkYellow),
            StyleName::BgBlue => style.background_color = Some(Color::DarkBlue),
            StyleName::BgMagenta => style.background_color = Some(Color::DarkMagenta),
            StyleName::BgCyan => style.background_color = Some(Color::DarkCyan),
            StyleName::BgWhite => style.background_color = Some(Color::Grey),
            StyleName::Bold => style.attributes.set(Attribute::Bold),
            StyleName::Dim => style.attributes.set(Attribute::Dim),
            StyleName::Italic => style.attributes.set(Attribute::Italic),
            StyleName::Underline => style.attributes.set(Attribute::Underlined),
            StyleName::Inverse => style.attributes.set(Attribute::Reverse),
            StyleName::Hidden => style.attributes.set(Attribute::Hidden),
            StyleName::Strikethrough => style.attributes.set(Attribute::CrossedOut),
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleName {
    type Err = LoggerError;

    /// Accepts `bgRed`, `bg_red` and `bg-red` alike; `grey` is an alias of `gray`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let style = match normalized.as_str() {
            "black" => StyleName::Black,
            "red" => StyleName::Red,
            "green" => StyleName::Green,
            "yellow" => StyleName::Yellow,
            "blue" => StyleName::Blue,
            "magenta" => StyleName::Magenta,
            "cyan" => StyleName::Cyan,
            "white" => StyleName::White,
            "gray" | "grey" => StyleName::Gray,
            "bgblack" => StyleName::BgBlack,
            "bgred" => StyleName::BgRed,
            "bggreen" => StyleName::BgGreen,
            "bgyellow" => StyleName::BgYellow,
            "bgblue" => StyleName::BgBlue,
            "bgmagenta" => StyleName::BgMagenta,
            "bgcyan" => StyleName::BgCyan,
            "bgwhite" => StyleName::BgWhite,
            "bold" => StyleName::Bold,
            "dim" => StyleName::Dim,
            "italic" => StyleName::Italic,
            "underline" => StyleName::Underline,
            "inverse" => StyleName::Inverse,
            "hidden" => StyleName::Hidden,
            "strikethrough" => StyleName::Strikethrough,
            _ => return Err(LoggerError::UnknownStyle(s.to_string())),
        };
        Ok(style)
    }
}

impl TryFrom<String> for StyleName {
    type Error = LoggerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StyleName> for String {
    fn from(style: StyleName) -> Self {
        style.as_str().to_string()
    }
}

/// Parse a list of style names, failing on the first unknown one
pub fn parse_styles<S: AsRef<str>>(names: &[S]) -> Result<Vec<StyleName>, LoggerError> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}

/// A piece of a styled string: an escape sequence or one grapheme cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Escape(&'a str),
    /// A user-perceived character and the terminal columns it occupies
    Cluster { text: &'a str, width: usize },
}

impl<'a> Segment<'a> {
    pub(crate) fn as_str(&self) -> &'a str {
        match *self {
            Segment::Escape(code) => code,
            Segment::Cluster { text, .. } => text,
        }
    }

    /// Columns taken on screen; escapes take none
    pub(crate) fn width(&self) -> usize {
        match *self {
            Segment::Escape(_) => 0,
            Segment::Cluster { width, .. } => width,
        }
    }

    pub(crate) fn is_visible(&self) -> bool {
        matches!(self, Segment::Cluster { .. })
    }
}

fn push_clusters<'a>(text: &'a str, out: &mut Vec<Segment<'a>>) {
    out.extend(text.graphemes(true).map(|g| Segment::Cluster {
        text: g,
        width: UnicodeWidthStr::width(g),
    }));
}

/// Split a string into escape sequences and grapheme clusters
///
/// Recognizes CSI sequences (`ESC [` params, final byte `@`..`~`) and two-char
/// `ESC x` sequences. A dangling `ESC` at the end is kept as an escape.
pub(crate) fn segments(s: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut run_start = 0;
    let mut chars = s.char_indices();

    while let Some((start, c)) = chars.next() {
        if c != ESC {
            continue;
        }
        push_clusters(&s[run_start..start], &mut out);

        let mut end = start + c.len_utf8();
        match chars.next() {
            Some((i, '[')) => {
                end = i + 1;
                for (j, p) in chars.by_ref() {
                    end = j + p.len_utf8();
                    if ('@'..='~').contains(&p) {
                        break;
                    }
                }
            }
            Some((i, other)) => end = i + other.len_utf8(),
            None => {}
        }
        out.push(Segment::Escape(&s[start..end]));
        run_start = end;
    }
    push_clusters(&s[run_start..], &mut out);

    out
}

/// Remove every escape sequence, keeping only visible text
pub fn strip_ansi(s: &str) -> String {
    segments(s)
        .iter()
        .filter(|seg| seg.is_visible())
        .map(Segment::as_str)
        .collect()
}

/// Terminal columns taken by `s`, ignoring escape sequences
pub fn visual_length(s: &str) -> usize {
    segments(s).iter().map(Segment::width).sum()
}

/// Slice `s` by terminal columns `[start, end)`
///
/// A grapheme cluster belongs to the slice containing its first column, so
/// wide characters and combining marks are never split. An escape sequence
/// travels with the cluster that follows it. Escapes after the last cluster go
/// to the slice that reaches the end of the string, so
/// `slice(0, k) + slice(k, MAX)` reproduces `s` exactly.
pub fn visual_slice(s: &str, start: usize, end: usize) -> String {
    let segs = segments(s);
    let total: usize = segs.iter().map(Segment::width).sum();
    let keep_trailing = end >= total && (start < total || start == 0);

    // starting column of each cluster, and of the cluster each escape precedes
    let mut owner = vec![None; segs.len()];
    let mut col = 0;
    for (i, seg) in segs.iter().enumerate() {
        if seg.is_visible() {
            owner[i] = Some(col);
            col += seg.width();
        }
    }
    let mut next = None;
    for slot in owner.iter_mut().rev() {
        match slot {
            Some(c) => next = Some(*c),
            None => *slot = next,
        }
    }

    segs.iter()
        .zip(owner)
        .filter(|(_, owner)| match owner {
            Some(c) => *c >= start && *c < end,
            None => keep_trailing,
        })
        .map(|(seg, _)| seg.as_str())
        .collect()
}

/// Styling capability used by the logger and the line wrapper
///
/// Measuring and slicing are provided on top of the escape scanner; an
/// implementation only has to decide how styles turn into escape codes.
pub trait Styler: Send + Sync {
    /// Wrap `text` in the given styles. Must return `text` unchanged when
    /// `styles` is empty.
    fn apply(&self, text: &str, styles: &[StyleName]) -> String;

    fn visual_length(&self, s: &str) -> usize {
        visual_length(s)
    }

    fn visual_slice(&self, s: &str, start: usize, end: usize) -> String {
        visual_slice(s, start, end)
    }
}

/// [`Styler`] backed by crossterm's SGR output
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiStyler;

impl Styler for AnsiStyler {
    fn apply(&self, text: &str, styles: &[StyleName]) -> String {
        if styles.is_empty() || text.is_empty() {
            return text.to_string();
        }
        let mut style = ContentStyle::new();
        for name in styles {
            name.merge_into(&mut style);
        }
        style.apply(text).to_string()
    }
}

/// [`Styler`] that never emits escape codes
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn apply(&self, text: &str, _styles: &[StyleName]) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: &str = "\x1b[31m";
    const RESET: &str = "\x1b[0m";

    #[test]
    fn test_parse_style_names() {
        assert_eq!("gray".parse::<StyleName>().unwrap(), StyleName::Gray);
        assert_eq!("grey".parse::<StyleName>().unwrap(), StyleName::Gray);
        assert_eq!("bgRed".parse::<StyleName>().unwrap(), StyleName::BgRed);
        assert_eq!("bg_red".parse::<StyleName>().unwrap(), StyleName::BgRed);
        assert_eq!("BOLD".parse::<StyleName>().unwrap(), StyleName::Bold);
    }

    #[test]
    fn test_parse_unknown_style() {
        let err = "sparkly".parse::<StyleName>().unwrap_err();
        assert!(matches!(err, LoggerError::UnknownStyle(name) if name == "sparkly"));
    }

    #[test]
    fn test_parse_styles_stops_on_unknown() {
        assert_eq!(
            parse_styles(&["bold", "cyan"]).unwrap(),
            vec![StyleName::Bold, StyleName::Cyan]
        );
        assert!(parse_styles(&["bold", "nope"]).is_err());
    }

    #[test]
    fn test_visual_length_ignores_escapes() {
        let s = format!("ab{RED}cd{RESET}e");
        assert_eq!(visual_length(&s), 5);
        assert_eq!(strip_ansi(&s), "abcde");
    }

    #[test]
    fn test_visual_length_counts_columns() {
        assert_eq!(visual_length("日本語"), 6);
        assert_eq!(visual_length(&format!("{RED}日本{RESET}x")), 5);
        // e + combining acute accent is one column
        assert_eq!(visual_length("cafe\u{301}"), 4);
    }

    #[test]
    fn test_segments_group_grapheme_clusters() {
        let s = format!("{RED}e\u{301}日");
        let segs = segments(&s);
        assert_eq!(
            segs,
            vec![
                Segment::Escape(RED),
                Segment::Cluster { text: "e\u{301}", width: 1 },
                Segment::Cluster { text: "日", width: 2 },
            ]
        );
    }

    #[test]
    fn test_visual_slice_never_splits_clusters() {
        let s = "ae\u{301}日本";
        // the accent stays with its base letter
        assert_eq!(visual_slice(s, 0, 1), "a");
        assert_eq!(visual_slice(s, 1, 2), "e\u{301}");
        // a wide character goes to the slice holding its first column
        assert_eq!(visual_slice(s, 0, 3), "ae\u{301}日");
        assert_eq!(visual_slice(s, 2, 4), "日");
        assert_eq!(visual_slice(s, 3, usize::MAX), "本");
        for k in 0..=visual_length(s) {
            assert_eq!(visual_slice(s, 0, k) + &visual_slice(s, k, usize::MAX), s);
        }
    }

    #[test]
    fn test_visual_slice_keeps_escapes_whole() {
        let s = format!("ab{RED}cd{RESET}e");
        assert_eq!(visual_slice(&s, 2, 4), format!("{RED}cd"));
        assert_eq!(visual_slice(&s, 4, usize::MAX), format!("{RESET}e"));
    }

    #[test]
    fn test_visual_slice_split_reassembles() {
        let s = format!("{RED}hello{RESET} world{RESET}");
        for k in 0..=visual_length(&s) {
            let joined = visual_slice(&s, 0, k) + &visual_slice(&s, k, usize::MAX);
            assert_eq!(joined, s, "split at {}", k);
        }
    }

    #[test]
    fn test_visual_slice_trailing_escape_only_once() {
        let s = format!("ab{RESET}");
        assert_eq!(visual_slice(&s, 0, 2), s);
        assert_eq!(visual_slice(&s, 2, usize::MAX), "");
    }

    #[test]
    fn test_ansi_styler_no_styles_is_identity() {
        assert_eq!(AnsiStyler.apply("plain", &[]), "plain");
        assert_eq!(AnsiStyler.apply("", &[StyleName::Bold]), "");
    }

    #[test]
    fn test_ansi_styler_preserves_visible_text() {
        let styled = AnsiStyler.apply("warn", &[StyleName::Bold, StyleName::Yellow]);
        assert_eq!(strip_ansi(&styled), "warn");
        assert_eq!(AnsiStyler.visual_length(&styled), 4);
        // bold is an attribute, so it is emitted regardless of NO_COLOR
        assert!(styled.contains('\x1b'));
    }

    #[test]
    fn test_style_name_serde_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            colors: Vec<StyleName>,
        }
        let parsed: Wrapper = toml::from_str(r#"colors = ["bold", "grey"]"#).unwrap();
        assert_eq!(parsed.colors, vec![StyleName::Bold, StyleName::Gray]);
        let out = toml::to_string(&parsed).unwrap();
        assert!(out.contains("\"gray\""));
    }
}
