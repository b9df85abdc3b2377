//! Terminal-width line wrapping
//!
//! Re-flows a composed log line into rows no wider than the console. Rows
//! after the first are indented so they line up under the `timestamp [TAG] `
//! header when one is present.

use std::sync::OnceLock;

use regex::Regex;

use unicode_width::UnicodeWidthStr;

use crate::style::{segments, Segment, StyleName, Styler};

/// Characters a line may be broken after
pub const DEFAULT_WORD_BREAK: &str = " \t-.";

/// Continuation indent when no header is detected
pub const DEFAULT_INDENT: usize = 4;

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^[0-9\-.]+[T ][0-9:.]+Z? *\[[^\[\]]+\] ?").expect("header pattern is valid")
    })
}

/// Visual width of the `timestamp [TAG] ` header at the start of `plain`
///
/// `plain` must already be stripped of escape codes.
pub fn header_width(plain: &str) -> Option<usize> {
    header_regex()
        .find(plain)
        .map(|m| UnicodeWidthStr::width(m.as_str()))
}

/// Wraps strings to a fixed column width
#[derive(Debug, Clone)]
pub struct LineWrapper<'a> {
    width: usize,
    word_break: &'a str,
}

impl<'a> LineWrapper<'a> {
    pub fn new(width: usize, word_break: &'a str) -> Self {
        Self { width, word_break }
    }

    /// Join `parts` with single spaces and wrap the result
    pub fn wrap_parts(
        &self,
        parts: &[&str],
        styler: &dyn Styler,
        overrides: &[StyleName],
    ) -> Vec<String> {
        self.wrap(&parts.join(" "), styler, overrides)
    }

    /// Split `text` into display rows
    ///
    /// The indent region of every row is copied as-is; the rest of the row has
    /// `overrides` applied. Empty input yields no rows. The line is scanned
    /// once, so the cost is linear in its length.
    pub fn wrap(&self, text: &str, styler: &dyn Styler, overrides: &[StyleName]) -> Vec<String> {
        let segs = segments(text);
        let plain: String = segs
            .iter()
            .filter(|seg| seg.is_visible())
            .map(Segment::as_str)
            .collect();
        let indent_width = header_width(&plain).unwrap_or(DEFAULT_INDENT);
        let indent = " ".repeat(indent_width);

        let mut rows = Vec::new();
        let mut pos = 0;

        while segs[pos..].iter().any(Segment::is_visible) {
            let (prefix, body_start, col) = if rows.is_empty() {
                let (body_start, col) = first_body_start(&segs, indent_width);
                (concat(&segs[..body_start]), body_start, col)
            } else {
                (indent.clone(), pos, indent_width)
            };

            let cut = self.cut_index(&segs, body_start, col);
            let body = styler.apply(&concat(&segs[body_start..cut]), overrides);
            rows.push(format!("{}{}", prefix, body));
            pos = cut;
        }

        rows
    }

    /// Segment index the current row ends at (exclusive)
    ///
    /// Breaks after the last break character that fits within the width.
    /// Without one the row is cut hard after the last cluster that fits. The
    /// first cluster past `start` is always taken, so wrapping terminates
    /// even when the width is smaller than the indent.
    fn cut_index(&self, segs: &[Segment<'_>], start: usize, mut col: usize) -> usize {
        let mut last_break = None;
        let mut taken = None;

        for (i, seg) in segs.iter().enumerate().skip(start) {
            let Segment::Cluster { text, width } = *seg else {
                continue;
            };
            if col + width > self.width {
                if let Some(end) = taken {
                    return last_break.unwrap_or(end);
                }
            }
            col += width;
            taken = Some(i + 1);
            if self.is_break(text) {
                last_break = Some(i + 1);
            }
        }

        segs.len()
    }

    fn is_break(&self, cluster: &str) -> bool {
        let mut chars = cluster.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if self.word_break.contains(c))
    }
}

/// Where the body of the first row starts, and its column
///
/// Clusters starting inside the indent stay in the prefix. Escapes belong to
/// the cluster after them. A line that never reaches past the indent is all
/// prefix.
fn first_body_start(segs: &[Segment<'_>], indent: usize) -> (usize, usize) {
    let mut col = 0;
    let mut end = 0;
    for (i, seg) in segs.iter().enumerate() {
        if !seg.is_visible() {
            continue;
        }
        if col >= indent {
            return (end, col);
        }
        col += seg.width();
        end = i + 1;
    }
    (segs.len(), col)
}

fn concat(segs: &[Segment<'_>]) -> String {
    segs.iter().map(Segment::as_str).collect()
}
