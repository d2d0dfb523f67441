// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Composable Markdown fragments.
//!
//! A [`Fragment`] is a piece of Markdown that is already safe to embed in
//! the output. Text enters the fragment world through exactly one door:
//! [`escape`] for free-form text, or [`raw`] for text that is known to be
//! valid Markdown already (signatures, code). Every other builder takes
//! fragments and returns fragments, so a piece of text is never escaped
//! twice.
//!
//! # Example
//!
//! ```
//! use docmd::markdown::{escape, heading, inline_code, paragraph, raw};
//!
//! let out = heading(2, raw("make"))
//!     + paragraph(inline_code(raw("let make: unit => t")))
//!     + paragraph(escape("Returns a <fresh> value."));
//!
//! assert_eq!(
//!     out.as_str(),
//!     "## make\n\n`let make: unit => t`\n\nReturns a \\<fresh\\> value.\n\n"
//! );
//! ```

use std::fmt;
use std::ops::Add;

/// A piece of well-formed Markdown.
///
/// The empty fragment is the identity for [`concat`]; concatenation is
/// associative but order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fragment(String);

impl Fragment {
    /// Returns the empty fragment.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Returns the Markdown text of this fragment.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the empty fragment.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the fragment and returns its Markdown text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Fragment> for String {
    fn from(fragment: Fragment) -> Self {
        fragment.0
    }
}

impl PartialEq<str> for Fragment {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Fragment {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Add for Fragment {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        concat(self, rhs)
    }
}

impl FromIterator<Fragment> for Fragment {
    fn from_iter<I: IntoIterator<Item = Fragment>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), concat)
    }
}

/// Escapes free-form text so literal `<` and `>` are not read as HTML.
///
/// ```
/// use docmd::markdown::escape;
///
/// assert_eq!(escape("a<b>c").as_str(), "a\\<b\\>c");
/// ```
#[must_use]
pub fn escape(text: &str) -> Fragment {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    Fragment(out)
}

/// Wraps text that is already valid Markdown, without escaping.
#[must_use]
pub fn raw(text: impl Into<String>) -> Fragment {
    Fragment(text.into())
}

/// Concatenates two fragments.
///
/// An empty operand returns the other one unchanged; no separator is
/// inserted.
#[must_use]
pub fn concat(a: Fragment, b: Fragment) -> Fragment {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    let mut out = a.0;
    out.push_str(&b.0);
    Fragment(out)
}

/// Like [`concat`], but `b` may be absent, in which case `a` is returned.
#[must_use]
pub fn concat_optional(a: Fragment, b: Option<Fragment>) -> Fragment {
    match b {
        Some(b) => concat(a, b),
        None => a,
    }
}

/// Appends a single newline (a soft break).
#[must_use]
pub fn line(text: Fragment) -> Fragment {
    let mut out = text.0;
    out.push('\n');
    Fragment(out)
}

/// Appends two spaces and a newline (a hard break).
#[must_use]
pub fn force_line(text: Fragment) -> Fragment {
    let mut out = text.0;
    out.push_str("  \n");
    Fragment(out)
}

/// Terminates `text` with a blank line so it renders as its own block.
#[must_use]
pub fn paragraph(text: Fragment) -> Fragment {
    line(line(text))
}

/// Quotes every line of `text` with `> ` and wraps the result as a paragraph.
#[must_use]
pub fn blockquote(text: Fragment) -> Fragment {
    let quoted = text
        .0
        .split('\n')
        .map(|l| format!("> {l}"))
        .collect::<Vec<_>>()
        .join("\n");
    paragraph(Fragment(quoted))
}

/// Wraps `text` in `**`.
#[must_use]
pub fn bold(text: Fragment) -> Fragment {
    surround(text, "**")
}

/// Wraps `text` in `*`.
#[must_use]
pub fn emph(text: Fragment) -> Fragment {
    surround(text, "*")
}

/// Wraps `text` in single backticks.
#[must_use]
pub fn inline_code(text: Fragment) -> Fragment {
    surround(text, "`")
}

/// Renders `code` as an inline code span that survives backticks inside it.
///
/// The backtick run is one longer than the longest run in `code`, so plain
/// text gets single backticks like [`inline_code`]. A leading or trailing
/// backtick is padded with a space, which Markdown strips again.
///
/// ```
/// use docmd::markdown::code_span;
///
/// assert_eq!(code_span("int").as_str(), "`int`");
/// assert_eq!(code_span("a `b` c").as_str(), "``a `b` c``");
/// assert_eq!(code_span("`a").as_str(), "`` `a ``");
/// ```
#[must_use]
pub fn code_span(code: &str) -> Fragment {
    let ticks = "`".repeat(longest_backtick_run(code) + 1);
    let pad = if code.starts_with('`') || code.ends_with('`') {
        " "
    } else {
        ""
    };
    Fragment(format!("{ticks}{pad}{code}{pad}{ticks}"))
}

/// Renders `code` as a fenced code block tagged with `lang`.
///
/// The fence is one backtick longer than the longest backtick run inside
/// `code`, and never shorter than three.
#[must_use]
pub fn code_block(lang: &str, code: &str) -> Fragment {
    let fence = "`".repeat(fence_length(code));
    let body = code.strip_suffix('\n').unwrap_or(code);
    paragraph(Fragment(format!("{fence}{lang}\n{body}\n{fence}")))
}

/// Renders `text` as a block-level heading.
///
/// Level 0 is a plain paragraph. Levels 1 through 6 use `#` markers.
/// Markdown has nothing beyond `######`, so deeper levels degrade to a
/// bold paragraph.
///
/// ```
/// use docmd::markdown::{bold, heading, paragraph, raw};
///
/// assert_eq!(heading(3, raw("t")).as_str(), "### t\n\n");
/// assert_eq!(heading(7, raw("t")), paragraph(bold(raw("t"))));
/// ```
#[must_use]
pub fn heading(level: u8, text: Fragment) -> Fragment {
    match level {
        0 => paragraph(text),
        1..=6 => {
            let mut out = "#".repeat(usize::from(level));
            out.push(' ');
            out.push_str(&text.0);
            paragraph(Fragment(out))
        }
        _ => paragraph(bold(text)),
    }
}

/// Counts the leading `#` characters of `text`.
///
/// ```
/// use docmd::markdown::heading_level;
///
/// assert_eq!(heading_level("### Title"), 3);
/// assert_eq!(heading_level("Title"), 0);
/// ```
#[must_use]
pub fn heading_level(text: &str) -> usize {
    text.bytes().take_while(|&b| b == b'#').count()
}

fn surround(text: Fragment, marker: &str) -> Fragment {
    let mut out = text.0;
    out.insert_str(0, marker);
    out.push_str(marker);
    Fragment(out)
}

fn fence_length(code: &str) -> usize {
    longest_backtick_run(code).max(2) + 1
}

fn longest_backtick_run(code: &str) -> usize {
    let mut max_run = 0;
    let mut current_run = 0;

    for c in code.chars() {
        if c == '`' {
            current_run += 1;
            max_run = max_run.max(current_run);
        } else {
            current_run = 0;
        }
    }

    max_run
}
