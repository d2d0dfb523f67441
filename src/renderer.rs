// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Markdown rendering for decoded documentation trees.
//!
//! This module walks an [`Entry`] tree depth-first, parent before children,
//! and emits one Markdown document. Every entry gets a heading whose level
//! follows its nesting depth: the root is `#`, its items `##`, and so on.
//! Headings deeper than `######` degrade to bold paragraphs.
//!
//! # Output Format
//!
//! For each entry, in order:
//! - a heading with the entry name (always present)
//! - the source location (when enabled)
//! - the signature, as inline code or a fenced block if it spans lines
//! - a deprecation notice
//! - the doc-comment body
//! - record fields or variant constructors (when enabled)
//! - the entry's children
//!
//! # Example
//!
//! ```
//! use docmd::docgen::parse_doc;
//! use docmd::renderer::{render_doc, RenderOptions};
//!
//! let doc = parse_doc(r#"{
//!     "name": "Mod",
//!     "signature": "module Mod",
//!     "items": [{
//!         "name": "f",
//!         "signature": "let f: int -> int",
//!         "docstrings": ["adds one"]
//!     }]
//! }"#).unwrap();
//!
//! let markdown = render_doc(&doc, &RenderOptions::default());
//!
//! assert_eq!(
//!     markdown,
//!     "# Mod\n\n`module Mod`\n\n## f\n\n`let f: int -> int`\n\nadds one\n\n"
//! );
//! ```

use crate::docgen::{Constructor, Detail, Entry, Field, Payload, Source};
use crate::markdown::{
    Fragment, blockquote, bold, code_block, code_span, concat_optional, emph, escape, heading,
    heading_level, paragraph, raw,
};

/// Configuration options for Markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Number of heading levels to shift (0-5).
    ///
    /// A value of 0 renders the root as H1. A value of 1 renders it as H2,
    /// useful for embedding the output in a larger page.
    pub heading_offset: u8,

    /// Whether to include the defining file and line under each heading.
    pub show_source: bool,

    /// Whether to include `@deprecated` notices.
    pub show_deprecated: bool,

    /// Whether to render record fields and variant constructors of types.
    pub show_details: bool,

    /// Info string for fenced code blocks holding multi-line signatures.
    pub code_lang: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heading_offset: 0,
            show_source: false,
            show_deprecated: true,
            show_details: true,
            code_lang: "rescript".to_owned(),
        }
    }
}

/// The parts every rendered section shares, whether it comes from an
/// entry, a record field or a constructor.
struct Section<'a> {
    name: Fragment,
    signature: Option<&'a str>,
    deprecated: Option<&'a str>,
    source: Option<&'a Source>,
    doc: String,
}

/// Renders a documentation tree as Markdown.
///
/// Rendering is pure: the same tree and options always produce the same
/// string.
#[must_use]
pub fn render_doc(doc: &Entry, opts: &RenderOptions) -> String {
    let root_level = opts.heading_offset.saturating_add(1);
    render_entry(doc, root_level, opts).into_string()
}

fn render_entry(entry: &Entry, level: u8, opts: &RenderOptions) -> Fragment {
    let child_level = level.saturating_add(1);

    let section = Section {
        name: escape(&entry.name),
        signature: entry.signature.as_deref(),
        deprecated: entry.deprecated.as_deref(),
        source: entry.source.as_ref(),
        doc: entry.doc_text(),
    };
    let mut out = render_section(section, level, opts);

    if opts.show_details {
        out = concat_optional(
            out,
            entry
                .detail
                .as_ref()
                .map(|detail| render_detail(detail, child_level, opts)),
        );
    }

    out + entry
        .items
        .iter()
        .map(|item| render_entry(item, child_level, opts))
        .collect()
}

fn render_section(section: Section<'_>, level: u8, opts: &RenderOptions) -> Fragment {
    let mut out = heading(level, section.name);

    if opts.show_source {
        out = concat_optional(out, section.source.map(render_source));
    }

    out = concat_optional(
        out,
        section
            .signature
            .filter(|sig| !sig.trim().is_empty())
            .map(|sig| render_signature(sig, &opts.code_lang)),
    );

    if opts.show_deprecated {
        out = concat_optional(out, section.deprecated.map(render_deprecated));
    }

    out + render_doc_body(&section.doc, level)
}

fn render_detail(detail: &Detail, level: u8, opts: &RenderOptions) -> Fragment {
    match detail {
        Detail::Record { items } => items
            .iter()
            .map(|field| render_field(field, level, opts))
            .collect(),
        Detail::Variant { items } => items
            .iter()
            .map(|ctor| render_constructor(ctor, level, opts))
            .collect(),
        Detail::Other => Fragment::empty(),
    }
}

fn render_field(field: &Field, level: u8, opts: &RenderOptions) -> Fragment {
    let name = if field.optional {
        escape(&format!("{}?", field.name))
    } else {
        escape(&field.name)
    };
    let section = Section {
        name,
        signature: field.signature.as_deref(),
        deprecated: field.deprecated.as_deref(),
        source: None,
        doc: field.doc_text(),
    };
    render_section(section, level, opts)
}

fn render_constructor(ctor: &Constructor, level: u8, opts: &RenderOptions) -> Fragment {
    let section = Section {
        name: escape(&ctor.name),
        signature: ctor.signature.as_deref(),
        deprecated: ctor.deprecated.as_deref(),
        source: None,
        doc: ctor.doc_text(),
    };
    let out = render_section(section, level, opts);

    match &ctor.payload {
        Some(Payload::InlineRecord { fields }) => {
            let field_level = level.saturating_add(1);
            out + fields
                .iter()
                .map(|field| render_field(field, field_level, opts))
                .collect()
        }
        Some(Payload::Other) | None => out,
    }
}

fn render_source(source: &Source) -> Fragment {
    let location = format!("{}:{}", source.filepath, source.line);
    paragraph(emph(raw("Defined in ") + code_span(&location)))
}

/// Single-line signatures become inline code; anything longer gets a fence
/// so the extractor's line breaks survive.
fn render_signature(signature: &str, lang: &str) -> Fragment {
    let signature = signature.trim_end();
    if signature.contains('\n') {
        code_block(lang, signature)
    } else {
        paragraph(code_span(signature))
    }
}

fn render_deprecated(message: &str) -> Fragment {
    let message = message.trim();
    if message.is_empty() {
        blockquote(bold(raw("Deprecated")))
    } else {
        blockquote(bold(raw("Deprecated:")) + raw(" ") + escape(message))
    }
}

/// Renders a doc-comment body that sits under a heading of `level`.
///
/// Prose is escaped. Fenced and indented code blocks and inline code spans
/// are already Markdown and pass through verbatim. Headings written in the comment are
/// nested below `level`, so a `#` in a doc-comment becomes `level + 1`.
fn render_doc_body(text: &str, level: u8) -> Fragment {
    let mut out = Fragment::empty();
    let mut prose: Vec<&str> = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(current) = lines.next() {
        let trimmed = current.trim_start();

        // An indented block cannot interrupt a paragraph.
        if prose.is_empty() && is_indented_code(current) {
            let mut block = vec![current];
            while let Some(inner) =
                lines.next_if(|l| l.trim().is_empty() || is_indented_code(l))
            {
                block.push(inner);
            }
            while block.last().is_some_and(|l| l.trim().is_empty()) {
                block.pop();
            }
            out = out + paragraph(raw(block.join("\n")));
        } else if let Some(fence) = fence_marker(trimmed) {
            out = out + flush_prose(&mut prose);
            let mut block = vec![current];
            for inner in lines.by_ref() {
                block.push(inner);
                if closes_fence(inner.trim(), fence) {
                    break;
                }
            }
            out = out + paragraph(raw(block.join("\n")));
        } else if let Some((depth, title)) = doc_heading(trimmed) {
            out = out + flush_prose(&mut prose);
            let nested = level.saturating_add(depth);
            out = out + heading(nested, escape_outside_code_spans(title));
        } else if trimmed.is_empty() {
            out = out + flush_prose(&mut prose);
        } else {
            prose.push(current);
        }
    }

    out + flush_prose(&mut prose)
}

fn flush_prose(prose: &mut Vec<&str>) -> Fragment {
    if prose.is_empty() {
        return Fragment::empty();
    }
    let text = prose.join("\n");
    prose.clear();
    paragraph(escape_outside_code_spans(&text))
}

fn is_indented_code(line: &str) -> bool {
    (line.starts_with("    ") || line.starts_with('\t')) && !line.trim().is_empty()
}

/// Returns the fence run (e.g. "```" or "~~~~") opening a code block.
///
/// A backtick fence's info string may not contain backticks; such a line is
/// prose that starts with a code span.
fn fence_marker(line: &str) -> Option<&str> {
    let first = *line.as_bytes().first().filter(|b| matches!(b, b'`' | b'~'))?;
    let len = line.bytes().take_while(|&b| b == first).count();
    if len < 3 || (first == b'`' && line[len..].contains('`')) {
        return None;
    }
    Some(&line[..len])
}

/// A closing fence is a bare run of the opening character, at least as long.
fn closes_fence(line: &str, fence: &str) -> bool {
    fence_marker(line).is_some_and(|run| run.len() == line.len() && run.starts_with(fence))
}

/// Recognises an ATX heading line: one to six `#` followed by a space or
/// the end of the line.
fn doc_heading(line: &str) -> Option<(u8, &str)> {
    let depth = heading_level(line);
    if !(1..=6).contains(&depth) {
        return None;
    }
    let rest = &line[depth..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let depth = u8::try_from(depth).ok()?;
    Some((depth, rest.trim().trim_end_matches('#').trim_end()))
}

/// Escapes `text` except inside backtick code spans, which render `\<`
/// literally and must stay untouched.
fn escape_outside_code_spans(text: &str) -> Fragment {
    let mut out = Fragment::empty();
    let mut rest = text;

    while let Some(start) = rest.find('`') {
        let ticks = rest[start..].bytes().take_while(|&b| b == b'`').count();
        let after = &rest[start + ticks..];
        match closing_ticks(after, ticks) {
            Some(end) => {
                let span_end = start + ticks + end + ticks;
                out = out + escape(&rest[..start]) + raw(&rest[start..span_end]);
                rest = &rest[span_end..];
            }
            None => {
                out = out + escape(&rest[..start + ticks]);
                rest = after;
            }
        }
    }

    out + escape(rest)
}

/// Finds a backtick run of exactly `ticks` in `haystack`.
fn closing_ticks(haystack: &str, ticks: usize) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = haystack[offset..].find('`') {
        let at = offset + pos;
        let run = haystack[at..].bytes().take_while(|&b| b == b'`').count();
        if run == ticks {
            return Some(at);
        }
        offset = at + run;
    }
    None
}
