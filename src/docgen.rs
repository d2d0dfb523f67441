// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! JSON decoding for `rescript-tools doc` output.
//!
//! The extractor describes a module as a tree: the root object carries the
//! module's name, doc-comments and items, and every item is a value, type,
//! or nested module with the same general shape.
//!
//! # Format Overview
//!
//! - `name` is required on every entry
//! - `signature`, `deprecated`, `source` and `detail` are optional
//! - `docstrings` (or `description`) is a string or an array of strings
//! - `items` (or `children`) holds the nested entries in source order
//!
//! # Example
//!
//! ```
//! use docmd::docgen::{parse_doc, EntryKind};
//!
//! let json = r#"{
//!     "name": "Counter",
//!     "docstrings": ["A counter."],
//!     "items": [{
//!         "kind": "value",
//!         "name": "make",
//!         "signature": "let make: unit => t",
//!         "docstrings": []
//!     }]
//! }"#;
//!
//! let doc = parse_doc(json).unwrap();
//! assert_eq!(doc.kind, EntryKind::Module);
//! assert_eq!(doc.items[0].kind, EntryKind::Value);
//! ```

use serde::{Deserialize, Deserializer};
use snafu::prelude::*;

/// Error type for documentation JSON decoding failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// The input was not valid JSON or did not have the expected shape.
    #[snafu(display("failed to parse documentation JSON: {source}"))]
    Json {
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// One node of the documentation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// What this entry documents. The root object has no kind and decodes
    /// as a module.
    #[serde(default)]
    pub kind: EntryKind,

    /// Fully qualified identifier, e.g. `Counter.make`.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    pub name: String,

    /// Source-level signature, already formatted by the extractor.
    #[serde(default)]
    pub signature: Option<String>,

    /// Doc-comment paragraphs, in order.
    #[serde(default, alias = "description", deserialize_with = "one_or_many")]
    pub docstrings: Vec<String>,

    /// Deprecation message, if the entry is marked `@deprecated`.
    #[serde(default)]
    pub deprecated: Option<String>,

    /// Where the entry is defined.
    #[serde(default)]
    pub source: Option<Source>,

    /// Record fields or variant constructors of a type entry.
    #[serde(default)]
    pub detail: Option<Detail>,

    /// Nested entries in source order.
    #[serde(default, alias = "children")]
    pub items: Vec<Self>,
}

impl Entry {
    /// Returns the doc-comment body, paragraphs joined by newlines.
    #[must_use]
    pub fn doc_text(&self) -> String {
        join_docstrings(&self.docstrings)
    }
}

impl Field {
    /// Returns the field's doc-comment body.
    #[must_use]
    pub fn doc_text(&self) -> String {
        join_docstrings(&self.docstrings)
    }
}

impl Constructor {
    /// Returns the constructor's doc-comment body.
    #[must_use]
    pub fn doc_text(&self) -> String {
        join_docstrings(&self.docstrings)
    }
}

fn join_docstrings(docstrings: &[String]) -> String {
    docstrings.join("\n")
}

/// The kind of a documentation [`Entry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    /// A module.
    #[default]
    Module,
    /// A module type (signature).
    ModuleType,
    /// A module alias, `module M = Other`.
    ModuleAlias,
    /// A type declaration.
    Type,
    /// A `let` binding or external.
    Value,
    /// A kind this crate does not know about yet.
    #[serde(other)]
    Other,
}

/// Where an entry is defined.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    /// Path of the defining file, relative to the project root.
    pub filepath: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    #[serde(default)]
    pub col: u32,
}

/// Structure attached to a type entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Detail {
    /// A record type and its fields.
    Record {
        /// Fields in declaration order.
        items: Vec<Field>,
    },
    /// A variant type and its constructors.
    Variant {
        /// Constructors in declaration order.
        items: Vec<Constructor>,
    },
    /// Detail this crate does not render, such as function signatures.
    #[serde(other)]
    Other,
}

/// A record field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Whether the field is declared optional (`name?: t`).
    #[serde(default)]
    pub optional: bool,
    /// Field type.
    #[serde(default)]
    pub signature: Option<String>,
    /// Doc-comment paragraphs.
    #[serde(default, alias = "description", deserialize_with = "one_or_many")]
    pub docstrings: Vec<String>,
    /// Deprecation message.
    #[serde(default)]
    pub deprecated: Option<String>,
}

/// A variant constructor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Constructor {
    /// Constructor name.
    pub name: String,
    /// Constructor signature, e.g. `Leaf(int)`.
    #[serde(default)]
    pub signature: Option<String>,
    /// Doc-comment paragraphs.
    #[serde(default, alias = "description", deserialize_with = "one_or_many")]
    pub docstrings: Vec<String>,
    /// Deprecation message.
    #[serde(default)]
    pub deprecated: Option<String>,
    /// Inline record payload, if the constructor carries one.
    #[serde(default)]
    pub payload: Option<Payload>,
}

/// The payload of a variant constructor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Payload {
    /// `Ctor({a: int, b: string})`.
    InlineRecord {
        /// Fields of the inline record.
        fields: Vec<Field>,
    },
    /// Any other payload shape.
    #[serde(other)]
    Other,
}

/// Accepts either a single string or an array of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(text) => vec![text],
        OneOrMany::Many(texts) => texts,
    })
}

/// Parses extractor JSON into the root [`Entry`].
///
/// # Errors
///
/// Returns an error if the JSON is malformed or an entry is missing its
/// `name`.
///
/// # Example
///
/// ```
/// use docmd::docgen::parse_doc;
///
/// let doc = parse_doc(r#"{"name": "Empty"}"#).unwrap();
/// assert_eq!(doc.name, "Empty");
/// assert!(doc.items.is_empty());
/// ```
pub fn parse_doc(json_str: &str) -> Result<Entry, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_root() {
        let doc = parse_doc(r#"{"name": "Mod"}"#).unwrap();

        assert_eq!(doc.name, "Mod");
        assert_eq!(doc.kind, EntryKind::Module);
        assert!(doc.signature.is_none());
        assert!(doc.docstrings.is_empty());
        assert!(doc.items.is_empty());
    }

    #[test]
    fn parses_extractor_output() {
        let json = r#"{
            "name": "Counter",
            "docstrings": ["A counter.", "Second paragraph."],
            "source": { "filepath": "src/Counter.res", "line": 1, "col": 1 },
            "items": [
                {
                    "id": "Counter.make",
                    "kind": "value",
                    "name": "make",
                    "signature": "let make: unit => t",
                    "docstrings": ["Creates a counter."],
                    "source": { "filepath": "src/Counter.res", "line": 4, "col": 5 }
                },
                {
                    "id": "Counter.Inner",
                    "kind": "module",
                    "name": "Inner",
                    "docstrings": [],
                    "items": []
                }
            ]
        }"#;
        let doc = parse_doc(json).unwrap();

        assert_eq!(doc.doc_text(), "A counter.\nSecond paragraph.");
        assert_eq!(doc.source.as_ref().map(|s| s.line), Some(1));
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[0].id.as_deref(), Some("Counter.make"));
        assert_eq!(doc.items[0].kind, EntryKind::Value);
        assert_eq!(
            doc.items[0].signature.as_deref(),
            Some("let make: unit => t")
        );
        assert_eq!(doc.items[1].kind, EntryKind::Module);
    }

    #[test]
    fn accepts_description_and_children_aliases() {
        let json = r#"{
            "name": "Mod",
            "description": "single string",
            "children": [{ "name": "f" }]
        }"#;
        let doc = parse_doc(json).unwrap();

        assert_eq!(doc.docstrings, vec!["single string".to_owned()]);
        assert_eq!(doc.items[0].name, "f");
    }

    #[test]
    fn parses_module_kinds() {
        let json = r#"{
            "name": "Mod",
            "items": [
                { "kind": "moduleType", "name": "S" },
                { "kind": "moduleAlias", "name": "A" },
                { "kind": "type", "name": "t" },
                { "kind": "somethingNew", "name": "x" }
            ]
        }"#;
        let doc = parse_doc(json).unwrap();
        let kinds: Vec<_> = doc.items.iter().map(|i| i.kind).collect();

        assert_eq!(
            kinds,
            [
                EntryKind::ModuleType,
                EntryKind::ModuleAlias,
                EntryKind::Type,
                EntryKind::Other
            ]
        );
    }

    #[test]
    fn parses_record_detail() {
        let json = r#"{
            "name": "t",
            "kind": "type",
            "signature": "type t = {name: string, age?: int}",
            "detail": {
                "kind": "record",
                "items": [
                    { "name": "name", "optional": false, "signature": "string", "docstrings": ["The name."] },
                    { "name": "age", "optional": true, "signature": "option<int>", "docstrings": [] }
                ]
            }
        }"#;
        let entry = parse_doc(json).unwrap();

        match entry.detail {
            Some(Detail::Record { items }) => {
                assert_eq!(items.len(), 2);
                assert!(!items[0].optional);
                assert!(items[1].optional);
                assert_eq!(items[0].docstrings, vec!["The name.".to_owned()]);
            }
            other => panic!("Expected record detail, got {other:?}"),
        }
    }

    #[test]
    fn parses_variant_detail_with_inline_record() {
        let json = r#"{
            "name": "shape",
            "kind": "type",
            "detail": {
                "kind": "variant",
                "items": [
                    { "name": "Point", "signature": "Point", "docstrings": [] },
                    {
                        "name": "Rect",
                        "signature": "Rect({w: int, h: int})",
                        "docstrings": ["A rectangle."],
                        "payload": {
                            "kind": "inlineRecord",
                            "fields": [
                                { "name": "w", "optional": false, "signature": "int", "docstrings": [] }
                            ]
                        }
                    }
                ]
            }
        }"#;
        let entry = parse_doc(json).unwrap();

        match entry.detail {
            Some(Detail::Variant { items }) => {
                assert!(items[0].payload.is_none());
                match &items[1].payload {
                    Some(Payload::InlineRecord { fields }) => assert_eq!(fields[0].name, "w"),
                    other => panic!("Expected inline record, got {other:?}"),
                }
            }
            other => panic!("Expected variant detail, got {other:?}"),
        }
    }

    #[test]
    fn fields_and_constructors_join_docstrings_like_entries() {
        let json = r#"{
            "name": "t",
            "kind": "type",
            "docstrings": ["one", "two"],
            "detail": {
                "kind": "variant",
                "items": [
                    { "name": "A", "signature": "A", "docstrings": ["one", "two"] }
                ]
            }
        }"#;
        let entry = parse_doc(json).unwrap();
        let field: Field =
            serde_json::from_str(r#"{ "name": "x", "docstrings": ["one", "two"] }"#).unwrap();

        let Some(Detail::Variant { items }) = &entry.detail else {
            panic!("Expected variant detail, got {:?}", entry.detail);
        };
        assert_eq!(entry.doc_text(), "one\ntwo");
        assert_eq!(items[0].doc_text(), entry.doc_text());
        assert_eq!(field.doc_text(), entry.doc_text());
    }

    #[test]
    fn unknown_detail_kind_is_other() {
        let json = r#"{
            "name": "f",
            "kind": "value",
            "detail": {
                "kind": "signature",
                "details": { "parameters": [], "returnType": { "path": "int" } }
            }
        }"#;
        let entry = parse_doc(json).unwrap();

        assert_eq!(entry.detail, Some(Detail::Other));
    }

    #[test]
    fn parses_deprecation() {
        let json = r#"{ "name": "old", "kind": "value", "deprecated": "Use new instead" }"#;
        let entry = parse_doc(json).unwrap();

        assert_eq!(entry.deprecated.as_deref(), Some("Use new instead"));
    }

    #[test]
    fn returns_error_for_invalid_json() {
        assert!(parse_doc("not valid json").is_err());
    }

    #[test]
    fn returns_error_for_missing_name() {
        assert!(parse_doc(r#"{"docstrings": []}"#).is_err());
        assert!(parse_doc(r#"{"name": "Mod", "items": [{"kind": "value"}]}"#).is_err());
    }

    #[test]
    fn returns_error_for_non_string_docstrings() {
        assert!(parse_doc(r#"{"name": "Mod", "docstrings": [1, 2]}"#).is_err());
    }
}
