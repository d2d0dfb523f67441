// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Integration tests for docmd decoding and rendering.

use docmd::{docgen, renderer};
use std::fs;
use std::path::Path;

/// Decodes all JSON dumps in the fixtures directory and verifies they render.
#[test]
fn renders_all_fixture_dumps() {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

    if !fixtures_dir.exists() {
        // Skip if no fixtures directory
        return;
    }

    for entry in fs::read_dir(&fixtures_dir).expect("Failed to read fixtures directory") {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "json") {
            let json = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

            let doc = docgen::parse_doc(&json)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()));

            let markdown = renderer::render_doc(&doc, &renderer::RenderOptions::default());

            assert!(
                markdown.starts_with(&format!("# {}", doc.name)),
                "Invalid markdown header in {}",
                path.display()
            );
        }
    }
}

/// The documented end-to-end example: a module with one documented value.
#[test]
fn renders_module_with_value() {
    let json = r#"{
        "name": "Mod",
        "signature": "module Mod",
        "items": [{
            "name": "f",
            "signature": "let f: int -> int",
            "docstrings": ["adds one"]
        }]
    }"#;

    let doc = docgen::parse_doc(json).unwrap();
    let output = renderer::render_doc(&doc, &renderer::RenderOptions::default());

    assert_eq!(
        output,
        "# Mod\n\n`module Mod`\n\n## f\n\n`let f: int -> int`\n\nadds one\n\n"
    );
}

/// Rendering the same tree twice gives byte-identical output.
#[test]
fn rendering_is_deterministic() {
    let doc = docgen::parse_doc(include_str!("fixtures/Counter.json")).unwrap();
    let opts = renderer::RenderOptions {
        show_source: true,
        ..Default::default()
    };

    assert_eq!(
        renderer::render_doc(&doc, &opts),
        renderer::render_doc(&doc, &opts)
    );
}

/// Tests a realistic extractor dump end to end.
#[test]
fn renders_extractor_dump() {
    let doc = docgen::parse_doc(include_str!("fixtures/Counter.json")).unwrap();
    let output = renderer::render_doc(&doc, &renderer::RenderOptions::default());

    let expected = "\
# Counter

A mutable counter.

## t

```rescript
type t = {
  mutable count: int,
  step?: int,
}
```

The counter state.

### count

`int`

Current value.

### step?

`option<int>`

## make

`let make: (~step: int=?) => t`

Creates a counter starting at zero.

#### Examples

```rescript
let c = Counter.make(~step=2)
c->Counter.incr // => 2
```

## incr

`let incr: t => int`

> **Deprecated:** Use \\<Counter.add\\> instead

Adds one step and returns the new value.

## Events

### event

`type event = Reset | Set({value: int})`

#### Reset

`Reset`

#### Set

`Set({value: int})`

Forces a value.

##### value

`int`

";

    assert_eq!(output, expected);
}

/// Source locations only show up when asked for.
#[test]
fn source_locations_are_optional() {
    let doc = docgen::parse_doc(include_str!("fixtures/Counter.json")).unwrap();

    let plain = renderer::render_doc(&doc, &renderer::RenderOptions::default());
    let with_source = renderer::render_doc(
        &doc,
        &renderer::RenderOptions {
            show_source: true,
            ..Default::default()
        },
    );

    assert!(!plain.contains("Defined in"));
    assert!(with_source.contains("# Counter\n\n*Defined in `src/Counter.resi:1`*\n\n"));
    assert!(with_source.contains("## make\n\n*Defined in `src/Counter.resi:11`*\n\n"));
}

/// Heading offset shifts every level, including doc-comment headings.
#[test]
fn heading_offset_shifts_everything() {
    let doc = docgen::parse_doc(include_str!("fixtures/Counter.json")).unwrap();
    let output = renderer::render_doc(
        &doc,
        &renderer::RenderOptions {
            heading_offset: 1,
            ..Default::default()
        },
    );

    assert!(output.starts_with("## Counter\n\n"));
    assert!(output.contains("### make\n\n"));
    assert!(output.contains("##### Examples\n\n"));
    assert!(output.contains("###### value\n\n"));
}

/// Malformed input is rejected before rendering.
#[test]
fn rejects_entry_without_name() {
    let json = r#"{"name": "Mod", "items": [{"signature": "let f: int"}]}"#;

    let err = docgen::parse_doc(json).unwrap_err();

    assert!(err.to_string().contains("name"));
}

/// Runs the extractor driver against a fake extractor that prints a file.
#[cfg(unix)]
#[test]
fn extracts_with_custom_command() {
    use docmd::extract::Extractor;
    use std::io::Write;

    let mut dump = tempfile::NamedTempFile::new().unwrap();
    write!(
        dump,
        r#"{{"name": "Tiny", "items": [{{"kind": "value", "name": "x", "signature": "let x: int"}}]}}"#
    )
    .unwrap();

    let extractor = Extractor::from_command_line("cat").unwrap();
    let json = extractor.run(dump.path()).unwrap();
    let doc = docgen::parse_doc(&json).unwrap();
    let output = renderer::render_doc(&doc, &renderer::RenderOptions::default());

    assert_eq!(output, "# Tiny\n\n## x\n\n`let x: int`\n\n");
}

/// The binary prints usage and fails when not given exactly two paths.
#[test]
fn cli_fails_with_usage_on_wrong_argument_count() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_docmd"))
        .arg("Mod.res")
        .env_remove("DOCMD_EXTRACTOR")
        .output()
        .expect("Failed to run docmd");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: docmd"), "stderr was: {stderr}");
}

/// A second batch run leaves existing outputs alone unless forced.
#[test]
fn cli_batch_run_skips_existing_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("A.json"), r#"{"name": "A"}"#).unwrap();
    fs::write(src.join("B.json"), r#"{"name": "B"}"#).unwrap();

    let run = |extra: &[&str]| {
        std::process::Command::new(env!("CARGO_BIN_EXE_docmd"))
            .args(["--json", "-q"])
            .args(extra)
            .arg(&src)
            .arg(&out)
            .status()
            .expect("Failed to run docmd")
    };

    assert!(run(&[]).success());
    assert_eq!(fs::read_to_string(out.join("A.md")).unwrap(), "# A\n\n");

    fs::write(out.join("A.md"), "edited").unwrap();
    assert!(run(&[]).success());
    assert_eq!(fs::read_to_string(out.join("A.md")).unwrap(), "edited");

    assert!(run(&["--force"]).success());
    assert_eq!(fs::read_to_string(out.join("A.md")).unwrap(), "# A\n\n");
    assert_eq!(fs::read_to_string(out.join("B.md")).unwrap(), "# B\n\n");
}
