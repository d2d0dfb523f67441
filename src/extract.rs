// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Running the external documentation extractor.
//!
//! By default this is `npx rescript-tools doc <file>`, which prints the
//! documentation JSON for a `.res`/`.resi` file on stdout.

use snafu::prelude::*;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Error type for extractor failures.
#[derive(Debug, Snafu)]
pub enum ExtractError {
    /// The extractor command line could not be split into words.
    #[snafu(display("invalid extractor command: {command:?}"))]
    InvalidCommand {
        /// The command line as given.
        command: String,
    },

    /// The extractor could not be started, usually because it is not
    /// installed.
    #[snafu(display("failed to run {program}: {source}"))]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The extractor ran but reported failure.
    #[snafu(display("{program} failed ({status}): {stderr}"))]
    Failed {
        /// The program that failed.
        program: String,
        /// Its exit status.
        status: ExitStatus,
        /// Its trimmed standard error.
        stderr: String,
    },

    /// The extractor printed something that is not UTF-8.
    #[snafu(display("{program} produced non-UTF-8 output: {source}"))]
    Utf8 {
        /// The program that produced the output.
        program: String,
        /// The underlying decoding error.
        source: std::string::FromUtf8Error,
    },
}

/// A command that turns a source file into documentation JSON.
///
/// The source path is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extractor {
    program: String,
    args: Vec<String>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new("npx", ["rescript-tools", "doc"])
    }
}

impl Extractor {
    /// Creates an extractor from a program and its leading arguments.
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a shell-style command line such as `npx rescript-tools doc`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidCommand`] if the line is empty or its
    /// quoting is unbalanced.
    ///
    /// # Example
    ///
    /// ```
    /// use docmd::extract::Extractor;
    ///
    /// let ex = Extractor::from_command_line("node 'my tools/doc.js' --json").unwrap();
    /// assert_eq!(ex.program(), "node");
    /// assert_eq!(ex.args(), ["my tools/doc.js", "--json"]);
    /// ```
    pub fn from_command_line(command: &str) -> Result<Self, ExtractError> {
        let mut words = shlex::split(command)
            .context(InvalidCommandSnafu { command })?
            .into_iter();
        let program = words.next().context(InvalidCommandSnafu { command })?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// The program that is run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments placed before the source path.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Runs the extractor on `source` and returns its standard output.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started, exits with a
    /// non-zero status, or prints non-UTF-8 output.
    pub fn run(&self, source: &Path) -> Result<String, ExtractError> {
        debug!(
            program = %self.program,
            args = ?self.args,
            source = %source.display(),
            "running extractor"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(source)
            .output()
            .context(SpawnSnafu {
                program: &self.program,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            debug!(%stderr, "extractor stderr");
        }

        ensure!(
            output.status.success(),
            FailedSnafu {
                program: &self.program,
                status: output.status,
                stderr,
            }
        );

        String::from_utf8(output.stdout).context(Utf8Snafu {
            program: &self.program,
        })
    }
}
