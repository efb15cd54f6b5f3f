// src/source.rs - Landmark streams produced by an external hand estimator
//
// The estimator (MediaPipe or similar) runs outside this process and writes one
// JSON object per captured frame:
//
//   {"left": [[x, y, z], ...21] | null, "right": [[x, y], ...21] | null, "quit": false}
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::GestureError;
use crate::landmarks::{HandFrame, HandsSample};

/// Anything that can hand over one landmark sample per tick.
pub trait LandmarkSource {
    /// Blocks for the next sample. `Ok(None)` means the stream has ended.
    fn sample(&mut self) -> Result<Option<HandsSample>>;
}

#[derive(Deserialize, Debug)]
struct SampleJson {
    #[serde(default)]
    left: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    right: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    quit: bool,
}

/// Parses one line of the wire format.
pub fn parse_sample(line: &str, line_number: usize) -> Result<HandsSample, GestureError> {
    let raw: SampleJson = serde_json::from_str(line).map_err(|source| GestureError::Parse {
        line: line_number,
        source,
    })?;

    let left = raw.left.as_deref().map(HandFrame::from_coords).transpose()?;
    let right = raw.right.as_deref().map(HandFrame::from_coords).transpose()?;

    Ok(HandsSample {
        left: left.into(),
        right: right.into(),
        quit: raw.quit,
    })
}

/// Newline-delimited JSON samples from any reader: a recorded file, stdin or a
/// child process.
pub struct JsonLinesSource<R> {
    reader: R,
    line_number: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: String::new(),
        }
    }
}

impl JsonLinesSource<BufReader<std::fs::File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Cannot open landmark file {}", path.display()))?;
        info!("Replaying landmarks from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn sample(&mut self) -> Result<Option<HandsSample>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_line(&mut self.buf)
                .context("Failed to read landmark stream")?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            return Ok(Some(parse_sample(line, self.line_number)?));
        }
    }
}

/// Runs the estimator as a child process and reads its stdout.
pub struct SubprocessSource {
    process: Child,
    lines: JsonLinesSource<BufReader<ChildStdout>>,
}

impl SubprocessSource {
    /// Starts `command_line` through the platform shell.
    pub fn spawn(command_line: &str) -> Result<Self> {
        info!("Starting landmark estimator: {}", command_line);

        #[cfg(windows)]
        let mut command = {
            let mut c = Command::new("cmd");
            c.args(["/C", command_line]);
            c
        };
        #[cfg(not(windows))]
        let mut command = {
            let mut c = Command::new("sh");
            c.args(["-c", command_line]);
            c
        };

        let mut process = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to start landmark estimator `{}`", command_line))?;

        let stdout = process
            .stdout
            .take()
            .context("Landmark estimator has no stdout")?;

        Ok(Self {
            process,
            lines: JsonLinesSource::new(BufReader::new(stdout)),
        })
    }
}

impl LandmarkSource for SubprocessSource {
    fn sample(&mut self) -> Result<Option<HandsSample>> {
        let sample = self.lines.sample()?;
        if sample.is_none() {
            match self.process.try_wait() {
                Ok(Some(status)) => debug!("Landmark estimator exited with {}", status),
                Ok(None) => debug!("Landmark estimator closed its output"),
                Err(e) => warn!("Cannot query landmark estimator: {}", e),
            }
        }
        Ok(sample)
    }
}

impl Drop for SubprocessSource {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Picks the source named by the config: estimator command, then landmark
/// file, then stdin.
pub fn open_source(config: &Config) -> Result<Box<dyn LandmarkSource>> {
    if let Some(command) = &config.landmark_command {
        return Ok(Box::new(SubprocessSource::spawn(command)?));
    }
    if let Some(path) = &config.landmark_file {
        return Ok(Box::new(JsonLinesSource::open(path)?));
    }
    info!("Reading landmarks from stdin");
    Ok(Box::new(JsonLinesSource::new(std::io::stdin().lock())))
}
