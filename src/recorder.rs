// src/recorder.rs
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::controller::GestureEvent;
use crate::landmarks::Side;

#[derive(Debug, Serialize)]
struct EventRecord {
    timestamp: String,
    tick: u64,
    side: &'static str,
    finger: usize,
    tilt: &'static str,
    transition: &'static str,
    mode: usize,
    slot: String,
}

/// Collects gesture events for one run and writes them out as CSV.
pub struct EventRecorder {
    output_dir: PathBuf,
    session_name: String,
    events: Vec<(u64, DateTime<Local>, GestureEvent)>,
}

impl EventRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            let id = uuid::Uuid::new_v4().simple().to_string();
            format!(
                "session_{}_{}",
                Local::now().format("%Y%m%d_%H%M%S"),
                &id[..8]
            )
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            events: Vec::new(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn record(&mut self, tick: u64, events: &[GestureEvent]) {
        let now = Local::now();
        self.events.extend(events.iter().map(|event| (tick, now, *event)));
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self
            .output_dir
            .join(&self.session_name)
            .join("gesture_events.csv");

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }

        let file = File::create(&csv_path)
            .with_context(|| format!("Cannot create {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);

        for (tick, timestamp, event) in &self.events {
            writer.serialize(Self::create_record(*tick, timestamp, event))?;
        }

        writer.flush()?;
        info!("Wrote {} events to {}", self.events.len(), csv_path.display());
        Ok(csv_path)
    }

    fn create_record(tick: u64, timestamp: &DateTime<Local>, event: &GestureEvent) -> EventRecord {
        let prefix = match event.side {
            Side::Left => 'l',
            Side::Right => 'r',
        };
        EventRecord {
            timestamp: timestamp.to_rfc3339(),
            tick,
            side: event.side.as_str(),
            finger: event.finger.index(),
            tilt: event.tilt.slot_suffix(),
            transition: event.transition.as_str(),
            mode: event.mode.index(),
            slot: format!(
                "{}{}_{}_{}",
                prefix,
                event.finger.index(),
                event.transition.as_str(),
                event.tilt.slot_suffix()
            ),
        }
    }
}
