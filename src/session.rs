// src/session.rs - Drives a controller from a landmark source until the run ends
use anyhow::Result;
use tracing::{info, warn};

use crate::controller::{Controller, Outcome};
use crate::recorder::EventRecorder;
use crate::source::LandmarkSource;

pub struct Session {
    controller: Controller,
    recorder: Option<EventRecorder>,
    ticks: u64,
}

impl Session {
    pub fn new(controller: Controller, recorder: Option<EventRecorder>) -> Self {
        Self {
            controller,
            recorder,
            ticks: 0,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn recorder(&self) -> Option<&EventRecorder> {
        self.recorder.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs until the stream ends, quit or shutdown. Recorded events are
    /// exported on every exit path, including a failed tick; the tick error
    /// takes precedence over an export error.
    pub fn run(&mut self, source: &mut dyn LandmarkSource) -> Result<()> {
        let result = self.drive(source);

        if let Some(recorder) = &self.recorder {
            match (&result, recorder.export_csv()) {
                (_, Ok(_)) => {}
                (Ok(()), Err(e)) => return Err(e),
                (Err(_), Err(e)) => warn!("Could not export events: {:#}", e),
            }
        }
        result
    }

    fn drive(&mut self, source: &mut dyn LandmarkSource) -> Result<()> {
        info!("Gesture control running in mode {}", self.controller.mode());

        while let Some(sample) = source.sample()? {
            self.ticks += 1;
            let tick = self.ticks;

            let report = self
                .controller
                .tick(&sample)
                .map_err(|e| e.context(format!("Tick {} failed", tick)))?;
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.record(tick, &report.events);
            }

            if report.outcome != Outcome::Continue {
                info!("Stopping after {} ticks ({:?})", tick, report.outcome);
                return Ok(());
            }
        }

        info!("Landmark stream ended after {} ticks", self.ticks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityThresholds;
    use crate::landmarks::fixtures::{index_folded, open_hand};
    use crate::landmarks::{HandFrame, LANDMARK_COUNT};
    use crate::mode::MODE_COUNT;
    use crate::plugins::{CommandModule, Registry, Slot};
    use crate::source::JsonLinesSource;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn hand_json(frame: &HandFrame) -> String {
        let points: Vec<String> = (0..LANDMARK_COUNT)
            .map(|i| format!("[{},{}]", frame.x(i), frame.y(i)))
            .collect();
        format!("[{}]", points.join(","))
    }

    fn stream(lines: &[String]) -> JsonLinesSource<Cursor<String>> {
        JsonLinesSource::new(Cursor::new(lines.join("\n")))
    }

    fn failing_registry() -> Registry {
        let slot = Slot::parse("r1_activated_without_tilt").unwrap();
        let mut modules: [CommandModule; MODE_COUNT] =
            std::array::from_fn(|i| CommandModule::empty(format!("Module{}", i)));
        modules[1] = CommandModule::empty("Module1").with(slot, || anyhow::bail!("device gone"));
        Registry::new(modules)
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("gesture_control_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_stops_on_quit_and_counts_ticks() {
        let hand = hand_json(&open_hand());
        let mut source = stream(&[
            format!("{{\"right\": {}}}", hand),
            format!("{{\"right\": {}, \"quit\": true}}", hand),
            format!("{{\"right\": {}}}", hand),
        ]);
        let controller = Controller::new(ActivityThresholds::default(), Registry::default());
        let mut session = Session::new(controller, None);

        session.run(&mut source).unwrap();
        assert_eq!(session.ticks(), 2);
        assert!(source.sample().unwrap().is_some());
    }

    #[test]
    fn test_failed_tick_still_exports_events() {
        let dir = temp_dir();
        // Tick 1 selects mode 1 with the left index; tick 2 fails in that module.
        let mut source = stream(&[
            format!("{{\"left\": {}}}", hand_json(&index_folded(open_hand()))),
            format!("{{\"right\": {}}}", hand_json(&index_folded(open_hand()))),
        ]);
        let controller = Controller::new(ActivityThresholds::default(), failing_registry());
        let recorder = EventRecorder::new(&dir, Some("failed".to_string()));
        let mut session = Session::new(controller, Some(recorder));

        let err = session.run(&mut source).unwrap_err();
        assert!(format!("{:#}", err).contains("device gone"));
        assert_eq!(session.ticks(), 2);

        let path = dir.join("failed").join("gesture_events.csv");
        let rows: Vec<csv::StringRecord> = csv::Reader::from_path(&path)
            .unwrap()
            .records()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][7], "l1_activated_without_tilt");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
