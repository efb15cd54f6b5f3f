// src/controller.rs - One tick of the gesture pipeline
use serde::Serialize;
use tracing::{info, warn};

use crate::activity::{ActivityThresholds, HandActivity};
use crate::dispatch::Dispatcher;
use crate::gesture::{Finger, FingerTransition, GestureBank, Transition};
use crate::landmarks::{HandsSample, Side};
use crate::mode::{Mode, ModeSelector};
use crate::plugins::Registry;
use crate::tilt::TiltContext;

/// A single finger transition, with the mode in effect once it was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GestureEvent {
    pub side: Side,
    pub finger: Finger,
    pub tilt: TiltContext,
    pub transition: Transition,
    pub mode: Mode,
}

impl GestureEvent {
    fn new(side: Side, t: FingerTransition, mode: Mode) -> Self {
        Self {
            side,
            finger: t.finger,
            tilt: t.tilt,
            transition: t.transition,
            mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Continue,
    /// The display loop reported the quit key.
    Quit,
    /// Left thumb and ring finger were folded together.
    Shutdown,
}

#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<GestureEvent>,
    /// Tilt of the right hand, when it was classified this tick.
    pub tilt: Option<TiltContext>,
    pub outcome: Outcome,
}

/// Owns all gesture state; stages run left hand first, then right hand.
#[derive(Debug)]
pub struct Controller {
    left_activity: HandActivity,
    right_activity: HandActivity,
    selector: ModeSelector,
    right_bank: GestureBank,
    dispatcher: Dispatcher,
}

impl Controller {
    pub fn new(thresholds: ActivityThresholds, registry: Registry) -> Self {
        Self {
            left_activity: HandActivity::new(Side::Left, thresholds),
            right_activity: HandActivity::new(Side::Right, thresholds),
            selector: ModeSelector::new(),
            right_bank: GestureBank::new(Side::Right),
            dispatcher: Dispatcher::new(registry),
        }
    }

    pub fn mode(&self) -> Mode {
        self.selector.mode()
    }

    pub fn is_active(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_activity.is_active(),
            Side::Right => self.right_activity.is_active(),
        }
    }

    pub fn bank(&self, side: Side) -> &GestureBank {
        match side {
            Side::Left => self.selector.bank(),
            Side::Right => &self.right_bank,
        }
    }

    /// Processes one landmark sample.
    ///
    /// A callback error aborts the tick and is returned; transitions already
    /// dispatched in this tick stay applied.
    pub fn tick(&mut self, sample: &HandsSample) -> anyhow::Result<TickReport> {
        let mut report = TickReport::default();

        if let Some(frame) = self.left_activity.update(&sample.left) {
            let selection = self.selector.update(frame)?;
            report.events.extend(
                selection
                    .transitions
                    .into_iter()
                    .map(|(t, mode)| GestureEvent::new(Side::Left, t, mode)),
            );

            if selection.shutdown {
                warn!("left thumb and ring finger folded, shutting down");
                report.outcome = Outcome::Shutdown;
                return Ok(report);
            }
        }

        if let Some(frame) = self.right_activity.update(&sample.right) {
            let tilt = TiltContext::classify(frame);
            let mode = self.selector.mode();
            let dispatcher = &mut self.dispatcher;
            let events = &mut report.events;

            self.right_bank.evaluate(frame, tilt, |t| {
                dispatcher.dispatch(mode, t)?;
                events.push(GestureEvent::new(Side::Right, t, mode));
                Ok(())
            })?;
            report.tilt = Some(tilt);
        }

        if sample.quit {
            info!("quit requested");
            report.outcome = Outcome::Quit;
        }

        Ok(report)
    }
}
