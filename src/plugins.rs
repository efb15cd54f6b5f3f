// src/plugins.rs - Command modules: 30 callback slots per mode
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::process::Command;

use anyhow::Context;
use once_cell::sync::Lazy;
use tracing::{debug, info, trace};

use crate::error::{GestureError, Result};
use crate::gesture::{Finger, FingerTransition, Transition, FINGER_COUNT};
use crate::mode::{Mode, MODE_COUNT};
use crate::tilt::TiltContext;

pub const SLOT_COUNT: usize = FINGER_COUNT * 3 * 2;

/// One right-hand callback position: finger, tilt context and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub finger: Finger,
    pub tilt: TiltContext,
    pub transition: Transition,
}

static SLOTS_BY_NAME: Lazy<HashMap<String, Slot>> =
    Lazy::new(|| Slot::all().map(|slot| (slot.name(), slot)).collect());

impl Slot {
    pub fn new(finger: Finger, tilt: TiltContext, transition: Transition) -> Self {
        Self {
            finger,
            tilt,
            transition,
        }
    }

    pub fn all() -> impl Iterator<Item = Slot> {
        Finger::ALL.into_iter().flat_map(|finger| {
            TiltContext::ALL.into_iter().flat_map(move |tilt| {
                Transition::ALL
                    .into_iter()
                    .map(move |transition| Slot::new(finger, tilt, transition))
            })
        })
    }

    /// Looks a slot up by its canonical name, e.g. `r1_activated_without_tilt`.
    pub fn parse(name: &str) -> Result<Self> {
        SLOTS_BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| GestureError::UnknownSlot(name.to_string()))
    }

    pub fn name(&self) -> String {
        format!(
            "r{}_{}_{}",
            self.finger.index(),
            self.transition.as_str(),
            self.tilt.slot_suffix()
        )
    }

    pub fn describe(&self) -> String {
        format!(
            "r{} {} and {}",
            self.finger.index(),
            self.transition.as_str(),
            self.tilt.describe()
        )
    }

    fn index(&self) -> usize {
        (self.finger.index() * TiltContext::ALL.len() + self.tilt.index()) * Transition::ALL.len()
            + self.transition.index()
    }
}

impl From<FingerTransition> for Slot {
    fn from(t: FingerTransition) -> Self {
        Slot::new(t.finger, t.tilt, t.transition)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

pub type Callback = Box<dyn FnMut() -> anyhow::Result<()>>;

/// The callbacks one mode exposes. Unbound slots do nothing.
pub struct CommandModule {
    name: String,
    slots: Vec<Option<Callback>>,
}

impl fmt::Debug for CommandModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound: Vec<String> = Slot::all()
            .filter(|slot| self.is_bound(*slot))
            .map(|slot| slot.name())
            .collect();
        f.debug_struct("CommandModule")
            .field("name", &self.name)
            .field("bound", &bound)
            .finish()
    }
}

impl CommandModule {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: (0..SLOT_COUNT).map(|_| None).collect(),
        }
    }

    /// Every slot announces itself in the log and does nothing else.
    pub fn template(name: impl Into<String>) -> Self {
        let mut module = Self::empty(name);
        for slot in Slot::all() {
            let line = slot.describe();
            module = module.with(slot, move || {
                info!("{}", line);
                Ok(())
            });
        }
        module
    }

    /// Binds slot names to shell command lines.
    pub fn from_commands(
        name: impl Into<String>,
        bindings: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut module = Self::empty(name);
        for (slot_name, command) in bindings {
            let slot = Slot::parse(slot_name)?;
            let command = command.clone();
            module = module.with(slot, move || run_shell(slot, &command));
        }
        Ok(module)
    }

    pub fn with<F>(mut self, slot: Slot, callback: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.slots[slot.index()] = Some(Box::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bound(&self, slot: Slot) -> bool {
        self.slots[slot.index()].is_some()
    }

    pub fn invoke(&mut self, slot: Slot) -> anyhow::Result<()> {
        match self.slots[slot.index()].as_mut() {
            Some(callback) => callback(),
            None => {
                trace!("{}: {} is unbound", self.name, slot);
                Ok(())
            }
        }
    }
}

fn run_shell(slot: Slot, command: &str) -> anyhow::Result<()> {
    debug!("{}: running `{}`", slot, command);

    #[cfg(windows)]
    let status = Command::new("cmd").args(["/C", command]).status();
    #[cfg(not(windows))]
    let status = Command::new("sh").args(["-c", command]).status();

    let status = status.with_context(|| format!("Failed to start `{}`", command))?;
    if !status.success() {
        return Err(GestureError::CommandFailed {
            slot: slot.name(),
            command: command.to_string(),
            status: status.to_string(),
        }
        .into());
    }
    Ok(())
}

/// One command module per mode, fixed at startup.
#[derive(Debug)]
pub struct Registry {
    modules: [CommandModule; MODE_COUNT],
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(std::array::from_fn(|i| CommandModule::template(format!("Module{}", i))))
    }
}

impl Registry {
    pub fn new(modules: [CommandModule; MODE_COUNT]) -> Self {
        Self { modules }
    }

    /// Fills modes from `modules` in order; missing modes get the template.
    pub fn from_modules(modules: Vec<CommandModule>) -> Result<Self> {
        if modules.len() > MODE_COUNT {
            return Err(GestureError::TooManyModes(modules.len()));
        }

        let mut given = modules.into_iter();
        let modules = std::array::from_fn(|i| {
            given
                .next()
                .unwrap_or_else(|| CommandModule::template(format!("Module{}", i)))
        });
        Ok(Self::new(modules))
    }

    pub fn module(&self, mode: Mode) -> &CommandModule {
        &self.modules[mode.index()]
    }

    pub fn module_mut(&mut self, mode: Mode) -> &mut CommandModule {
        &mut self.modules[mode.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_thirty_distinct_slots() {
        let names: std::collections::HashSet<String> = Slot::all().map(|s| s.name()).collect();
        assert_eq!(names.len(), SLOT_COUNT);
        let indices: std::collections::HashSet<usize> = Slot::all().map(|s| s.index()).collect();
        assert_eq!(indices.len(), SLOT_COUNT);
        assert!(indices.iter().all(|i| *i < SLOT_COUNT));
    }

    #[test]
    fn test_slot_names() {
        let slot = Slot::new(Finger::Thumb, TiltContext::Right, Transition::Activated);
        assert_eq!(slot.name(), "r0_activated_tilted_right");
        assert_eq!(slot.describe(), "r0 activated and hand tilted right");
        assert_eq!(Slot::parse("r0_activated_tilted_right").unwrap(), slot);

        let slot = Slot::parse("r4_deactivated_without_tilt").unwrap();
        assert_eq!(slot.finger, Finger::Pinky);
        assert_eq!(slot.tilt, TiltContext::None);
        assert_eq!(slot.transition, Transition::Deactivated);

        assert!(matches!(
            Slot::parse("r5_activated_without_tilt"),
            Err(GestureError::UnknownSlot(_))
        ));
    }

    #[test]
    fn test_unbound_slot_is_noop() {
        let mut module = CommandModule::empty("quiet");
        let slot = Slot::parse("r2_activated_tilted_left").unwrap();
        assert!(!module.is_bound(slot));
        assert!(module.invoke(slot).is_ok());
    }

    #[test]
    fn test_bound_slot_runs_only_its_callback() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let hit = Slot::parse("r1_activated_without_tilt").unwrap();
        let other = Slot::parse("r1_deactivated_without_tilt").unwrap();

        let log = calls.clone();
        let mut module = CommandModule::empty("m").with(hit, move || {
            log.borrow_mut().push("hit");
            Ok(())
        });

        module.invoke(other).unwrap();
        module.invoke(hit).unwrap();
        module.invoke(hit).unwrap();
        assert_eq!(*calls.borrow(), vec!["hit", "hit"]);
    }

    #[test]
    fn test_template_binds_everything() {
        let module = CommandModule::template("Module0");
        assert!(Slot::all().all(|slot| module.is_bound(slot)));
    }

    #[test]
    fn test_commands_reject_unknown_slot() {
        let mut bindings = BTreeMap::new();
        bindings.insert("r1_pressed_without_tilt".to_string(), "true".to_string());
        let err = CommandModule::from_commands("bad", &bindings).unwrap_err();
        assert!(matches!(err, GestureError::UnknownSlot(name) if name == "r1_pressed_without_tilt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exit_status() {
        let mut bindings = BTreeMap::new();
        bindings.insert("r1_activated_without_tilt".to_string(), "true".to_string());
        bindings.insert("r1_deactivated_without_tilt".to_string(), "exit 3".to_string());
        let mut module = CommandModule::from_commands("shell", &bindings).unwrap();

        assert!(module.invoke(Slot::parse("r1_activated_without_tilt").unwrap()).is_ok());
        let err = module
            .invoke(Slot::parse("r1_deactivated_without_tilt").unwrap())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GestureError>(),
            Some(GestureError::CommandFailed { .. })
        ));
    }

    #[test]
    fn test_registry_fills_missing_modes() {
        let registry = Registry::from_modules(vec![CommandModule::empty("custom")]).unwrap();
        assert_eq!(registry.module(Mode::new(0).unwrap()).name(), "custom");
        assert_eq!(registry.module(Mode::new(4).unwrap()).name(), "Module4");

        let too_many = (0..6).map(|i| CommandModule::empty(format!("m{}", i))).collect();
        assert!(matches!(
            Registry::from_modules(too_many),
            Err(GestureError::TooManyModes(6))
        ));
    }
}
