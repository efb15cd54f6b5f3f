// src/dispatch.rs
use anyhow::Context;
use tracing::debug;

use crate::gesture::FingerTransition;
use crate::mode::Mode;
use crate::plugins::{Registry, Slot};

/// Routes right-hand transitions to the callback of the current mode.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Invokes `registry[mode][slot]` synchronously. Errors from the callback
    /// are returned as-is with the slot attached.
    pub fn dispatch(&mut self, mode: Mode, transition: FingerTransition) -> anyhow::Result<()> {
        let slot = Slot::from(transition);
        let module = self.registry.module_mut(mode);
        debug!("mode {} ({}): {}", mode, module.name(), slot);
        module
            .invoke(slot)
            .with_context(|| format!("{} failed in {}", slot, module.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Finger, Transition};
    use crate::mode::MODE_COUNT;
    use crate::plugins::CommandModule;
    use crate::tilt::TiltContext;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_registry(log: &Rc<RefCell<Vec<(usize, String)>>>) -> Registry {
        let modules = std::array::from_fn(|mode| {
            Slot::all().fold(CommandModule::empty(format!("Module{}", mode)), |module, slot| {
                let log = log.clone();
                module.with(slot, move || {
                    log.borrow_mut().push((mode, slot.name()));
                    Ok(())
                })
            })
        });
        Registry::new(modules)
    }

    #[test]
    fn test_routes_to_current_mode_only() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(recording_registry(&log));

        dispatcher
            .dispatch(
                Mode::new(3).unwrap(),
                FingerTransition {
                    finger: Finger::Index,
                    tilt: TiltContext::None,
                    transition: Transition::Activated,
                },
            )
            .unwrap();

        assert_eq!(*log.borrow(), vec![(3, "r1_activated_without_tilt".to_string())]);
    }

    #[test]
    fn test_callback_error_carries_slot() {
        let slot = Slot::parse("r0_deactivated_tilted_left").unwrap();
        let mut modules: [CommandModule; MODE_COUNT] = std::array::from_fn(|i| CommandModule::empty(format!("Module{}", i)));
        modules[0] = CommandModule::empty("Module0").with(slot, || anyhow::bail!("device gone"));
        let mut dispatcher = Dispatcher::new(Registry::new(modules));

        let err = dispatcher
            .dispatch(
                Mode::default(),
                FingerTransition {
                    finger: Finger::Thumb,
                    tilt: TiltContext::Left,
                    transition: Transition::Deactivated,
                },
            )
            .unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("r0_deactivated_tilted_left"));
        assert!(chain.contains("device gone"));
    }
}
