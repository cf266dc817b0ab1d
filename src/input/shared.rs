//! Process-wide dispatcher instance
//!
//! The engine's input loop owns one dispatcher for its whole life. It is
//! created explicitly with [`init`], looked up with [`shared`] and torn down
//! with [`shutdown`]. The dispatcher is single-threaded, so the slot is
//! per-thread: only the thread that called [`init`] sees the instance.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;

use super::dispatcher::TouchDispatcher;
use super::error::{DispatchError, Result};
use crate::config::TouchConfig;

thread_local! {
    static SHARED: RefCell<Option<Rc<TouchDispatcher>>> = const { RefCell::new(None) };
}

/// Creates the shared dispatcher for this thread
pub fn init(config: &TouchConfig) -> Result<Rc<TouchDispatcher>> {
    SHARED.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(DispatchError::AlreadyInitialized);
        }

        let dispatcher = Rc::new(TouchDispatcher::with_config(config));
        *slot = Some(dispatcher.clone());
        info!(dispatch_events = config.dispatch_events, "Touch dispatcher initialized");
        Ok(dispatcher)
    })
}

/// The shared dispatcher, if [`init`] was called on this thread
pub fn shared() -> Option<Rc<TouchDispatcher>> {
    SHARED.with(|slot| slot.borrow().clone())
}

pub fn is_initialized() -> bool {
    SHARED.with(|slot| slot.borrow().is_some())
}

/// Drops the shared dispatcher, unregistering every delegate
///
/// Returns false if there was nothing to shut down. Handles obtained from
/// [`shared`] stay usable but are no longer reachable through it.
pub fn shutdown() -> bool {
    let Some(dispatcher) = SHARED.with(|slot| slot.borrow_mut().take()) else {
        return false;
    };

    dispatcher.remove_all_delegates();
    info!("Touch dispatcher shut down");
    true
}
