//! Touch input dispatch
//!
//! Routes touch batches from the platform to game objects registered as
//! touch delegates:
//! - Delegates are ordered by priority (lower value first)
//! - Targeted delegates see one touch at a time and may claim it
//! - Claimed touches can be swallowed so nothing after the claimant sees them
//! - Standard delegates get whatever touches are left, as one batch
//! - Delegates may (un)register delegates from inside their callbacks
//!
//! # Architecture
//!
//! ```text
//! Platform (winit) → TouchCollector → TouchDispatcher::dispatch
//!                                           ↓
//!                                  targeted delegates
//!                                  (per touch, by priority, may swallow)
//!                                           ↓
//!                                  standard delegates
//!                                  (remaining batch, by priority)
//!                                           ↓
//!                                  queued registry changes applied
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let dispatcher = input::shared::init(&config.touch)?;
//! let button = Rc::new(RefCell::new(Button::new()));
//! dispatcher.add_targeted_delegate(&button, 0, true)?;
//!
//! // In window_event()
//! collector.dispatch_window_event(&dispatcher, &event, &TouchEvent::new(frame, elapsed));
//! ```

mod delegate;
mod dispatcher;
mod error;
mod handler;
mod platform;
mod registry;
mod selectors;
pub mod shared;
mod touch;

// Re-export public API
pub use delegate::{DelegateId, StandardTouchDelegate, TargetedTouchDelegate, TouchContext};
pub use dispatcher::TouchDispatcher;
pub use error::{DispatchError, Result};
pub use handler::{
    StandardDelegateRef, StandardHandler, TargetedDelegateRef, TargetedHandler, TouchHandler,
};
pub use platform::TouchCollector;
pub use registry::HandlerRegistry;
pub use selectors::TouchSelectors;
pub use touch::{Touch, TouchEvent, TouchId, TouchPhase, TouchSet};
