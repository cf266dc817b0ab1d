//! Delegate capability traits
//!
//! Game objects opt into touch input by implementing one of two traits:
//!
//! - [`TargetedTouchDelegate`] sees one touch at a time and may claim it on
//!   `Began`. Claimed touches keep flowing to the same delegate until they
//!   end or are cancelled.
//! - [`StandardTouchDelegate`] sees the whole batch of touches that no
//!   swallowing targeted delegate took.
//!
//! Delegates are owned by the scene graph as `Rc<RefCell<_>>`; the
//! dispatcher only keeps weak references and identifies a delegate by the
//! address of that shared cell.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::dispatcher::TouchDispatcher;
use super::selectors::TouchSelectors;
use super::touch::{Touch, TouchEvent, TouchPhase, TouchSet};

/// Identity of a registered delegate
///
/// Two ids are equal iff they were taken from the same `Rc` allocation.
/// The registry keeps a `Weak` to every delegate it knows about, so an
/// address cannot be reused while the id is still registered.
///
/// Once a delegate is unregistered and its last `Rc` is dropped, the
/// address may be handed to a later delegate. An id kept past that point
/// is stale: passing it to [`TouchDispatcher::remove_delegate`] or
/// [`TouchDispatcher::set_priority`] may act on the newer delegate. Drop
/// ids together with the delegate they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelegateId(usize);

impl DelegateId {
    /// Identity of a shared delegate
    pub fn of<T: ?Sized>(delegate: &Rc<RefCell<T>>) -> Self {
        Self(Rc::as_ptr(delegate).cast::<()>() as usize)
    }

    pub(crate) fn of_weak<T: ?Sized>(delegate: &Weak<RefCell<T>>) -> Self {
        Self(Weak::as_ptr(delegate).cast::<()>() as usize)
    }
}

impl fmt::Display for DelegateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delegate@{:#x}", self.0)
    }
}

/// What a delegate sees besides the touch itself
pub struct TouchContext<'a> {
    event: &'a TouchEvent,
    dispatcher: &'a TouchDispatcher,
}

impl<'a> TouchContext<'a> {
    pub(crate) fn new(event: &'a TouchEvent, dispatcher: &'a TouchDispatcher) -> Self {
        Self { event, dispatcher }
    }

    /// The event context passed to the dispatch entry point
    pub fn event(&self) -> &'a TouchEvent {
        self.event
    }

    /// The dispatcher running this pass
    ///
    /// Registration changes made through it while the pass is running are
    /// applied once the pass finishes.
    pub fn dispatcher(&self) -> &'a TouchDispatcher {
        self.dispatcher
    }
}

/// Delegate that handles touches one at a time
pub trait TargetedTouchDelegate {
    /// Offered every new touch; return `true` to claim it
    ///
    /// Claimed touches are delivered to [`touch_changed`] until they end.
    /// If the handler swallows touches, a claimed touch is not offered to
    /// any lower-priority delegate.
    ///
    /// [`touch_changed`]: TargetedTouchDelegate::touch_changed
    fn touch_began(&mut self, touch: &Touch, ctx: &TouchContext<'_>) -> bool;

    /// Called for `Moved`, `Ended` and `Cancelled` on a claimed touch
    fn touch_changed(&mut self, _phase: TouchPhase, _touch: &Touch, _ctx: &TouchContext<'_>) {
        // Default: no-op
    }

    /// Phases to deliver when registered without an explicit mask
    fn enabled_selectors(&self) -> TouchSelectors {
        TouchSelectors::all()
    }

    /// Name of this delegate for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Delegate that handles the remaining touch batch
pub trait StandardTouchDelegate {
    /// Called once per pass with every touch no targeted delegate swallowed
    fn touches(&mut self, phase: TouchPhase, touches: &TouchSet, ctx: &TouchContext<'_>);

    /// Phases to deliver when registered without an explicit mask
    fn enabled_selectors(&self) -> TouchSelectors {
        TouchSelectors::all()
    }

    /// Name of this delegate for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
