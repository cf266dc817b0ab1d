//! Touch routing to targeted and standard delegates

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, error, trace, warn};

use super::delegate::{DelegateId, StandardTouchDelegate, TargetedTouchDelegate, TouchContext};
use super::error::{DispatchError, Result};
use super::handler::{StandardHandler, TargetedHandler, TouchHandler};
use super::registry::HandlerRegistry;
use super::selectors::TouchSelectors;
use super::touch::{Touch, TouchEvent, TouchId, TouchPhase, TouchSet};
use crate::config::TouchConfig;

/// Registry changes requested while a pass was running
#[derive(Default)]
struct PendingChanges {
    add: Vec<TouchHandler>,
    remove: Vec<DelegateId>,
    clear: bool,
}

impl PendingChanges {
    fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && !self.clear
    }

    fn is_adding(&self, id: DelegateId) -> bool {
        self.add.iter().any(|h| h.delegate_id() == id)
    }

    fn is_removing(&self, id: DelegateId) -> bool {
        self.remove.contains(&id)
    }
}

/// Routes touch batches to registered delegates
///
/// Touches are first offered one by one to targeted delegates in priority
/// order (lower priority value first). A targeted delegate that claims a
/// touch keeps receiving it until it ends, and if it swallows touches the
/// touch goes no further. Whatever is left is then handed as one batch to
/// each standard delegate.
///
/// Delegates may register or unregister delegates from inside their
/// callbacks. Such changes are queued and applied when the pass ends, in
/// the order removals, additions, then remove-all.
pub struct TouchDispatcher {
    registry: RefCell<HandlerRegistry>,
    pending: RefCell<PendingChanges>,
    /// True while a dispatch pass is running
    locked: Cell<bool>,
    dispatch_events: Cell<bool>,
}

/// Holds the dispatcher locked for one pass
///
/// Dropping the outermost guard unlocks the dispatcher and applies queued
/// registry changes, also when a delegate callback panics.
struct PassGuard<'a> {
    dispatcher: &'a TouchDispatcher,
    outermost: bool,
}

impl<'a> PassGuard<'a> {
    fn lock(dispatcher: &'a TouchDispatcher) -> Self {
        let outermost = !dispatcher.locked.replace(true);
        Self {
            dispatcher,
            outermost,
        }
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if self.outermost {
            self.dispatcher.locked.set(false);
            self.dispatcher.apply_pending();
        }
    }
}

impl TouchDispatcher {
    /// Creates a dispatcher with no delegates and dispatch enabled
    pub fn new() -> Self {
        Self {
            registry: RefCell::new(HandlerRegistry::new()),
            pending: RefCell::new(PendingChanges::default()),
            locked: Cell::new(false),
            dispatch_events: Cell::new(true),
        }
    }

    /// Creates a dispatcher from configuration
    pub fn with_config(config: &TouchConfig) -> Self {
        let dispatcher = Self::new();
        dispatcher.set_dispatch_events(config.dispatch_events);
        dispatcher
    }

    /// Whether the dispatch entry points deliver anything
    pub fn dispatch_events(&self) -> bool {
        self.dispatch_events.get()
    }

    /// Enables or disables delivery without touching registrations
    pub fn set_dispatch_events(&self, enabled: bool) {
        self.dispatch_events.set(enabled);
    }

    /// Whether a dispatch pass is currently running
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    //
    // handler management
    //

    /// Registers a standard delegate using its own selector mask
    ///
    /// Fails with [`DispatchError::DelegateBusy`] if the delegate is borrowed
    /// and not already registered; use [`Self::add_standard_delegate_with`].
    pub fn add_standard_delegate<D>(
        &self,
        delegate: &Rc<RefCell<D>>,
        priority: i32,
    ) -> Result<DelegateId>
    where
        D: StandardTouchDelegate + 'static,
    {
        let declared = delegate.try_borrow().ok().map(|d| d.enabled_selectors());
        let selectors = self.resolve_selectors(DelegateId::of(delegate), declared)?;
        self.add_standard_delegate_with(delegate, priority, selectors)
    }

    /// Registers a standard delegate for the phases in `selectors`
    pub fn add_standard_delegate_with<D>(
        &self,
        delegate: &Rc<RefCell<D>>,
        priority: i32,
        selectors: TouchSelectors,
    ) -> Result<DelegateId>
    where
        D: StandardTouchDelegate + 'static,
    {
        self.add_handler(TouchHandler::standard(delegate, priority, selectors))
    }

    /// Registers a targeted delegate using its own selector mask
    ///
    /// Fails like [`Self::add_standard_delegate`] for a busy delegate. With `swallows_touches`, touches the delegate claims are not offered
    /// to lower-priority targeted delegates nor passed to standard ones.
    pub fn add_targeted_delegate<D>(
        &self,
        delegate: &Rc<RefCell<D>>,
        priority: i32,
        swallows_touches: bool,
    ) -> Result<DelegateId>
    where
        D: TargetedTouchDelegate + 'static,
    {
        let declared = delegate.try_borrow().ok().map(|d| d.enabled_selectors());
        let selectors = self.resolve_selectors(DelegateId::of(delegate), declared)?;
        self.add_targeted_delegate_with(delegate, priority, swallows_touches, selectors)
    }

    /// Registers a targeted delegate for the phases in `selectors`
    ///
    /// The claim offer on `Began` is made regardless of the mask; the mask
    /// only gates delivery of `Moved`, `Ended` and `Cancelled`.
    pub fn add_targeted_delegate_with<D>(
        &self,
        delegate: &Rc<RefCell<D>>,
        priority: i32,
        swallows_touches: bool,
        selectors: TouchSelectors,
    ) -> Result<DelegateId>
    where
        D: TargetedTouchDelegate + 'static,
    {
        self.add_handler(TouchHandler::targeted(
            delegate,
            priority,
            swallows_touches,
            selectors,
        ))
    }

    /// Selector mask for a delegate registered without an explicit one
    ///
    /// A delegate registering itself from its own callback cannot be
    /// borrowed; it keeps the mask it is already registered with.
    fn resolve_selectors(
        &self,
        id: DelegateId,
        declared: Option<TouchSelectors>,
    ) -> Result<TouchSelectors> {
        if let Some(selectors) = declared {
            return Ok(selectors);
        }

        let registered = self
            .registry
            .borrow()
            .get(id)
            .map(TouchHandler::enabled_selectors);
        let known = registered.or_else(|| {
            self.pending
                .borrow()
                .add
                .iter()
                .find(|h| h.delegate_id() == id)
                .map(TouchHandler::enabled_selectors)
        });

        known.ok_or_else(|| {
            warn!(delegate = %id, "Touch delegate busy, selector mask unknown");
            DispatchError::DelegateBusy(id)
        })
    }

    fn add_handler(&self, handler: TouchHandler) -> Result<DelegateId> {
        let id = handler.delegate_id();

        if !self.locked.get() {
            let name = handler.name().to_string();
            let priority = handler.priority();
            let targeted = handler.is_targeted();
            let index = self.registry.borrow_mut().insert(handler)?;
            debug!(delegate = %id, %name, priority, targeted, index, "Added touch delegate");
            return Ok(id);
        }

        let mut pending = self.pending.borrow_mut();
        let registered = self.registry.borrow().contains(id) && !pending.is_removing(id);
        if registered || pending.is_adding(id) {
            return Err(DispatchError::DuplicateDelegate(id));
        }

        debug!(delegate = %id, name = handler.name(), "Queued touch delegate until pass ends");
        pending.add.push(handler);
        Ok(id)
    }

    /// Unregisters a delegate
    ///
    /// `None` and unknown delegates are ignored.
    pub fn remove_delegate(&self, delegate: impl Into<Option<DelegateId>>) {
        let Some(id) = delegate.into() else {
            return;
        };

        if self.locked.get() {
            let mut pending = self.pending.borrow_mut();
            if !pending.is_removing(id) {
                pending.remove.push(id);
            }
            debug!(delegate = %id, "Queued touch delegate removal until pass ends");
            return;
        }

        if let Some(handler) = self.registry.borrow_mut().remove(id) {
            debug!(delegate = %id, name = handler.name(), "Removed touch delegate");
        }
    }

    /// Unregisters every delegate
    ///
    /// Requested during a pass, this also discards delegates added in that
    /// same pass.
    pub fn remove_all_delegates(&self) {
        if self.locked.get() {
            self.pending.borrow_mut().clear = true;
            debug!("Queued removal of all touch delegates until pass ends");
            return;
        }

        self.registry.borrow_mut().clear();
        debug!("Removed all touch delegates");
    }

    /// Changes the priority of a registered delegate
    ///
    /// Fails while a pass is running, since reordering would change the
    /// order of the pass in progress.
    pub fn set_priority(&self, priority: i32, delegate: DelegateId) -> Result<()> {
        if self.locked.get() {
            return Err(DispatchError::DispatchInProgress);
        }

        self.registry.borrow_mut().set_priority(delegate, priority)?;
        debug!(delegate = %delegate, priority, "Changed touch delegate priority");
        Ok(())
    }

    //
    // inspection
    //

    /// Number of registered delegates (queued changes not included)
    pub fn handler_count(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn contains(&self, delegate: DelegateId) -> bool {
        self.registry.borrow().contains(delegate)
    }

    pub fn priority_of(&self, delegate: DelegateId) -> Option<i32> {
        self.registry.borrow().get(delegate).map(|h| h.priority())
    }

    /// Touches currently claimed by a targeted delegate
    pub fn claimed_touches(&self, delegate: DelegateId) -> Vec<TouchId> {
        self.registry
            .borrow()
            .get(delegate)
            .and_then(|h| h.as_targeted().map(|targeted| targeted.claimed_touches()))
            .unwrap_or_default()
    }

    /// Registered delegates in dispatch order
    pub fn delegates(&self) -> Vec<DelegateId> {
        self.registry.borrow().iter().map(|h| h.delegate_id()).collect()
    }

    /// Whether registry changes are waiting for the current pass to end
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// Get debug information about all handlers
    pub fn debug_handlers(&self) -> Vec<(String, i32)> {
        self.registry
            .borrow()
            .iter()
            .map(|h| (h.name().to_string(), h.priority()))
            .collect()
    }

    //
    // dispatch events
    //

    pub fn dispatch_began(&self, touches: &TouchSet, event: &TouchEvent) {
        self.dispatch(TouchPhase::Began, touches, event);
    }

    pub fn dispatch_moved(&self, touches: &TouchSet, event: &TouchEvent) {
        self.dispatch(TouchPhase::Moved, touches, event);
    }

    pub fn dispatch_ended(&self, touches: &TouchSet, event: &TouchEvent) {
        self.dispatch(TouchPhase::Ended, touches, event);
    }

    pub fn dispatch_cancelled(&self, touches: &TouchSet, event: &TouchEvent) {
        self.dispatch(TouchPhase::Cancelled, touches, event);
    }

    /// Runs one dispatch pass for `phase`
    ///
    /// Does nothing while dispatch is disabled.
    pub fn dispatch(&self, phase: TouchPhase, touches: &TouchSet, event: &TouchEvent) {
        if !self.dispatch_events.get() {
            return;
        }

        // Declared before the registry borrow so it is dropped after it.
        let _pass = PassGuard::lock(self);
        let registry = self.registry.borrow();
        self.run_pass(&registry, phase, touches, event);
    }

    fn run_pass(
        &self,
        registry: &HandlerRegistry,
        phase: TouchPhase,
        touches: &TouchSet,
        event: &TouchEvent,
    ) {
        let has_targeted = registry.targeted().next().is_some();
        let has_standard = registry.standard().next().is_some();
        trace!(
            %phase,
            touches = touches.len(),
            handlers = registry.len(),
            "Dispatching touches"
        );

        let ctx = TouchContext::new(event, self);

        // Only copy the batch when swallowed touches must be hidden from a
        // standard phase that will actually run.
        let mut remaining = if has_targeted && has_standard {
            Cow::Owned(touches.clone())
        } else {
            Cow::Borrowed(touches)
        };

        if has_targeted {
            for touch in touches {
                for (handler, targeted) in registry.targeted() {
                    let claimed = match phase {
                        TouchPhase::Began => {
                            let claimed = self.offer_touch(handler, targeted, touch, &ctx);
                            if claimed {
                                targeted.claim(touch.id);
                            }
                            claimed
                        }
                        _ if targeted.has_claimed(touch.id) => {
                            if handler.handles(phase) {
                                self.deliver_touch(handler, targeted, phase, touch, &ctx);
                            }
                            if phase.is_terminal() {
                                targeted.release(touch.id);
                            }
                            true
                        }
                        _ => false,
                    };

                    if claimed && targeted.swallows_touches() {
                        trace!(touch = %touch.id, delegate = %handler.delegate_id(), "Touch swallowed");
                        if let Cow::Owned(set) = &mut remaining {
                            set.remove(touch.id);
                        }
                        break;
                    }
                }
            }
        }

        if has_standard && !remaining.is_empty() {
            for (handler, standard) in registry.standard() {
                if handler.handles(phase) {
                    self.deliver_touches(handler, standard, phase, &remaining, &ctx);
                }
            }
        }
    }

    /// Offers a new touch to a targeted delegate, returning whether it claimed it
    fn offer_touch(
        &self,
        handler: &TouchHandler,
        targeted: &TargetedHandler,
        touch: &Touch,
        ctx: &TouchContext<'_>,
    ) -> bool {
        let Some(delegate) = targeted.delegate() else {
            self.prune(handler);
            return false;
        };

        match delegate.try_borrow_mut() {
            Ok(mut delegate) => delegate.touch_began(touch, ctx),
            Err(_) => {
                warn!(
                    delegate = %handler.delegate_id(),
                    name = handler.name(),
                    touch = %touch.id,
                    "Touch delegate busy, skipping claim offer"
                );
                false
            }
        }
    }

    fn deliver_touch(
        &self,
        handler: &TouchHandler,
        targeted: &TargetedHandler,
        phase: TouchPhase,
        touch: &Touch,
        ctx: &TouchContext<'_>,
    ) {
        let Some(delegate) = targeted.delegate() else {
            self.prune(handler);
            return;
        };

        match delegate.try_borrow_mut() {
            Ok(mut delegate) => delegate.touch_changed(phase, touch, ctx),
            Err(_) => warn!(
                delegate = %handler.delegate_id(),
                name = handler.name(),
                touch = %touch.id,
                %phase,
                "Touch delegate busy, skipping touch"
            ),
        }
    }

    fn deliver_touches(
        &self,
        handler: &TouchHandler,
        standard: &StandardHandler,
        phase: TouchPhase,
        touches: &TouchSet,
        ctx: &TouchContext<'_>,
    ) {
        let Some(delegate) = standard.delegate() else {
            self.prune(handler);
            return;
        };

        match delegate.try_borrow_mut() {
            Ok(mut delegate) => delegate.touches(phase, touches, ctx),
            Err(_) => warn!(
                delegate = %handler.delegate_id(),
                name = handler.name(),
                %phase,
                "Touch delegate busy, skipping batch"
            ),
        }
    }

    /// Queues removal of a handler whose delegate was dropped
    fn prune(&self, handler: &TouchHandler) {
        let id = handler.delegate_id();
        let mut pending = self.pending.borrow_mut();
        if !pending.is_removing(id) {
            debug!(delegate = %id, name = handler.name(), "Touch delegate dropped, removing");
            pending.remove.push(id);
        }
    }

    fn apply_pending(&self) {
        if self.pending.borrow().is_empty() {
            return;
        }

        let Ok(mut registry) = self.registry.try_borrow_mut() else {
            // Still borrowed by an unwinding pass; keep the changes for the
            // next pass.
            error!("Touch registry busy, deferring queued delegate changes");
            return;
        };
        let pending = self.pending.take();

        for id in pending.remove {
            if let Some(handler) = registry.remove(id) {
                debug!(delegate = %id, name = handler.name(), "Removed touch delegate");
            }
        }

        for handler in pending.add {
            let id = handler.delegate_id();
            let name = handler.name().to_string();
            match registry.insert(handler) {
                Ok(index) => debug!(delegate = %id, %name, index, "Added touch delegate"),
                Err(err) => error!(%err, %name, "Dropping queued touch delegate"),
            }
        }

        if pending.clear {
            registry.clear();
            debug!("Removed all touch delegates");
        }
    }
}

impl Default for TouchDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TouchDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self.pending.try_borrow().map(|p| !p.is_empty()).ok();
        f.debug_struct("TouchDispatcher")
            .field("registry", &self.registry)
            .field("locked", &self.locked.get())
            .field("dispatch_events", &self.dispatch_events.get())
            .field("has_pending_changes", &pending)
            .finish()
    }
}
