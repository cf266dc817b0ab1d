//! Handler records kept by the registry

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use super::delegate::{DelegateId, StandardTouchDelegate, TargetedTouchDelegate};
use super::selectors::TouchSelectors;
use super::touch::{TouchId, TouchPhase};

/// Shared handle to a targeted delegate
pub type TargetedDelegateRef = Rc<RefCell<dyn TargetedTouchDelegate>>;

/// Shared handle to a standard delegate
pub type StandardDelegateRef = Rc<RefCell<dyn StandardTouchDelegate>>;

/// Registration of one delegate with the dispatcher
pub struct TouchHandler {
    delegate_id: DelegateId,
    /// Delegate name captured at registration, kept for logs after the
    /// delegate itself is gone
    name: String,
    priority: i32,
    enabled_selectors: TouchSelectors,
    kind: HandlerKind,
}

/// Targeted or standard handling
enum HandlerKind {
    Targeted(TargetedHandler),
    Standard(StandardHandler),
}

/// Targeted-only state: swallow flag and claimed touches
pub struct TargetedHandler {
    delegate: Weak<RefCell<dyn TargetedTouchDelegate>>,
    swallows_touches: bool,
    claimed_touches: RefCell<BTreeSet<TouchId>>,
}

pub struct StandardHandler {
    delegate: Weak<RefCell<dyn StandardTouchDelegate>>,
}

impl TouchHandler {
    /// Creates a targeted handler record for `delegate`
    pub fn targeted<D>(
        delegate: &Rc<RefCell<D>>,
        priority: i32,
        swallows_touches: bool,
        enabled_selectors: TouchSelectors,
    ) -> Self
    where
        D: TargetedTouchDelegate + 'static,
    {
        let name = delegate
            .try_borrow()
            .map(|d| d.name().to_string())
            .unwrap_or_else(|_| std::any::type_name::<D>().to_string());
        let erased: TargetedDelegateRef = delegate.clone();
        let weak = Rc::downgrade(&erased);

        Self {
            delegate_id: DelegateId::of_weak(&weak),
            name,
            priority,
            enabled_selectors,
            kind: HandlerKind::Targeted(TargetedHandler {
                delegate: weak,
                swallows_touches,
                claimed_touches: RefCell::new(BTreeSet::new()),
            }),
        }
    }

    /// Creates a standard handler record for `delegate`
    pub fn standard<D>(
        delegate: &Rc<RefCell<D>>,
        priority: i32,
        enabled_selectors: TouchSelectors,
    ) -> Self
    where
        D: StandardTouchDelegate + 'static,
    {
        let name = delegate
            .try_borrow()
            .map(|d| d.name().to_string())
            .unwrap_or_else(|_| std::any::type_name::<D>().to_string());
        let erased: StandardDelegateRef = delegate.clone();
        let weak = Rc::downgrade(&erased);

        Self {
            delegate_id: DelegateId::of_weak(&weak),
            name,
            priority,
            enabled_selectors,
            kind: HandlerKind::Standard(StandardHandler {
                delegate: weak,
            }),
        }
    }

    pub fn delegate_id(&self) -> DelegateId {
        self.delegate_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch priority (lower runs first)
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn enabled_selectors(&self) -> TouchSelectors {
        self.enabled_selectors
    }

    /// Whether this handler wants `phase` delivered
    pub fn handles(&self, phase: TouchPhase) -> bool {
        self.enabled_selectors.handles(phase)
    }

    pub fn is_targeted(&self) -> bool {
        matches!(self.kind, HandlerKind::Targeted(_))
    }

    pub fn as_targeted(&self) -> Option<&TargetedHandler> {
        match &self.kind {
            HandlerKind::Targeted(targeted) => Some(targeted),
            HandlerKind::Standard(_) => None,
        }
    }

    pub fn as_standard(&self) -> Option<&StandardHandler> {
        match &self.kind {
            HandlerKind::Standard(standard) => Some(standard),
            HandlerKind::Targeted(_) => None,
        }
    }
}

impl std::fmt::Debug for TouchHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("TouchHandler");
        s.field("delegate", &self.delegate_id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("enabled_selectors", &self.enabled_selectors);
        match &self.kind {
            HandlerKind::Targeted(targeted) => s
                .field("swallows_touches", &targeted.swallows_touches)
                .field("claimed_touches", &targeted.claimed_touches.borrow())
                .finish(),
            HandlerKind::Standard(_) => s.finish(),
        }
    }
}

impl TargetedHandler {
    /// Upgrades the weak delegate reference
    pub fn delegate(&self) -> Option<TargetedDelegateRef> {
        self.delegate.upgrade()
    }

    pub fn swallows_touches(&self) -> bool {
        self.swallows_touches
    }

    /// Records a claim on `id`
    pub(crate) fn claim(&self, id: TouchId) {
        self.claimed_touches.borrow_mut().insert(id);
    }

    /// Drops the claim on `id`, returning whether there was one
    pub(crate) fn release(&self, id: TouchId) -> bool {
        self.claimed_touches.borrow_mut().remove(&id)
    }

    pub fn has_claimed(&self, id: TouchId) -> bool {
        self.claimed_touches.borrow().contains(&id)
    }

    /// Claimed touch ids in ascending order
    pub fn claimed_touches(&self) -> Vec<TouchId> {
        self.claimed_touches.borrow().iter().copied().collect()
    }
}

impl StandardHandler {
    /// Upgrades the weak delegate reference
    pub fn delegate(&self) -> Option<StandardDelegateRef> {
        self.delegate.upgrade()
    }
}
