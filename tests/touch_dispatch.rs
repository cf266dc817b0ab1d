//! Integration tests for touch dispatch

use std::cell::RefCell;
use std::rc::Rc;

use touch_dispatch::input::{
    DelegateId, DispatchError, StandardTouchDelegate, TargetedTouchDelegate, Touch, TouchContext,
    TouchDispatcher, TouchEvent, TouchId, TouchPhase, TouchSelectors, TouchSet,
};

type Log = Rc<RefCell<Vec<String>>>;

/// Targeted delegate that claims touches whose id passes `claims`
struct Target {
    name: &'static str,
    claims: fn(TouchId) -> bool,
    log: Log,
}

impl TargetedTouchDelegate for Target {
    fn touch_began(&mut self, touch: &Touch, _: &TouchContext<'_>) -> bool {
        self.log
            .borrow_mut()
            .push(format!("{}:offer:{}", self.name, touch.id.0));
        (self.claims)(touch.id)
    }

    fn touch_changed(&mut self, phase: TouchPhase, touch: &Touch, _: &TouchContext<'_>) {
        self.log
            .borrow_mut()
            .push(format!("{}:{}:{}", self.name, phase, touch.id.0));
    }
}

/// Standard delegate that logs each batch
struct Batch {
    name: &'static str,
    log: Log,
}

impl StandardTouchDelegate for Batch {
    fn touches(&mut self, phase: TouchPhase, touches: &TouchSet, _: &TouchContext<'_>) {
        let ids: Vec<String> = touches.ids().map(|id| id.0.to_string()).collect();
        self.log
            .borrow_mut()
            .push(format!("{}:{}:[{}]", self.name, phase, ids.join(",")));
    }
}

fn claim_all(_: TouchId) -> bool {
    true
}

fn claim_none(_: TouchId) -> bool {
    false
}

fn target(name: &'static str, claims: fn(TouchId) -> bool, log: &Log) -> Rc<RefCell<Target>> {
    Rc::new(RefCell::new(Target {
        name,
        claims,
        log: log.clone(),
    }))
}

fn batch(name: &'static str, log: &Log) -> Rc<RefCell<Batch>> {
    Rc::new(RefCell::new(Batch {
        name,
        log: log.clone(),
    }))
}

fn touches(ids: &[u64]) -> TouchSet {
    ids.iter()
        .map(|&id| Touch::new(id, [id as f32, 0.0]))
        .collect()
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

fn event() -> TouchEvent {
    TouchEvent::default()
}

#[test]
fn test_dispatch_order_follows_priority_then_insertion() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let a = target("a", claim_none, &log);
    let b = target("b", claim_none, &log);
    let c = target("c", claim_none, &log);
    let d = target("d", claim_none, &log);

    dispatcher.add_targeted_delegate(&a, 5, false).unwrap();
    dispatcher.add_targeted_delegate(&b, -1, false).unwrap();
    dispatcher.add_targeted_delegate(&c, 5, false).unwrap();
    dispatcher.add_targeted_delegate(&d, 0, false).unwrap();

    dispatcher.dispatch_began(&touches(&[1]), &event());

    assert_eq!(
        take(&log),
        vec!["b:offer:1", "d:offer:1", "a:offer:1", "c:offer:1"]
    );
    assert_eq!(
        dispatcher
            .debug_handlers()
            .iter()
            .map(|(_, p)| *p)
            .collect::<Vec<_>>(),
        vec![-1, 0, 5, 5]
    );
}

#[test]
fn test_duplicate_registration_fails_in_either_role() {
    struct Both;
    impl TargetedTouchDelegate for Both {
        fn touch_began(&mut self, _: &Touch, _: &TouchContext<'_>) -> bool {
            false
        }
    }
    impl StandardTouchDelegate for Both {
        fn touches(&mut self, _: TouchPhase, _: &TouchSet, _: &TouchContext<'_>) {}
    }

    let dispatcher = TouchDispatcher::new();
    let both = Rc::new(RefCell::new(Both));
    let id = dispatcher.add_targeted_delegate(&both, 3, true).unwrap();

    assert_eq!(
        dispatcher.add_targeted_delegate(&both, 1, false),
        Err(DispatchError::DuplicateDelegate(id))
    );
    assert_eq!(
        dispatcher.add_standard_delegate(&both, 1),
        Err(DispatchError::DuplicateDelegate(id))
    );
    assert_eq!(dispatcher.handler_count(), 1);
    assert_eq!(dispatcher.priority_of(id), Some(3));
}

#[test]
fn test_remove_missing_is_noop_but_set_priority_is_strict() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let registered = target("registered", claim_none, &log);
    let stranger = target("stranger", claim_none, &log);
    dispatcher.add_targeted_delegate(&registered, 0, false).unwrap();

    dispatcher.remove_delegate(DelegateId::of(&stranger));
    dispatcher.remove_delegate(None::<DelegateId>);
    assert_eq!(dispatcher.handler_count(), 1);

    assert_eq!(
        dispatcher.set_priority(4, DelegateId::of(&stranger)),
        Err(DispatchError::DelegateNotFound(DelegateId::of(&stranger)))
    );
}

#[test]
fn test_set_priority_reorders_next_pass() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let a = target("a", claim_none, &log);
    let b = target("b", claim_none, &log);
    let a_id = dispatcher.add_targeted_delegate(&a, 0, false).unwrap();
    dispatcher.add_targeted_delegate(&b, 1, false).unwrap();

    dispatcher.set_priority(2, a_id).unwrap();
    dispatcher.dispatch_began(&touches(&[1]), &event());

    assert_eq!(take(&log), vec!["b:offer:1", "a:offer:1"]);
}

#[test]
fn test_swallowed_touch_stops_at_claimant() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let front = target("front", |id| id == TouchId(1), &log);
    let back = target("back", claim_all, &log);
    let batch = batch("batch", &log);
    dispatcher.add_targeted_delegate(&front, 0, true).unwrap();
    dispatcher.add_targeted_delegate(&back, 1, false).unwrap();
    dispatcher.add_standard_delegate(&batch, -10).unwrap();

    dispatcher.dispatch_began(&touches(&[1, 2]), &event());
    assert_eq!(
        take(&log),
        vec!["front:offer:1", "front:offer:2", "back:offer:2", "batch:began:[2]"]
    );

    dispatcher.dispatch_moved(&touches(&[1, 2]), &event());
    assert_eq!(
        take(&log),
        vec!["front:moved:1", "back:moved:2", "batch:moved:[2]"]
    );
}

#[test]
fn test_unclaimed_touch_never_continues() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let picky = target("picky", claim_none, &log);
    let id = dispatcher.add_targeted_delegate(&picky, 0, false).unwrap();

    dispatcher.dispatch_began(&touches(&[7]), &event());
    dispatcher.dispatch_moved(&touches(&[7]), &event());
    dispatcher.dispatch_ended(&touches(&[7]), &event());

    assert_eq!(take(&log), vec!["picky:offer:7"]);
    assert!(dispatcher.claimed_touches(id).is_empty());
}

#[test]
fn test_claim_ends_with_touch() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let holder = target("holder", claim_all, &log);
    let id = dispatcher.add_targeted_delegate(&holder, 0, true).unwrap();

    dispatcher.dispatch_began(&touches(&[1, 2]), &event());
    assert_eq!(dispatcher.claimed_touches(id), vec![TouchId(1), TouchId(2)]);

    dispatcher.dispatch_ended(&touches(&[1]), &event());
    dispatcher.dispatch_cancelled(&touches(&[2]), &event());
    assert!(dispatcher.claimed_touches(id).is_empty());

    // Touch ids no longer claimed are ignored
    dispatcher.dispatch_moved(&touches(&[1, 2]), &event());
    assert_eq!(
        take(&log),
        vec![
            "holder:offer:1",
            "holder:offer:2",
            "holder:ended:1",
            "holder:cancelled:2"
        ]
    );
}

#[test]
fn test_selectors_gate_delivery() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let holder = target("holder", claim_all, &log);
    let began_only = batch("began_only", &log);
    dispatcher
        .add_targeted_delegate_with(&holder, 0, false, TouchSelectors::ENDED)
        .unwrap();
    dispatcher
        .add_standard_delegate_with(&began_only, 0, TouchSelectors::BEGAN)
        .unwrap();

    dispatcher.dispatch_began(&touches(&[1]), &event());
    dispatcher.dispatch_moved(&touches(&[1]), &event());
    dispatcher.dispatch_ended(&touches(&[1]), &event());

    assert_eq!(
        take(&log),
        vec!["holder:offer:1", "began_only:began:[1]", "holder:ended:1"]
    );
}

/// Registers, unregisters or clears delegates from inside its callback
struct Mutator {
    log: Log,
    add: Option<Rc<RefCell<Target>>>,
    remove: Option<DelegateId>,
    clear: bool,
}

impl StandardTouchDelegate for Mutator {
    fn touches(&mut self, phase: TouchPhase, _: &TouchSet, ctx: &TouchContext<'_>) {
        self.log.borrow_mut().push(format!("mutator:{phase}"));
        let dispatcher = ctx.dispatcher();
        assert!(dispatcher.is_locked());
        let requested = self.add.is_some() || self.remove.is_some() || self.clear;

        if let Some(added) = self.add.take() {
            dispatcher.add_targeted_delegate(&added, -100, false).unwrap();
        }
        dispatcher.remove_delegate(self.remove.take());
        if self.clear {
            dispatcher.remove_all_delegates();
        }
        assert_eq!(dispatcher.has_pending_changes(), requested);
    }
}

#[test]
fn test_changes_during_pass_apply_after_it() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let newcomer = target("newcomer", claim_none, &log);
    let doomed = batch("doomed", &log);
    let doomed_id = dispatcher.add_standard_delegate(&doomed, 10).unwrap();
    let mutator = Rc::new(RefCell::new(Mutator {
        log: log.clone(),
        add: Some(newcomer.clone()),
        remove: Some(doomed_id),
        clear: false,
    }));
    dispatcher.add_standard_delegate(&mutator, 0).unwrap();

    dispatcher.dispatch_began(&touches(&[1]), &event());

    // The current pass is unaffected
    assert_eq!(take(&log), vec!["mutator:began", "doomed:began:[1]"]);
    assert!(!dispatcher.has_pending_changes());
    assert!(!dispatcher.contains(doomed_id));
    assert_eq!(dispatcher.priority_of(DelegateId::of(&newcomer)), Some(-100));

    dispatcher.dispatch_began(&touches(&[2]), &event());
    assert_eq!(take(&log), vec!["newcomer:offer:2", "mutator:began"]);
}

#[test]
fn test_remove_all_during_pass_wins_over_queued_adds() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let newcomer = target("newcomer", claim_none, &log);
    let bystander = batch("bystander", &log);
    dispatcher.add_standard_delegate(&bystander, 5).unwrap();
    let mutator = Rc::new(RefCell::new(Mutator {
        log: log.clone(),
        add: Some(newcomer.clone()),
        remove: None,
        clear: true,
    }));
    dispatcher.add_standard_delegate(&mutator, 0).unwrap();

    dispatcher.dispatch_ended(&touches(&[3]), &event());

    assert_eq!(take(&log), vec!["mutator:ended", "bystander:ended:[3]"]);
    assert_eq!(dispatcher.handler_count(), 0);
    assert!(!dispatcher.contains(DelegateId::of(&newcomer)));
}

#[test]
fn test_disabled_dispatch_is_noop() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let holder = target("holder", claim_all, &log);
    let batch = batch("batch", &log);
    let id = dispatcher.add_targeted_delegate(&holder, 0, false).unwrap();
    dispatcher.add_standard_delegate(&batch, 0).unwrap();

    dispatcher.set_dispatch_events(false);
    for phase in TouchPhase::ALL {
        dispatcher.dispatch(phase, &touches(&[1]), &event());
    }

    assert!(take(&log).is_empty());
    assert!(dispatcher.claimed_touches(id).is_empty());
    assert_eq!(dispatcher.handler_count(), 2);

    dispatcher.set_dispatch_events(true);
    dispatcher.dispatch_began(&touches(&[1]), &event());
    assert_eq!(take(&log), vec!["holder:offer:1", "batch:began:[1]"]);
}

#[test]
fn test_swallowing_front_handler_end_to_end() {
    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let first = target("p0", |id| id == TouchId(1), &log);
    let second = target("p10", claim_all, &log);
    let standard = batch("p5", &log);
    dispatcher.add_targeted_delegate(&first, 0, true).unwrap();
    dispatcher.add_targeted_delegate(&second, 10, false).unwrap();
    dispatcher
        .add_standard_delegate_with(&standard, 5, TouchSelectors::BEGAN)
        .unwrap();

    // Multi-touch: the standard handler gets the batch minus the swallowed touch
    dispatcher.dispatch_began(&touches(&[1, 2]), &event());
    assert_eq!(
        take(&log),
        vec!["p0:offer:1", "p0:offer:2", "p10:offer:2", "p5:began:[2]"]
    );

    // Single touch: nothing is left for the standard phase
    dispatcher.dispatch_began(&touches(&[1]), &event());
    assert_eq!(take(&log), vec!["p0:offer:1"]);
}

#[test]
fn test_nested_dispatch_defers_changes_to_outer_pass() {
    struct Nested {
        id: Option<DelegateId>,
        locked_after_inner: Option<bool>,
    }

    impl StandardTouchDelegate for Nested {
        fn touches(&mut self, phase: TouchPhase, touches: &TouchSet, ctx: &TouchContext<'_>) {
            if phase != TouchPhase::Began {
                return;
            }
            let dispatcher = ctx.dispatcher();
            dispatcher.remove_delegate(self.id);
            dispatcher.dispatch_cancelled(touches, ctx.event());
            self.locked_after_inner = Some(dispatcher.is_locked());
        }
    }

    let log = Log::default();
    let dispatcher = TouchDispatcher::new();
    let holder = target("holder", claim_all, &log);
    let holder_id = dispatcher.add_targeted_delegate(&holder, 0, false).unwrap();
    let nested = Rc::new(RefCell::new(Nested {
        id: None,
        locked_after_inner: None,
    }));
    let nested_id = dispatcher.add_standard_delegate(&nested, 0).unwrap();
    nested.borrow_mut().id = Some(nested_id);

    dispatcher.dispatch_began(&touches(&[1]), &event());

    assert_eq!(take(&log), vec!["holder:offer:1", "holder:cancelled:1"]);
    assert_eq!(nested.borrow().locked_after_inner, Some(true));
    assert!(!dispatcher.is_locked());
    assert!(!dispatcher.contains(nested_id));
    assert!(dispatcher.claimed_touches(holder_id).is_empty());
}
