//! Touch records and touch batches

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;

/// Stable identifier of a finger for the lifetime of one touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TouchId(pub u64);

impl fmt::Display for TouchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "touch#{}", self.0)
    }
}

/// Phase of a touch event, one per dispatch entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

impl TouchPhase {
    /// All phases in lifecycle order
    pub const ALL: [TouchPhase; 4] = [
        TouchPhase::Began,
        TouchPhase::Moved,
        TouchPhase::Ended,
        TouchPhase::Cancelled,
    ];

    /// Whether this phase ends the touch (and with it any claim on it)
    pub fn is_terminal(self) -> bool {
        matches!(self, TouchPhase::Ended | TouchPhase::Cancelled)
    }

    /// Lowercase name, used in log fields
    pub fn as_str(self) -> &'static str {
        match self {
            TouchPhase::Began => "began",
            TouchPhase::Moved => "moved",
            TouchPhase::Ended => "ended",
            TouchPhase::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TouchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single touch as reported by the platform
///
/// Positions are in logical pixels. The dispatcher never looks at them;
/// they are carried through for the delegates.
#[derive(Debug, Clone, PartialEq)]
pub struct Touch {
    pub id: TouchId,
    /// Current position
    pub location: [f32; 2],
    /// Position reported with the previous event for this touch
    pub previous_location: [f32; 2],
    /// Normalized pressure, if the device reports it
    pub force: Option<f32>,
}

impl Touch {
    /// Creates a touch that has not moved yet
    pub fn new(id: u64, location: [f32; 2]) -> Self {
        Self {
            id: TouchId(id),
            location,
            previous_location: location,
            force: None,
        }
    }

    /// Returns this touch moved to `location`, remembering where it was
    pub fn moved_to(&self, location: [f32; 2]) -> Self {
        Self {
            id: self.id,
            location,
            previous_location: self.location,
            force: self.force,
        }
    }

    /// Builder method to set the normalized force
    pub fn with_force(mut self, force: f32) -> Self {
        self.force = Some(force);
        self
    }

    /// Movement since the previous event
    pub fn delta(&self) -> [f32; 2] {
        [
            self.location[0] - self.previous_location[0],
            self.location[1] - self.previous_location[1],
        ]
    }
}

/// Ordered set of touches keyed by [`TouchId`]
///
/// Keeps the platform's ordering; inserting a touch whose id is already
/// present replaces the earlier record in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchSet {
    touches: IndexMap<TouchId, Touch>,
}

impl TouchSet {
    /// Creates an empty touch set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a touch, returning the record it replaced
    pub fn insert(&mut self, touch: Touch) -> Option<Touch> {
        self.touches.insert(touch.id, touch)
    }

    /// Removes a touch while keeping the order of the others
    pub fn remove(&mut self, id: TouchId) -> Option<Touch> {
        self.touches.shift_remove(&id)
    }

    pub fn get(&self, id: TouchId) -> Option<&Touch> {
        self.touches.get(&id)
    }

    pub fn contains(&self, id: TouchId) -> bool {
        self.touches.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.touches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }

    /// Iterates touches in platform order
    pub fn iter(&self) -> impl Iterator<Item = &Touch> {
        self.touches.values()
    }

    /// Touch ids in platform order
    pub fn ids(&self) -> impl Iterator<Item = TouchId> + '_ {
        self.touches.keys().copied()
    }
}

impl FromIterator<Touch> for TouchSet {
    fn from_iter<I: IntoIterator<Item = Touch>>(iter: I) -> Self {
        let mut set = TouchSet::new();
        for touch in iter {
            set.insert(touch);
        }
        set
    }
}

impl From<Touch> for TouchSet {
    fn from(touch: Touch) -> Self {
        std::iter::once(touch).collect()
    }
}

impl<'a> IntoIterator for &'a TouchSet {
    type Item = &'a Touch;
    type IntoIter = indexmap::map::Values<'a, TouchId, Touch>;

    fn into_iter(self) -> Self::IntoIter {
        self.touches.values()
    }
}

/// Event context handed to delegates untouched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchEvent {
    /// Frame the event was collected in
    pub frame: u64,
    /// Time since the input system started
    pub timestamp: Duration,
}

impl TouchEvent {
    pub fn new(frame: u64, timestamp: Duration) -> Self {
        Self { frame, timestamp }
    }
}
