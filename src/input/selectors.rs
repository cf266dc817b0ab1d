//! Per-handler enabled-phase flags

use bitflags::bitflags;

use super::touch::TouchPhase;

bitflags! {
    /// Which touch phases a handler wants delivered
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TouchSelectors: u8 {
        const BEGAN = 1 << 0;
        const MOVED = 1 << 1;
        const ENDED = 1 << 2;
        const CANCELLED = 1 << 3;
    }
}

impl TouchSelectors {
    /// Flag for a single phase
    pub fn for_phase(phase: TouchPhase) -> Self {
        match phase {
            TouchPhase::Began => Self::BEGAN,
            TouchPhase::Moved => Self::MOVED,
            TouchPhase::Ended => Self::ENDED,
            TouchPhase::Cancelled => Self::CANCELLED,
        }
    }

    /// Whether `phase` is enabled
    pub fn handles(self, phase: TouchPhase) -> bool {
        self.contains(Self::for_phase(phase))
    }
}

impl Default for TouchSelectors {
    fn default() -> Self {
        Self::all()
    }
}

impl From<TouchPhase> for TouchSelectors {
    fn from(phase: TouchPhase) -> Self {
        Self::for_phase(phase)
    }
}
