//! Errors reported by the touch dispatcher

use thiserror::Error;

use super::delegate::DelegateId;

/// Misuse of the dispatcher's registration API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The delegate is already registered (in either role)
    #[error("{0} already added to touch dispatcher")]
    DuplicateDelegate(DelegateId),

    /// The delegate is not registered
    #[error("{0} not found in touch dispatcher")]
    DelegateNotFound(DelegateId),

    /// The delegate is mid-callback, so its selector mask cannot be read
    #[error("{0} is busy; register it with an explicit selector mask")]
    DelegateBusy(DelegateId),

    /// Priorities cannot change while touches are being dispatched
    #[error("cannot change handler priority while a dispatch pass is running")]
    DispatchInProgress,

    /// The shared dispatcher was initialized twice
    #[error("shared touch dispatcher is already initialized")]
    AlreadyInitialized,
}

pub type Result<T, E = DispatchError> = std::result::Result<T, E>;
