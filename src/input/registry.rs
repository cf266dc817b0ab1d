//! Priority-ordered handler storage

use super::delegate::DelegateId;
use super::error::{DispatchError, Result};
use super::handler::{StandardHandler, TargetedHandler, TouchHandler};

/// Handler records sorted by ascending priority
///
/// Equal priorities keep insertion order: a new record goes after every
/// record whose priority is not higher than its own.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: Vec<TouchHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a handler at its priority rank
    ///
    /// Returns the index it landed at. Fails without touching the registry
    /// if the delegate is already registered.
    pub fn insert(&mut self, handler: TouchHandler) -> Result<usize> {
        let mut index = 0;
        for existing in &self.handlers {
            if existing.delegate_id() == handler.delegate_id() {
                return Err(DispatchError::DuplicateDelegate(handler.delegate_id()));
            }
            if existing.priority() <= handler.priority() {
                index += 1;
            }
        }

        self.handlers.insert(index, handler);
        Ok(index)
    }

    /// Removes the handler registered for `id`, if any
    pub fn remove(&mut self, id: DelegateId) -> Option<TouchHandler> {
        let index = self.find(id)?;
        Some(self.handlers.remove(index))
    }

    /// Removes every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Index of the handler registered for `id`
    pub fn find(&self, id: DelegateId) -> Option<usize> {
        self.handlers.iter().position(|h| h.delegate_id() == id)
    }

    pub fn get(&self, id: DelegateId) -> Option<&TouchHandler> {
        self.find(id).map(|index| &self.handlers[index])
    }

    pub fn contains(&self, id: DelegateId) -> bool {
        self.find(id).is_some()
    }

    /// Moves a handler to the rank for `priority`
    ///
    /// Implemented as remove + insert so that the handler lands after any
    /// existing handlers of the same priority.
    pub fn set_priority(&mut self, id: DelegateId, priority: i32) -> Result<()> {
        let index = self.find(id).ok_or(DispatchError::DelegateNotFound(id))?;
        if self.handlers[index].priority() == priority {
            return Ok(());
        }

        let mut handler = self.handlers.remove(index);
        handler.set_priority(priority);
        self.insert(handler)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// All handlers in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = &TouchHandler> {
        self.handlers.iter()
    }

    /// Targeted handlers in dispatch order
    pub fn targeted(&self) -> impl Iterator<Item = (&TouchHandler, &TargetedHandler)> {
        self.handlers
            .iter()
            .filter_map(|h| h.as_targeted().map(|targeted| (h, targeted)))
    }

    /// Standard handlers in dispatch order
    pub fn standard(&self) -> impl Iterator<Item = (&TouchHandler, &StandardHandler)> {
        self.handlers
            .iter()
            .filter_map(|h| h.as_standard().map(|standard| (h, standard)))
    }
}
