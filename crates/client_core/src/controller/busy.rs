use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use super::events::Action;

/// Actions with a backend call in flight.
///
/// Clones share state, so a front end can hold one and poll it while the
/// controller is borrowed by a running action.
#[derive(Debug, Clone, Default)]
pub struct BusyActions {
    inner: Arc<Mutex<HashSet<Action>>>,
}

impl BusyActions {
    pub fn contains(&self, action: Action) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&action)
    }

    pub fn is_loading(&self) -> bool {
        self.contains(Action::LoadItems)
    }

    pub fn is_idle(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Marks `action` busy until the returned guard is dropped.
    pub(crate) fn begin(&self, action: Action) -> BusyGuard {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(action);
        BusyGuard {
            actions: self.clone(),
            action,
        }
    }
}

/// Clears the busy flag on every exit path, including a dropped future.
pub(crate) struct BusyGuard {
    actions: BusyActions,
    action: Action,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.actions
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_flag_on_drop() {
        let busy = BusyActions::default();
        let observer = busy.clone();

        let guard = busy.begin(Action::LoadItems);
        assert!(observer.is_loading());
        assert!(!observer.contains(Action::Checkout));

        drop(guard);
        assert!(!observer.is_loading());
        assert!(observer.is_idle());
    }
}
