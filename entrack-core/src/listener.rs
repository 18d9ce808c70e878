use serde::Serialize;
use std::rc::{Rc, Weak};
use tracing::trace;

/// What just happened to the history. Carries no payload: subscribers
/// re-query `can_revert`/`can_remake` and the revert/remake messages
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeState {
    Commit,
    Revert,
    Remake,
    Forget,
}

/// Implemented by UI code that wants to react to history changes.
pub trait ChangeListener {
    fn on_change(&self, state: ChangeState);
}

/// The subscriber set. Listeners are held weakly: the history manager lives
/// for the whole process, so a strong reference here would keep every
/// short-lived subscriber alive forever. Dead entries are pruned whenever a
/// notification goes out.
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Vec<Weak<dyn ChangeListener>>,
}

impl ListenerSet {
    pub fn add(&mut self, listener: &Rc<dyn ChangeListener>) {
        if self.position(listener).is_none() {
            self.listeners.push(Rc::downgrade(listener));
        }
    }

    pub fn remove(&mut self, listener: &Rc<dyn ChangeListener>) {
        if let Some(index) = self.position(listener) {
            self.listeners.remove(index);
        }
    }

    pub fn notify(&mut self, state: ChangeState) {
        trace!(?state, listeners = self.listeners.len(), "notifying listeners");
        self.listeners.retain(|weak| match weak.upgrade() {
            Some(listener) => {
                listener.on_change(state);
                true
            }
            None => false,
        });
    }

    fn position(&self, listener: &Rc<dyn ChangeListener>) -> Option<usize> {
        self.listeners.iter().position(|weak| {
            weak.upgrade()
                .map(|existing| Rc::ptr_eq(&existing, listener))
                .unwrap_or(false)
        })
    }
}
