//! Change Notification & Toasts
//!
//! `Subscribers` lets the plain (non-reactive) stores tell the UI that
//! something changed; `Notifier` is the toast queue shown to the user.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type Listener = Rc<dyn Fn()>;

/// Listener list shared by clones of the owning store
#[derive(Clone, Default)]
pub struct Subscribers(Rc<RefCell<Vec<Listener>>>);

impl Subscribers {
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.0.borrow_mut().push(Rc::new(listener));
    }

    pub fn notify(&self) {
        // Listeners may read the store again, so never call them under the borrow
        let listeners: Vec<Listener> = self.0.borrow().clone();
        for listener in listeners {
            listener();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub message: String,
}

/// Toast queue
#[derive(Clone, Default)]
pub struct Notifier {
    toasts: Rc<RefCell<Vec<Toast>>>,
    next_id: Rc<Cell<u32>>,
    subscribers: Subscribers,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) -> u32 {
        self.push(ToastKind::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u32 {
        self.push(ToastKind::Error, message.into())
    }

    fn push(&self, kind: ToastKind, message: String) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.toasts.borrow_mut().push(Toast { id, kind, message });
        self.subscribers.notify();
        id
    }

    pub fn dismiss(&self, id: u32) {
        self.toasts.borrow_mut().retain(|toast| toast.id != id);
        self.subscribers.notify();
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.subscribers.subscribe(listener);
    }
}
