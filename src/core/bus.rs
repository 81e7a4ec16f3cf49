//! # Event Bus
//!
//! Page-global broadcast of `accordion:change`. Any number of listeners may
//! subscribe; each gets its own `mpsc::Receiver` and sees every change
//! published after it subscribed. Publishers never know who is listening.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use log::debug;
use serde::Serialize;

pub const ACCORDION_CHANGE: &str = "accordion:change";

/// Payload of `accordion:change`. Both fields are `None` when a panel closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccordionChange {
    pub guide_id: Option<String>,
    pub title: Option<String>,
}

impl AccordionChange {
    pub fn opened(guide_id: &str, title: &str) -> Self {
        Self {
            guide_id: Some(guide_id.to_string()),
            title: Some(title.to_string()),
        }
    }

    pub fn closed() -> Self {
        Self {
            guide_id: None,
            title: None,
        }
    }
}

/// Cheap-clone handle to the shared subscriber list.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Rc<RefCell<Vec<Sender<AccordionChange>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<AccordionChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Delivers `change` to every live subscriber. Subscribers whose receiver
    /// has been dropped are pruned.
    pub fn publish(&self, change: AccordionChange) {
        debug!("{}: {:?}", ACCORDION_CHANGE, change);
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(change.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
