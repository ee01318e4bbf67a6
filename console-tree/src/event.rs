//! Tree events
//!
//! Every gesture a [`TreeView`](crate::TreeView) accepts produces one
//! [`TreeEvent`], delivered synchronously to each subscribed handler in
//! subscription order. Callers persist structural changes (drops, removals)
//! from these events.

use serde::{Deserialize, Serialize};

use crate::drop::DropOutcome;

/// Notification emitted after a successful gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum TreeEvent<T> {
    /// Expanded keys changed (tree order)
    ExpandedKeysChanged(Vec<String>),

    /// Checked state changed (tree order)
    #[serde(rename_all = "camelCase")]
    CheckedKeysChanged {
        /// Fully checked keys
        checked: Vec<String>,
        /// Indeterminate keys
        half_checked: Vec<String>,
    },

    /// Selection changed; `None` when cleared
    SelectedNodeChanged(Option<T>),

    /// A node was moved
    NodeDropped(DropOutcome),

    /// A record was inserted
    NodeAdded(T),

    /// A record was replaced
    NodeUpdated(T),

    /// A node and its descendants were removed (node first)
    NodesRemoved(Vec<T>),
}

impl<T> TreeEvent<T> {
    /// Event type string, e.g. `tree.node.dropped`.
    pub fn event_type(&self) -> &'static str {
        match self {
            TreeEvent::ExpandedKeysChanged(_) => "tree.expanded_keys.changed",
            TreeEvent::CheckedKeysChanged { .. } => "tree.checked_keys.changed",
            TreeEvent::SelectedNodeChanged(_) => "tree.selected_node.changed",
            TreeEvent::NodeDropped(_) => "tree.node.dropped",
            TreeEvent::NodeAdded(_) => "tree.node.added",
            TreeEvent::NodeUpdated(_) => "tree.node.updated",
            TreeEvent::NodesRemoved(_) => "tree.nodes.removed",
        }
    }

    /// True for events that change the structure or content of the tree
    /// and so need persisting by the caller.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TreeEvent::NodeDropped(_)
                | TreeEvent::NodeAdded(_)
                | TreeEvent::NodeUpdated(_)
                | TreeEvent::NodesRemoved(_)
        )
    }
}

/// Event handler trait for processing tree events.
///
/// Implemented for every `FnMut(&TreeEvent<T>)` closure.
pub trait TreeEventHandler<T> {
    /// Handle an event.
    fn handle(&mut self, event: &TreeEvent<T>);
}

impl<T, F> TreeEventHandler<T> for F
where
    F: FnMut(&TreeEvent<T>),
{
    fn handle(&mut self, event: &TreeEvent<T>) {
        self(event)
    }
}

/// Synchronous fan-out of events to registered handlers.
pub struct EventDispatcher<T> {
    handlers: Vec<Box<dyn TreeEventHandler<T>>>,
    events_emitted: u64,
}

impl<T> std::fmt::Debug for EventDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .field("events_emitted", &self.events_emitted)
            .finish()
    }
}

impl<T> Default for EventDispatcher<T> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            events_emitted: 0,
        }
    }
}

impl<T> EventDispatcher<T> {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers run in registration order.
    pub fn subscribe(&mut self, handler: impl TreeEventHandler<T> + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Total events emitted.
    pub fn events_emitted(&self) -> u64 {
        self.events_emitted
    }

    /// Deliver an event to every handler.
    pub fn emit(&mut self, event: TreeEvent<T>) {
        self.events_emitted += 1;
        tracing::trace!(
            event_type = event.event_type(),
            handlers = self.handlers.len(),
            "Dispatching tree event"
        );
        for handler in &mut self.handlers {
            handler.handle(&event);
        }
    }
}
