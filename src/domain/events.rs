//! Change notifications emitted by the tree model

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::trace;

use crate::domain::node::NodeId;

/// Emitted after a mutation has been applied and the layout recomputed.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    NodeAdded {
        id: NodeId,
        parent: Option<NodeId>,
    },
    /// `removed` lists the whole subtree, children before parents
    NodeRemoved {
        id: NodeId,
        removed: Vec<NodeId>,
    },
    NodeMoved {
        id: NodeId,
        from: NodeId,
        to: NodeId,
    },
    Folded(NodeId),
    Unfolded(NodeId),
    Translated {
        dx: f64,
        dy: f64,
    },
    Cleared,
    Loaded {
        nodes: usize,
    },
}

/// Fan-out of events to any number of channel subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<TreeEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<TreeEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Send to every subscriber, dropping the ones whose receiver is gone.
    pub fn emit(&mut self, event: TreeEvent) {
        trace!(?event, subscribers = self.subscribers.len(), "emit");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_subscribers_when_emit_then_all_receive() {
        let mut bus = EventBus::default();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.emit(TreeEvent::Folded(NodeId(1)));
        assert_eq!(a.try_recv().unwrap(), TreeEvent::Folded(NodeId(1)));
        assert_eq!(b.try_recv().unwrap(), TreeEvent::Folded(NodeId(1)));
    }

    #[test]
    fn given_dropped_receiver_when_emit_then_subscriber_removed() {
        let mut bus = EventBus::default();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        bus.emit(TreeEvent::Cleared);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap(), TreeEvent::Cleared);
    }
}
