//! Note lifecycle events and the process-wide event bus.
//!
//! Note operations emit [`ServerEvent`]s into a single broadcast channel.
//! Long-lived consumers (the summary relay in particular) subscribe
//! independently and react to the events that concern them, e.g. ending a
//! summary stream once its note has been deleted.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Note lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A note was created.
    NoteCreated { note_id: Uuid, owner_id: Uuid },
    /// A note's title or content changed.
    NoteUpdated { note_id: Uuid, owner_id: Uuid },
    /// A note was deleted; any work targeting it should stop.
    NoteDeleted { note_id: Uuid, owner_id: Uuid },
}

impl ServerEvent {
    /// The note this event is about.
    pub fn note_id(&self) -> Uuid {
        match self {
            ServerEvent::NoteCreated { note_id, .. }
            | ServerEvent::NoteUpdated { note_id, .. }
            | ServerEvent::NoteDeleted { note_id, .. } => *note_id,
        }
    }

    /// Whether this event reports the deletion of `note_id`.
    pub fn is_deletion_of(&self, note_id: Uuid) -> bool {
        matches!(self, ServerEvent::NoteDeleted { note_id: id, .. } if *id == note_id)
    }
}

/// Broadcast bus for note lifecycle events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    ///
    /// Recommended: 256 for production, 32 for tests.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers.
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub fn emit(&self, event: ServerEvent) {
        tracing::debug!(
            event = ?event,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted from now on. Each subscriber gets its own independent stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_deletion_of() {
        let note = Uuid::new_v4();
        let other = Uuid::new_v4();
        let owner = Uuid::new_v4();

        let deleted = ServerEvent::NoteDeleted {
            note_id: note,
            owner_id: owner,
        };
        assert!(deleted.is_deletion_of(note));
        assert!(!deleted.is_deletion_of(other));

        let updated = ServerEvent::NoteUpdated {
            note_id: note,
            owner_id: owner,
        };
        assert!(!updated.is_deletion_of(note));
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new(32);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let note_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        bus.emit(ServerEvent::NoteCreated { note_id, owner_id });

        assert_eq!(
            rx1.recv().await.unwrap(),
            ServerEvent::NoteCreated { note_id, owner_id }
        );
        assert_eq!(rx2.recv().await.unwrap().note_id(), note_id);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new(4);
        let event = ServerEvent::NoteDeleted {
            note_id: Uuid::nil(),
            owner_id: Uuid::nil(),
        };
        bus.emit(event.clone());
        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());

        bus.emit(event.clone());
        assert_eq!(rx.try_recv().unwrap(), event);
    }
}
