use crate::foundation::core::{EntityId, RecorderId};

/// Named trigger events a recorder listens for on its entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// `record-start`: begin a real recording.
    RecordStart,
    /// `dry-run-start`: run the camera path without encoding.
    DryRunStart,
}

impl TriggerEvent {
    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            Self::RecordStart => "record-start",
            Self::DryRunStart => "dry-run-start",
        }
    }

    /// Look an event up by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "record-start" => Some(Self::RecordStart),
            "dry-run-start" => Some(Self::DryRunStart),
            _ => None,
        }
    }

    /// `true` for the preview trigger.
    pub fn is_dry_run(self) -> bool {
        self == Self::DryRunStart
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SubscriptionId(u64);

/// A live listener registration. Owned by the recorder that subscribed and handed back to
/// [`EventBus::unsubscribe`] on detach.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    entity: EntityId,
    event: TriggerEvent,
    recorder: RecorderId,
}

impl Subscription {
    /// Entity the listener is registered on.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Event listened for.
    pub fn event(&self) -> TriggerEvent {
        self.event
    }

    /// Recorder notified by the event.
    pub fn recorder(&self) -> RecorderId {
        self.recorder
    }
}

#[derive(Clone, Copy, Debug)]
struct Listener {
    id: SubscriptionId,
    entity: EntityId,
    event: TriggerEvent,
    recorder: RecorderId,
}

/// Routes trigger events on entities to subscribed recorders, in subscription order.
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl EventBus {
    /// Register `recorder` for `event` on `entity`.
    pub fn subscribe(
        &mut self,
        entity: EntityId,
        event: TriggerEvent,
        recorder: RecorderId,
    ) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            entity,
            event,
            recorder,
        });
        Subscription {
            id,
            entity,
            event,
            recorder,
        }
    }

    /// Release a registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != sub.id);
        self.listeners.len() != before
    }

    /// Recorders listening for `event` on `entity`.
    pub fn listeners(&self, entity: EntityId, event: TriggerEvent) -> Vec<RecorderId> {
        self.listeners
            .iter()
            .filter(|l| l.entity == entity && l.event == event)
            .map(|l| l.recorder)
            .collect()
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// `true` when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
