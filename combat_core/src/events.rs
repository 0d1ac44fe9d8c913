//! Typed, synchronous publish/subscribe for combat notifications
//!
//! The bus is the only state shared between units. It is single-threaded
//! (`Rc`) and reentrant: a handler may publish, subscribe or unsubscribe while
//! a dispatch is in progress.

use crate::ai::AiState;
use crate::unit::UnitId;
use content_core::{AttributeKey, ResourceKind};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Attribute,
    /// Health changes and deaths
    Health,
    Shield,
    Resource,
    Cooldown,
    Buff,
    Cast,
    /// Spawn and despawn
    Lifecycle,
    Ai,
}

/// State-change notifications published by the combat core
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    AttributeChanged {
        unit: UnitId,
        key: AttributeKey,
        old: f64,
        new: f64,
    },
    HealthChanged {
        unit: UnitId,
        old: f64,
        new: f64,
        alive: bool,
    },
    UnitDied {
        unit: UnitId,
    },
    ShieldChanged {
        unit: UnitId,
        old: f64,
        new: f64,
    },
    ResourceChanged {
        unit: UnitId,
        resource: ResourceKind,
        old: f64,
        new: f64,
    },
    CooldownChanged {
        unit: UnitId,
        skill: String,
        remaining: f64,
        duration: f64,
        active: bool,
    },
    /// Coalesced: the buff list of the unit changed in some way
    BuffsChanged {
        unit: UnitId,
    },
    CastStarted {
        unit: UnitId,
        skill: String,
        cast_time: f64,
        channel_time: f64,
    },
    CastCompleted {
        unit: UnitId,
        skill: String,
        cast_time: f64,
        channel_time: f64,
    },
    CastInterrupted {
        unit: UnitId,
        skill: String,
        cast_time: f64,
        channel_time: f64,
    },
    UnitSpawned {
        unit: UnitId,
    },
    UnitDespawned {
        unit: UnitId,
    },
    AiStateChanged {
        unit: UnitId,
        from: AiState,
        to: AiState,
    },
}

impl CombatEvent {
    pub fn topic(&self) -> Topic {
        match self {
            CombatEvent::AttributeChanged { .. } => Topic::Attribute,
            CombatEvent::HealthChanged { .. } | CombatEvent::UnitDied { .. } => Topic::Health,
            CombatEvent::ShieldChanged { .. } => Topic::Shield,
            CombatEvent::ResourceChanged { .. } => Topic::Resource,
            CombatEvent::CooldownChanged { .. } => Topic::Cooldown,
            CombatEvent::BuffsChanged { .. } => Topic::Buff,
            CombatEvent::CastStarted { .. }
            | CombatEvent::CastCompleted { .. }
            | CombatEvent::CastInterrupted { .. } => Topic::Cast,
            CombatEvent::UnitSpawned { .. } | CombatEvent::UnitDespawned { .. } => Topic::Lifecycle,
            CombatEvent::AiStateChanged { .. } => Topic::Ai,
        }
    }

    /// The unit this event is about
    pub fn unit(&self) -> UnitId {
        match self {
            CombatEvent::AttributeChanged { unit, .. }
            | CombatEvent::HealthChanged { unit, .. }
            | CombatEvent::UnitDied { unit }
            | CombatEvent::ShieldChanged { unit, .. }
            | CombatEvent::ResourceChanged { unit, .. }
            | CombatEvent::CooldownChanged { unit, .. }
            | CombatEvent::BuffsChanged { unit }
            | CombatEvent::CastStarted { unit, .. }
            | CombatEvent::CastCompleted { unit, .. }
            | CombatEvent::CastInterrupted { unit, .. }
            | CombatEvent::UnitSpawned { unit }
            | CombatEvent::UnitDespawned { unit }
            | CombatEvent::AiStateChanged { unit, .. } => *unit,
        }
    }
}

/// Handle returned by `subscribe*`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<RefCell<dyn FnMut(&CombatEvent)>>;

struct Subscription {
    id: SubscriptionId,
    topic: Option<Topic>,
    unit: Option<UnitId>,
    handler: Handler,
}

impl Subscription {
    fn matches(&self, event: &CombatEvent) -> bool {
        self.topic.map_or(true, |t| t == event.topic())
            && self.unit.map_or(true, |u| u == event.unit())
    }
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Process-wide fan-out of combat events
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: FnMut(&CombatEvent) + 'static,
    {
        self.add(None, None, handler)
    }

    /// Receive events of one topic
    pub fn subscribe_topic<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&CombatEvent) + 'static,
    {
        self.add(Some(topic), None, handler)
    }

    /// Receive events about one unit, optionally narrowed to a topic
    ///
    /// Unit-scoped subscriptions are dropped automatically when the unit is
    /// despawned from its world.
    pub fn subscribe_unit<F>(&self, unit: UnitId, topic: Option<Topic>, handler: F) -> SubscriptionId
    where
        F: FnMut(&CombatEvent) + 'static,
    {
        self.add(topic, Some(unit), handler)
    }

    fn add<F>(&self, topic: Option<Topic>, unit: Option<UnitId>, handler: F) -> SubscriptionId
    where
        F: FnMut(&CombatEvent) + 'static,
    {
        let handler: Handler = Rc::new(RefCell::new(handler));
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.subscriptions.push(Subscription {
            id,
            topic,
            unit,
            handler,
        });
        id
    }

    /// Remove a subscription. Safe to call from inside a handler.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscriptions.len();
        inner.subscriptions.retain(|s| s.id != id);
        inner.subscriptions.len() != before
    }

    /// Remove every subscription scoped to a unit, returning how many were removed
    pub fn unsubscribe_unit(&self, unit: UnitId) -> usize {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscriptions.len();
        inner.subscriptions.retain(|s| s.unit != Some(unit));
        before - inner.subscriptions.len()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner.borrow().subscriptions.iter().any(|s| s.id == id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    /// Deliver an event to every matching handler in registration order
    ///
    /// Handlers removed during the dispatch are not called. A handler that is
    /// already running further up the stack (reentrant publish) is skipped.
    pub fn publish(&self, event: &CombatEvent) {
        let targets: Vec<(SubscriptionId, Handler)> = {
            let inner = self.inner.borrow();
            inner
                .subscriptions
                .iter()
                .filter(|s| s.matches(event))
                .map(|s| (s.id, s.handler.clone()))
                .collect()
        };

        if targets.is_empty() {
            tracing::trace!(topic = ?event.topic(), "no subscribers");
            return;
        }

        for (id, handler) in targets {
            if !self.is_subscribed(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(event),
                Err(_) => {
                    tracing::trace!(?id, "handler already dispatching, skipped reentrant event");
                }
            }
        }
    }
}

/// Collects published events, for consumers that poll rather than react
#[derive(Clone)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<CombatEvent>>>,
    subscription: SubscriptionId,
}

impl EventRecorder {
    /// Record every event on the bus
    pub fn attach(bus: &EventBus) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let subscription = bus.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        EventRecorder {
            events,
            subscription,
        }
    }

    /// Record events of one topic
    pub fn attach_topic(bus: &EventBus, topic: Topic) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let subscription =
            bus.subscribe_topic(topic, move |event| sink.borrow_mut().push(event.clone()));
        EventRecorder {
            events,
            subscription,
        }
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<CombatEvent> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<CombatEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn count(&self, predicate: impl Fn(&CombatEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
