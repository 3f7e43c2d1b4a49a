//! Scoped publish/subscribe fabric built on tokio broadcast channels.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::debug;

use super::types::{DeliveryEvent, FleetEvent};

/// Capacity of each per-order scope and of the global channel.
const CHANNEL_CAPACITY: usize = 256;

/// Publish/subscribe fabric with per-order scopes plus one global channel.
///
/// A scope is created lazily on first subscribe or publish and torn down by
/// [`drop_scope`](Self::drop_scope) when a trip finishes. Delivery is
/// best-effort and at-most-once: events published before a subscriber joins
/// are never replayed, and send errors (no listeners) are ignored.
pub struct DeliveryBroadcaster {
    scopes: RwLock<HashMap<String, broadcast::Sender<DeliveryEvent>>>,
    global: broadcast::Sender<FleetEvent>,
}

impl DeliveryBroadcaster {
    pub fn new() -> Self {
        let (global, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            scopes: RwLock::new(HashMap::new()),
            global,
        }
    }

    /// Join the broadcast scope for one order.
    pub fn subscribe(&self, order_id: &str) -> broadcast::Receiver<DeliveryEvent> {
        let mut scopes = self.scopes.write().expect("scope lock poisoned");
        scopes
            .entry(order_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to one order's scope.
    ///
    /// Dropped silently when nobody subscribed to the scope yet; the
    /// simulator keeps publishing regardless of listeners. A scope whose
    /// last subscriber has gone away is reaped instead of receiving the
    /// event.
    pub fn publish(&self, order_id: &str, event: DeliveryEvent) {
        let sender = {
            let scopes = self.scopes.read().expect("scope lock poisoned");
            scopes.get(order_id).cloned()
        };
        if let Some(sender) = sender {
            if sender.receiver_count() == 0 {
                self.prune_idle_scope(order_id);
                return;
            }
            let _ = sender.send(event);
        }
    }

    /// Publish a fleet-wide event to every connection.
    pub fn publish_global(&self, event: FleetEvent) {
        let _ = self.global.send(event);
    }

    /// Subscribe to fleet-wide events.
    pub fn subscribe_global(&self) -> broadcast::Receiver<FleetEvent> {
        self.global.subscribe()
    }

    /// Remove a scope that has no remaining subscribers.
    ///
    /// Clients may join rooms for order ids that never dispatch; without
    /// this the scope map would keep their dead channels forever. The
    /// receiver count is re-checked under the write lock so a concurrent
    /// subscribe is never raced out of its channel.
    pub fn prune_idle_scope(&self, order_id: &str) {
        let mut scopes = self.scopes.write().expect("scope lock poisoned");
        if let Some(sender) = scopes.get(order_id) {
            if sender.receiver_count() == 0 {
                scopes.remove(order_id);
                debug!("Reaped idle broadcast scope for order {}", order_id);
            }
        }
    }

    /// Tear down the scope for a finished order.
    pub fn drop_scope(&self, order_id: &str) {
        let mut scopes = self.scopes.write().expect("scope lock poisoned");
        if scopes.remove(order_id).is_some() {
            debug!("Dropped broadcast scope for order {}", order_id);
        }
    }

    /// Number of live scopes, for status reporting.
    pub fn scope_count(&self) -> usize {
        self.scopes.read().expect("scope lock poisoned").len()
    }
}

impl Default for DeliveryBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
