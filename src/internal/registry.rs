use std::{
    any::{TypeId, type_name},
    collections::{HashMap, hash_map::Entry},
    iter,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use super::Handler;
use crate::{Error, EventType, Result};

/// Subscribers of one event type, together with the payload type they accept.
///
/// `handlers` is an immutable snapshot: subscribing replaces it with a
/// longer one, so a reader holding a clone never observes a partial list.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    pub payload_type: TypeId,
    pub payload_name: &'static str,
    pub handlers: Arc<[Handler]>,
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    routes: RwLock<HashMap<EventType, Route>>,
}

impl Registry {
    /// Append `handler` to the route of `event_type`, creating the route if absent.
    ///
    /// The first subscription binds the event type to payload `P`.
    pub fn subscribe<P: 'static>(&self, event_type: EventType, handler: Handler) -> Result<()> {
        let mut routes = self.write();
        match routes.entry(event_type) {
            Entry::Occupied(mut entry) => {
                let route = entry.get();
                if route.payload_type != TypeId::of::<P>() {
                    return Err(Error::PayloadMismatch {
                        event_type: entry.key().clone(),
                        expected: route.payload_name,
                        actual: type_name::<P>(),
                    });
                }
                let route = entry.get_mut();
                route.handlers = route
                    .handlers
                    .iter()
                    .cloned()
                    .chain(iter::once(handler))
                    .collect();
            }
            Entry::Vacant(entry) => {
                entry.insert(Route {
                    payload_type: TypeId::of::<P>(),
                    payload_name: type_name::<P>(),
                    handlers: Arc::from(vec![handler]),
                });
            }
        }
        Ok(())
    }

    /// Snapshot of the route for `event_type`, as seen right now.
    pub fn route(&self, event_type: &str) -> Option<Route> {
        self.read().get(event_type).cloned()
    }

    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.read()
            .get(event_type)
            .map_or(0, |route| route.handlers.len())
    }

    // Handlers never run under the lock, so a poisoned lock still guards a
    // consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<EventType, Route>> {
        self.routes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<EventType, Route>> {
        self.routes.write().unwrap_or_else(PoisonError::into_inner)
    }
}
