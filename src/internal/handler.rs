use std::{
    any::{Any, type_name},
    fmt,
    sync::Arc,
};

use crate::{Error, Result, Subscriber};

type ErasedCall = dyn Fn(&(dyn Any + Send + Sync)) -> Result<()> + Send + Sync;

/// Type-erased subscriber as stored in the registry.
#[derive(Clone)]
pub(crate) struct Handler {
    pub name: Arc<str>,
    call: Arc<ErasedCall>,
}

impl Handler {
    pub fn new<P, S>(subscriber: S) -> Self
    where
        P: Send + Sync + 'static,
        S: Subscriber<P>,
    {
        let name: Arc<str> = Arc::from(subscriber.name());
        let call = move |payload: &(dyn Any + Send + Sync)| match payload.downcast_ref::<P>() {
            Some(payload) => subscriber.on_event(payload),
            None => Err(Error::External(
                format!("payload is not a {}", type_name::<P>()).into(),
            )),
        };
        Self {
            name,
            call: Arc::new(call),
        }
    }

    #[inline]
    pub fn call(&self, payload: &(dyn Any + Send + Sync)) -> Result<()> {
        (self.call)(payload)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish()
    }
}
