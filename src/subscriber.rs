use std::{any::type_name, borrow::Cow};

use crate::Result;

/// A named consumer of one payload type.
///
/// Closures can be registered directly with [`EventBus::subscribe`]; implement
/// this trait when the consumer carries state or deserves a name in the logs.
///
/// `on_event` runs on the delivery worker thread. Returning an error (or
/// panicking) is logged and reported to monitors, but never affects other
/// subscribers or later events.
///
/// ```rust
/// use tapline::{Result, Subscriber};
///
/// struct BatchLogger;
///
/// impl Subscriber<Vec<String>> for BatchLogger {
///     fn on_event(&self, batch: &Vec<String>) -> Result<()> {
///         println!("got {} records", batch.len());
///         Ok(())
///     }
///
///     fn name(&self) -> std::borrow::Cow<'static, str> {
///         "batch-logger".into()
///     }
/// }
/// ```
///
/// [`EventBus::subscribe`]: crate::EventBus::subscribe
pub trait Subscriber<P>: Send + Sync + 'static {
    fn on_event(&self, payload: &P) -> Result<()>;

    /// Name used in logs and monitor callbacks.
    /// Defaults to the type name.
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(type_name::<Self>())
    }
}

/// Adapter registering a plain closure as a [`Subscriber`].
pub(crate) struct FnSubscriber<F>(pub F);

impl<P, F> Subscriber<P> for FnSubscriber<F>
where
    F: Fn(&P) -> Result<()> + Send + Sync + 'static,
{
    fn on_event(&self, payload: &P) -> Result<()> {
        (self.0)(payload)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(type_name::<F>())
    }
}
