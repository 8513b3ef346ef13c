// Gateway event subscriptions.
//
// Each handler is tied to one event identifier. The identifier is the same
// snake_case name serenity uses for the matching `EventHandler` method, which is
// also the file name discovery expects for the handler's manifest.

use crate::discord::Error;
use futures::future::BoxFuture;
use serenity::all::{Context, FullEvent};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

/// A gateway event identifier, as serenity names it (`FullEvent::snake_case_name`):
/// `ready`, `message`, `guild_member_update`, `thread_create`, ...
///
/// Any well-formed identifier is accepted. One that serenity never emits simply
/// never fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventName(Cow<'static, str>);

impl EventName {
    pub const READY: Self = Self(Cow::Borrowed("ready"));
    pub const MESSAGE: Self = Self(Cow::Borrowed("message"));
    pub const INTERACTION_CREATE: Self = Self(Cow::Borrowed("interaction_create"));

    /// The identifier of a gateway event.
    pub fn of(event: &FullEvent) -> Self {
        Self(Cow::Borrowed(event.snake_case_name()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Subscription maps are looked up with the `&str` serenity hands out.
impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not an event identifier (expected snake_case, like `guild_member_update`)")]
pub struct InvalidEventName(pub String);

impl FromStr for EventName {
    type Err = InvalidEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let well_formed = chars.next().is_some_and(|c| c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if well_formed {
            Ok(Self(Cow::Owned(s.to_string())))
        } else {
            Err(InvalidEventName(s.to_string()))
        }
    }
}

/// Callback run for a subscribed event. The event is shared between every
/// handler subscribed to it.
pub type EventCallback =
    Arc<dyn Fn(Context, Arc<FullEvent>) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;

/// One subscription: an event identifier and the callback to run for it.
#[derive(Clone)]
pub struct EventHandler {
    event: EventName,
    callback: EventCallback,
}

impl EventHandler {
    pub fn new<F, Fut>(event: EventName, f: F) -> Self
    where
        F: Fn(Context, Arc<FullEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Self::from_callback(event, Arc::new(move |ctx, ev| Box::pin(f(ctx, ev))))
    }

    pub fn from_callback(event: EventName, callback: EventCallback) -> Self {
        Self { event, callback }
    }

    pub fn event(&self) -> &EventName {
        &self.event
    }

    pub fn callback(&self) -> &EventCallback {
        &self.callback
    }

    pub async fn run(&self, ctx: Context, event: Arc<FullEvent>) -> Result<(), Error> {
        (self.callback)(ctx, event).await
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}
