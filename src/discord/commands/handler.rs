use super::invocation::Invocation;
use crate::discord::Error;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// The asynchronous function a command runs when invoked.
pub type Handler = Arc<dyn Fn(Invocation) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;

/// Wrap an async closure or `async fn` into a [`Handler`].
///
/// ```ignore
/// let ping = handler(|inv: Invocation| async move {
///     let platform = inv.platform()?;
///     // reply through platform.interaction ...
///     Ok(())
/// });
/// ```
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    Arc::new(move |invocation| Box::pin(f(invocation)))
}
