//! Transport abstraction under the retry loop

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by `Transport::send`.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = reqwest::Result<reqwest::Response>> + Send + 'a>>;

/// Sends one HTTP request and yields the response or a transport error.
///
/// Returns a boxed future so the trait stays dyn-compatible (`Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    fn send(&self, request: reqwest::Request) -> TransportFuture<'_>;
}

impl Transport for reqwest::Client {
    fn send(&self, request: reqwest::Request) -> TransportFuture<'_> {
        Box::pin(self.execute(request))
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: reqwest::Request) -> TransportFuture<'_> {
        (**self).send(request)
    }
}
