//! `tower::Service` adapter over [`MappingRouter`].
//!
//! Lets an upstream dispatch loop drive the router as one service in a
//! `tower` stack. Routing is synchronous, so the returned future is always
//! ready.

use std::fmt;
use std::future::{ready, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::{debug_span, field};

use crate::error::RouteError;
use crate::router::MappingRouter;

/// Service that resolves each request message to its destinations.
pub struct RouteService<M, D> {
    router: Arc<MappingRouter<M, D>>,
}

impl<M, D> RouteService<M, D> {
    /// Wraps a shared router.
    #[must_use]
    pub fn new(router: Arc<MappingRouter<M, D>>) -> Self {
        Self { router }
    }

    /// The wrapped router, for reconfiguration.
    #[must_use]
    pub fn router(&self) -> &Arc<MappingRouter<M, D>> {
        &self.router
    }
}

impl<M, D> Clone for RouteService<M, D> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
        }
    }
}

impl<M, D> fmt::Debug for RouteService<M, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteService")
            .field("router", &self.router)
            .finish()
    }
}

impl<M, D> Service<M> for RouteService<M, D>
where
    M: fmt::Debug,
{
    type Response = Vec<D>;
    type Error = RouteError;
    type Future = Ready<Result<Vec<D>, RouteError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, message: M) -> Self::Future {
        let span = debug_span!(
            "route",
            destinations = field::Empty,
            outcome = field::Empty,
        );
        let _entered = span.enter();

        let result = self.router.route(&message);
        match &result {
            Ok(destinations) => {
                span.record("destinations", destinations.len());
                span.record("outcome", "ok");
            }
            Err(err) => {
                span.record("outcome", "error");
                tracing::debug!(error = %err, "routing failed");
            }
        }
        ready(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
