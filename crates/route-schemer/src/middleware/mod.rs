//! Tower integration
//!
//! [`RouteSchemerLayer`] binds a route to its schemas by inserting a
//! [`RouteBinding`] into the request extensions. With the `axum` feature,
//! handlers then take an [`Invocation`](crate::Invocation) argument built
//! from that binding and the request's parameters.

use std::sync::Arc;
use std::task::{Context, Poll};

use tower::{Layer, Service};
use tracing::trace;

use crate::config::RouteSchemerConfig;
use crate::invocation::Invocation;
use crate::params::ParameterBag;
use crate::registry::{RouteKey, SchemaRegistry};

#[cfg(feature = "axum")]
mod extract;

/// Route and schemas bound to a request
#[derive(Debug, Clone)]
pub struct RouteBinding {
    registry: Arc<SchemaRegistry>,
    key: RouteKey,
    config: Arc<RouteSchemerConfig>,
}

impl RouteBinding {
    /// Bind a route to a registry with the default configuration
    pub fn new(registry: Arc<SchemaRegistry>, key: RouteKey) -> Self {
        Self {
            registry,
            key,
            config: Arc::new(RouteSchemerConfig::default()),
        }
    }

    /// Route this binding serves
    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    /// Registry the route's schemas come from
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Start a fresh invocation for one request
    pub fn invocation(&self, params: ParameterBag) -> Invocation {
        Invocation::new(Arc::clone(&self.registry), self.key.clone(), params)
            .with_config(Arc::clone(&self.config))
    }
}

/// Layer that binds a controller action to its schemas
#[derive(Debug, Clone)]
pub struct RouteSchemerLayer {
    binding: RouteBinding,
}

impl RouteSchemerLayer {
    /// Bind `controller#action`
    pub fn new(
        registry: Arc<SchemaRegistry>,
        controller: impl AsRef<str>,
        action: impl AsRef<str>,
    ) -> Self {
        Self {
            binding: RouteBinding::new(registry, RouteKey::new(controller, action)),
        }
    }

    /// Use a specific configuration for invocations on this route
    pub fn with_config(mut self, config: Arc<RouteSchemerConfig>) -> Self {
        self.binding.config = config;
        self
    }
}

impl<S> Layer<S> for RouteSchemerLayer {
    type Service = RouteSchemerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RouteSchemerService {
            inner,
            binding: self.binding.clone(),
        }
    }
}

/// Service produced by [`RouteSchemerLayer`]
#[derive(Debug, Clone)]
pub struct RouteSchemerService<S> {
    inner: S,
    binding: RouteBinding,
}

impl<S, ReqBody> Service<http::Request<ReqBody>> for RouteSchemerService<S>
where
    S: Service<http::Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<ReqBody>) -> Self::Future {
        trace!(route = %self.binding.key, "Binding route schemas");
        req.extensions_mut().insert(self.binding.clone());
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::convert::Infallible;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_layer_inserts_binding() {
        let layer = RouteSchemerLayer::new(Arc::new(SchemaRegistry::new()), "Admin::UsersController", "Create");
        let service = layer.layer(tower::service_fn(|req: http::Request<()>| async move {
            let key = req.extensions().get::<RouteBinding>().map(|b| b.key().to_string());
            Ok::<_, Infallible>(key)
        }));

        let key = service.oneshot(http::Request::new(())).await.unwrap();
        assert_eq!(key.as_deref(), Some("admin/users#create"));
    }

    #[test]
    fn test_binding_starts_fresh_invocations() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_request("users", "create", json!({"type": "object", "properties": {"name": {"type": "string"}}}))
            .unwrap();
        let binding = RouteBinding::new(Arc::new(registry), RouteKey::new("users", "create"));

        let mut params = ParameterBag::new();
        params.insert("name", json!("Joe"));
        let mut first = binding.invocation(params);
        first.validated_params(crate::ValidateOptions::default()).unwrap();
        assert!(first.permitted().is_some());

        let second = binding.invocation(ParameterBag::new());
        assert!(second.permitted().is_none());
    }
}
