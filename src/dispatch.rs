//! The stack traversal.
//!
//! A request walks the stack of its router from top to bottom. Every layer whose path matches (and, for routes, whose
//! methods include the request method) gets a chance to handle it, unless the layer is filtered out by the error gate:
//! while an error is pending only error middleware and mounted routers run, otherwise error middleware is skipped.
//!
//! Control is handed on through [`Next`], a cursor which remembers where the walk stopped and which routing state
//! (path, base url and params) has to be put back before it resumes. A handler which fails, panics or whose param hooks
//! fail is treated as if it had called [`Next::raise`] with that error.

use crate::error::{self, RouteError};
use crate::helpers::{self, RequestHead};
use crate::layer::{Layer, LayerKind, LayerMatch};
use crate::middleware::Middleware;
use crate::route::Route;
use crate::router::RouterInner;
use crate::terminal;
use crate::types::{DispatchState, RouteParams};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

pub(crate) type Handler<B, E> = Box<dyn Fn(Request<B>, Next<B, E>) -> HandlerReturn<E> + Send + Sync + 'static>;
pub(crate) type ErrorHandler<B, E> =
    Box<dyn Fn(RouteError, Request<B>, Next<B, E>) -> HandlerReturn<E> + Send + Sync + 'static>;
pub(crate) type HandlerReturn<E> = Box<dyn Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static>;

type Failure<B> = (Request<B>, RouteError);

/// The continuation handed to every handler.
///
/// Consuming it with [`run`](#method.run) passes the request on to the next matching handler and resolves to the
/// response produced further down, so a middleware can also post-process that response. [`raise`](#method.raise)
/// does the same, but with an error pending.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::{body::Bytes, header::HeaderValue, Response};
/// use strata::prelude::*;
/// use strata::{Error, Middleware, Router};
///
/// # fn run() -> Router<Full<Bytes>, Error> {
/// let router = Router::builder()
///     .middleware(Middleware::new(|req, next| async move {
///         let mut res = next.run(req).await;
///         res.headers_mut().insert("x-powered-by", HeaderValue::from_static("strata"));
///         Ok(res)
///     }))
///     .get("/users/:id", |req, next| async move {
///         if req.param("id").map(String::as_str) == Some("me") {
///             // Fall through to the next route which matches.
///             return Ok(next.run(req).await);
///         }
///         Ok(Response::new(Full::new(Bytes::from("a user"))))
///     })
///     .build()
///     .unwrap();
/// # router
/// # }
/// # run();
/// ```
pub struct Next<B, E> {
    router: Arc<RouterInner<B, E>>,
    // Position of the first layer not visited yet.
    index: usize,
    // Routing state put back into the request when the walk resumes.
    restore: DispatchState,
    route: Option<RouteCursor>,
    // Methods of the routes which matched the path of an `OPTIONS` request.
    allow: Vec<Method>,
    // Where to continue once this router's stack is exhausted.
    parent: Option<Arc<Next<B, E>>>,
}

// Resuming inside a route: the remaining handlers of the route at `index - 1` are tried first.
#[derive(Clone)]
struct RouteCursor {
    entry: usize,
    // The state to restore when leaving the route.
    exit: DispatchState,
}

impl<B, E> Clone for Next<B, E> {
    fn clone(&self) -> Self {
        Next {
            router: self.router.clone(),
            index: self.index,
            restore: self.restore.clone(),
            route: self.route.clone(),
            allow: self.allow.clone(),
            parent: self.parent.clone(),
        }
    }
}

impl<B, E> Debug for Next<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ index: {}, path: {:?}, base_url: {:?}, nested: {} }}",
            self.index,
            self.restore.path,
            self.restore.base_url,
            self.parent.is_some()
        )
    }
}

impl<B, E> Next<B, E>
where
    B: Default + Send + 'static,
    E: Into<RouteError> + 'static,
{
    /// Hands the request on to the next matching handler.
    ///
    /// Called from an error middleware, it clears the pending error and the walk continues with regular handlers.
    pub async fn run(self, req: Request<B>) -> Response<Full<Bytes>> {
        self.resume(req, None).await
    }

    /// Hands the request on with `err` pending: only error middleware runs from here on.
    pub async fn raise<T: Into<RouteError>>(self, req: Request<B>, err: T) -> Response<Full<Bytes>> {
        self.resume(req, Some(err.into())).await
    }

    pub(crate) fn start(router: Arc<RouterInner<B, E>>, req: Request<B>) -> BoxFuture<'static, Response<Full<Bytes>>> {
        let restore = helpers::dispatch_state(&req);
        let next = Next {
            router,
            index: 0,
            restore,
            route: None,
            allow: Vec::new(),
            parent: None,
        };
        next.resume(req, None)
    }

    pub(crate) fn resume(self, req: Request<B>, err: Option<RouteError>) -> BoxFuture<'static, Response<Full<Bytes>>> {
        Box::pin(self.walk(req, err))
    }

    // A continuation for the handler of the layer at `index - 1`.
    fn fork(&self, restore: DispatchState, route: Option<RouteCursor>) -> Next<B, E> {
        Next {
            router: self.router.clone(),
            index: self.index,
            restore,
            route,
            allow: self.allow.clone(),
            parent: self.parent.clone(),
        }
    }

    async fn walk(mut self, mut req: Request<B>, mut err: Option<RouteError>) -> Response<Full<Bytes>> {
        helpers::set_dispatch_state(&mut req, self.restore.clone());
        let router = self.router.clone();

        if let Some(cursor) = self.route.take() {
            let route = self
                .index
                .checked_sub(1)
                .and_then(|idx| router.stack.get(idx))
                .and_then(Layer::as_route);

            if let (None, Some(route)) = (&err, route) {
                if let Some(pos) = route.position(req.method(), cursor.entry) {
                    let matched = self.restore.clone();
                    match self.call_route(route, pos, req, matched, cursor.exit.clone()).await {
                        Ok(res) => return res,
                        Err((r, e)) => {
                            req = r;
                            err = Some(e);
                        }
                    }
                }
            }

            helpers::set_dispatch_state(&mut req, cursor.exit);
        }

        loop {
            let layer = match router.stack.get(self.index) {
                Some(layer) => layer,
                None => return self.exhaust(req, err).await,
            };
            self.index += 1;

            let state = helpers::dispatch_state(&req);
            let matched = match layer.match_path(&state.path) {
                Some(m) => m,
                None => continue,
            };

            if let LayerKind::Route(ref route) = layer.kind {
                if !route.handles_method(req.method()) {
                    if err.is_none() && *req.method() == Method::OPTIONS {
                        collect_allowed(&mut self.allow, route);
                    }
                    continue;
                }
            }

            if !layer.accepts(err.is_some()) {
                continue;
            }

            tracing::trace!(
                index = self.index - 1,
                kind = layer.describe(),
                pattern = layer.pattern.raw(),
                path = %state.path,
                "layer matched"
            );

            let mut layer_state = state.clone();
            layer_state.params.extend(matched.route_params());
            helpers::set_dispatch_state(&mut req, layer_state.clone());

            req = match process_params(&router, req, &matched).await {
                Ok(r) => r,
                Err((mut r, e)) => {
                    helpers::set_dispatch_state(&mut r, state);
                    req = r;
                    err = Some(e);
                    continue;
                }
            };

            let outcome = match layer.kind {
                LayerKind::Route(ref route) => match route.position(req.method(), 0) {
                    Some(pos) => self.call_route(route, pos, req, layer_state, state.clone()).await,
                    None => continue,
                },
                LayerKind::Middleware(Middleware::Regular(ref mw)) => {
                    helpers::set_dispatch_state(&mut req, helpers::strip_prefix(&layer_state, matched.prefix_len));
                    let next = self.fork(state.clone(), None);
                    guarded(req, |req| (mw.handler)(req, next)).await
                }
                LayerKind::Middleware(Middleware::Error(ref mw)) => {
                    let pending = match err.take() {
                        Some(e) => e,
                        None => continue,
                    };
                    helpers::set_dispatch_state(&mut req, helpers::strip_prefix(&layer_state, matched.prefix_len));
                    let next = self.fork(state.clone(), None);
                    guarded(req, |req| (mw.handler)(pending, req, next)).await
                }
                LayerKind::Scope(ref child) => {
                    let mut inner = helpers::strip_prefix(&layer_state, matched.prefix_len);
                    if !child.inner.options.merge_params {
                        inner.params = RouteParams::new();
                    }

                    tracing::debug!(base_url = %inner.base_url, path = %inner.path, "entering mounted router");

                    let parent = self.fork(state.clone(), None);
                    let child_next = Next {
                        router: child.inner.clone(),
                        index: 0,
                        restore: inner,
                        route: None,
                        allow: Vec::new(),
                        parent: Some(Arc::new(parent)),
                    };
                    return child_next.resume(req, err.take()).await;
                }
            };

            match outcome {
                Ok(res) => return res,
                Err((mut r, e)) => {
                    helpers::set_dispatch_state(&mut r, state);
                    req = r;
                    err = Some(e);
                }
            }
        }
    }

    async fn call_route(
        &mut self,
        route: &Route<B, E>,
        pos: usize,
        req: Request<B>,
        matched: DispatchState,
        exit: DispatchState,
    ) -> Result<Response<Full<Bytes>>, Failure<B>> {
        let handler = match route.handler(pos) {
            Some(handler) => handler,
            None => return Err((req, Box::new(crate::Error::new(format!("No route handler at position {}", pos))))),
        };

        let cursor = RouteCursor { entry: pos + 1, exit };
        let next = self.fork(matched, Some(cursor));
        guarded(req, |req| handler(req, next)).await
    }

    async fn exhaust(self, req: Request<B>, err: Option<RouteError>) -> Response<Full<Bytes>> {
        if err.is_none() && *req.method() == Method::OPTIONS && !self.allow.is_empty() {
            return terminal::options_response(&self.allow);
        }

        match self.parent {
            Some(parent) => {
                let parent = Arc::try_unwrap(parent).unwrap_or_else(|shared| Next::clone(&shared));
                parent.resume(req, err).await
            }
            None => terminal::respond(&req, err),
        }
    }
}

fn collect_allowed<B, E>(allow: &mut Vec<Method>, route: &Route<B, E>) {
    for method in route.allowed_methods() {
        if !allow.contains(&method) {
            allow.push(method);
        }
    }
}

async fn process_params<B, E>(
    router: &RouterInner<B, E>,
    mut req: Request<B>,
    matched: &LayerMatch,
) -> Result<Request<B>, Failure<B>>
where
    B: Default + Send + 'static,
    E: Into<RouteError> + 'static,
{
    for (name, value) in &matched.params {
        let handlers = router.params.handlers(name);
        if handlers.is_empty() {
            continue;
        }

        tracing::debug!(param = %name, value = %value, count = handlers.len(), "running param handlers");

        for handler in handlers {
            req = guarded(req, |req| handler(req, value.clone(), name.clone())).await?;
        }
    }

    Ok(req)
}

/// Runs a handler which takes the request by value. On failure the request is rebuilt from a snapshot of its head so
/// the walk can go on with the error.
async fn guarded<B, E, T, F>(req: Request<B>, call: F) -> Result<T, Failure<B>>
where
    B: Default,
    E: Into<RouteError>,
    F: FnOnce(Request<B>) -> Box<dyn Future<Output = Result<T, E>> + Send + 'static>,
{
    let head = RequestHead::of(&req);

    let outcome = AssertUnwindSafe(async move { Pin::from(call(req)).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err((head.into_request(), e.into())),
        Err(panic) => Err((head.into_request(), error::from_panic(panic))),
    }
}
