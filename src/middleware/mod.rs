use crate::dispatch::Next;
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::future::Future;

pub use self::error::ErrorMiddleware;
pub use self::regular::RegularMiddleware;

mod error;
mod regular;

/// Enum type for all the middleware types. Please refer to the [Middleware](./index.html#middleware) for more info.
///
/// A middleware is mounted at a path and runs for that path and everything below it. Which variant a middleware is
/// decides when it runs: regular middleware runs while the request is healthy, error middleware only once a previous
/// handler failed.
///
/// This `Middleware<B, E>` type accepts two type parameters: `B` and `E`.
///
/// * The `B` represents the request body type.
/// * The `E` represents any error type which will be used by route handlers and the middlewares. This error type must be
///   convertible into a [RouteError](./type.RouteError.html).
#[derive(Debug)]
pub enum Middleware<B, E> {
    /// Variant for the regular middleware.
    Regular(RegularMiddleware<B, E>),

    /// Variant for the error middleware, which receives the error raised further up the stack.
    Error(ErrorMiddleware<B, E>),
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> Middleware<B, E> {
    /// Creates a regular middleware which runs for every path.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::body::Bytes;
    /// use strata::{Error, Middleware, Router};
    ///
    /// fn run() -> Router<Full<Bytes>, Error> {
    ///     let router = Router::builder()
    ///         .middleware(Middleware::new(|req, next| async move {
    ///             /* Do some operations */
    ///             Ok(next.run(req).await)
    ///         }))
    ///         .build()
    ///         .unwrap();
    ///     router
    /// }
    /// # run();
    /// ```
    pub fn new<H, R>(handler: H) -> Middleware<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        Middleware::with_path("/", handler)
    }

    /// Creates a regular middleware which runs for `path` and every path below it.
    ///
    /// Inside the handler, `req.path()` is relative to `path` and `req.base_url()` ends with it.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::body::Bytes;
    /// use strata::{Error, Middleware, Router};
    ///
    /// fn run() -> Router<Full<Bytes>, Error> {
    ///     let router = Router::builder()
    ///         .middleware(Middleware::with_path("/admin", |req, next| async move {
    ///             /* Check the credentials */
    ///             Ok(next.run(req).await)
    ///         }))
    ///         .build()
    ///         .unwrap();
    ///     router
    /// }
    /// # run();
    /// ```
    pub fn with_path<P, H, R>(path: P, handler: H) -> Middleware<B, E>
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        Middleware::Regular(RegularMiddleware::new(path, handler))
    }

    /// Creates an error middleware which runs for every path.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Response, StatusCode};
    /// use strata::{Error, Middleware, Router};
    ///
    /// fn run() -> Router<Full<Bytes>, Error> {
    ///     let router = Router::builder()
    ///         .middleware(Middleware::error(|err, _req, _next| async move {
    ///             let mut res = Response::new(Full::new(Bytes::from(format!("Something went wrong: {}", err))));
    ///             *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    ///             Ok(res)
    ///         }))
    ///         .build()
    ///         .unwrap();
    ///     router
    /// }
    /// # run();
    /// ```
    pub fn error<H, R>(handler: H) -> Middleware<B, E>
    where
        H: Fn(RouteError, Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        Middleware::error_with_path("/", handler)
    }

    /// Creates an error middleware which runs for `path` and every path below it.
    pub fn error_with_path<P, H, R>(path: P, handler: H) -> Middleware<B, E>
    where
        P: Into<String>,
        H: Fn(RouteError, Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        Middleware::Error(ErrorMiddleware::new(path, handler))
    }
}

impl<B, E> Middleware<B, E> {
    pub(crate) fn path(&self) -> &str {
        match self {
            Middleware::Regular(m) => &m.path,
            Middleware::Error(m) => &m.path,
        }
    }
}
