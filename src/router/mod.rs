use crate::dispatch::Next;
use crate::helpers;
use crate::layer::Layer;
use crate::param::ParamRegistry;
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

pub use self::builder::RouterBuilder;

mod builder;

/// Options which control how a router compiles its paths and how it treats its mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    /// Treat `/Foo` and `/foo` as different paths. Defaults to `false`.
    pub case_sensitive: bool,
    /// Treat `/foo` and `/foo/` as different route paths. Defaults to `false`.
    pub strict: bool,
    /// Keep the params captured by the parent routers visible inside this router once it is mounted. A param captured
    /// inside this router wins over a parent param of the same name. Defaults to `true`.
    pub merge_params: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        RouterOptions {
            case_sensitive: false,
            strict: false,
            merge_params: true,
        }
    }
}

pub(crate) struct RouterInner<B, E> {
    pub(crate) stack: Vec<Layer<B, E>>,
    pub(crate) params: ParamRegistry<B, E>,
    pub(crate) options: RouterOptions,
}

/// Represents a modular, lightweight and mountable router type.
///
/// A router consists of an ordered stack of middleware, routes and mounted routers, plus its own param hooks. A request
/// is offered to the stack entries in the order they were registered. The router is cheap to clone and can be mounted
/// into several parents.
///
/// This `Router<B, E>` type accepts two type parameters: `B` and `E`.
///
/// * The `B` represents the request body type. It has to implement `Default`, which is used to rebuild a request after a
///   failing handler consumed it.
/// * The `E` represents any error type which will be used by route handlers and the middlewares. This error type must be
///   convertible into a [RouteError](./type.RouteError.html).
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Response};
/// use strata::prelude::*;
/// use strata::{Error, Router};
///
/// fn api_router() -> Router<Full<Bytes>, Error> {
///     Router::builder()
///         .get("/books", |_, _| async move { Ok(Response::new(Full::new(Bytes::from("List of books")))) })
///         .get("/books/:bookId", |req, _| async move {
///             Ok(Response::new(Full::new(Bytes::from(format!(
///                 "Show book: {}",
///                 req.param("bookId").unwrap()
///             )))))
///         })
///         .build()
///         .unwrap()
/// }
///
/// fn run() -> Router<Full<Bytes>, Error> {
///     Router::builder()
///         // Mounts the API router at "/api" path.
///         .scope("/api", api_router())
///         .build()
///         .unwrap()
/// }
/// # run();
/// ```
pub struct Router<B, E> {
    pub(crate) inner: Arc<RouterInner<B, E>>,
}

impl<B, E> Clone for Router<B, E> {
    fn clone(&self) -> Self {
        Router {
            inner: self.inner.clone(),
        }
    }
}

impl<B: Default + Send + 'static, E: Into<RouteError> + 'static> Router<B, E> {
    /// Return a [RouterBuilder](./struct.RouterBuilder.html) instance to build a `Router`.
    pub fn builder() -> RouterBuilder<B, E> {
        RouterBuilder::new()
    }

    /// Dispatches a request through the stack and resolves to the response.
    ///
    /// If nothing answers the request, a `404 Not Found` response is generated, and if an error is left unhandled, a
    /// response with the status of that error (`500 Internal Server Error` unless it is a [strata::Error](./struct.Error.html)
    /// with a status).
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Request, Response, StatusCode};
    /// use strata::{Error, Router};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let router: Router<Full<Bytes>, Error> = Router::builder()
    ///     .get("/", |_, _| async move { Ok(Response::new(Full::new(Bytes::from("home")))) })
    ///     .build()
    ///     .unwrap();
    ///
    /// let req = Request::builder().uri("/missing").body(Full::default()).unwrap();
    /// let res = router.handle(req).await;
    /// assert_eq!(res.status(), StatusCode::NOT_FOUND);
    /// # }
    /// ```
    pub async fn handle(&self, mut req: Request<B>) -> Response<Full<Bytes>> {
        helpers::init_dispatch_state(&mut req);
        Next::start(self.inner.clone(), req).await
    }

    /// The options this router was built with.
    pub fn options(&self) -> &RouterOptions {
        &self.inner.options
    }
}

impl<B, E> Debug for Router<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ stack: {:?}, params: {:?}, options: {:?} }}",
            self.inner.stack, self.inner.params, self.inner.options
        )
    }
}
