use crate::dispatch::Next;
use crate::layer::{Layer, LayerKind};
use crate::middleware::Middleware;
use crate::param::ParamRegistry;
use crate::route::Route;
use crate::router::{Router, RouterInner, RouterOptions};
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::future::Future;
use std::sync::Arc;

enum Registration<B, E> {
    Middleware(Middleware<B, E>),
    Route(String, Route<B, E>),
    Scope(String, Router<B, E>),
}

struct BuilderInner<B, E> {
    registrations: Vec<Registration<B, E>>,
    params: ParamRegistry<B, E>,
    options: RouterOptions,
}

/// Builder for the [Router](./struct.Router.html) type.
///
/// This `RouterBuilder<B, E>` type accepts two type parameters: `B` and `E`.
///
/// * The `B` represents the request body type.
/// * The `E` represents any error type which will be used by route handlers and the middlewares. This error type must be
///   convertible into a [RouteError](./type.RouteError.html).
///
/// Paths are compiled when [`build`](#method.build) is called, with the options in effect at that time.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Request, Response};
/// use strata::{Error, Next, Router, RouterBuilder};
///
/// async fn home_handler(_: Request<Full<Bytes>>, _: Next<Full<Bytes>, Error>) -> Result<Response<Full<Bytes>>, Error> {
///     Ok(Response::new(Full::new(Bytes::from("home"))))
/// }
///
/// # fn run() -> Router<Full<Bytes>, Error> {
/// // Use Router::builder() method to create a new RouterBuilder instance.
/// // We will use this builder instance to create a router.
/// let router = Router::builder()
///     .get("/", home_handler)
///     .build()
///     .unwrap();
/// # router
/// # }
/// # run();
/// ```
pub struct RouterBuilder<B, E> {
    inner: crate::Result<BuilderInner<B, E>>,
}

impl<B: Default + Send + 'static, E: Into<RouteError> + 'static> RouterBuilder<B, E> {
    /// Creates a new `RouterBuilder` instance with default options.
    pub fn new() -> RouterBuilder<B, E> {
        RouterBuilder::default()
    }

    /// Creates a new [Router](./struct.Router.html) instance from the added configuration.
    ///
    /// It fails if a path can't be compiled, e.g. a path which doesn't start with `/` or which declares the same
    /// parameter twice.
    pub fn build(self) -> crate::Result<Router<B, E>> {
        self.inner.and_then(|inner| {
            let options = inner.options;

            let stack = inner
                .registrations
                .into_iter()
                .map(|registration| match registration {
                    Registration::Middleware(m) => {
                        let path = m.path().to_owned();
                        Layer::new(&path, LayerKind::Middleware(m), &options)
                    }
                    Registration::Route(path, route) => Layer::new(&path, LayerKind::Route(route), &options),
                    Registration::Scope(path, router) => Layer::new(&path, LayerKind::Scope(router), &options),
                })
                .collect::<crate::Result<Vec<_>>>()?;

            Ok(Router {
                inner: Arc::new(RouterInner {
                    stack,
                    params: inner.params,
                    options,
                }),
            })
        })
    }

    fn and_then<F>(self, func: F) -> Self
    where
        F: FnOnce(BuilderInner<B, E>) -> crate::Result<BuilderInner<B, E>>,
    {
        RouterBuilder {
            inner: self.inner.and_then(func),
        }
    }

    /// Sets the options used to compile the paths of this router.
    pub fn with_options(self, options: RouterOptions) -> Self {
        self.and_then(move |mut inner| {
            inner.options = options;
            Ok(inner)
        })
    }

    /// Adds a middleware to the stack. Please refer to the [Middleware](./index.html#middleware) for more info.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::body::Bytes;
    /// use strata::prelude::*;
    /// use strata::{Error, Middleware, Router};
    ///
    /// # fn run() -> Router<Full<Bytes>, Error> {
    /// let router = Router::builder()
    ///     .middleware(Middleware::new(|req, next| async move {
    ///         println!("{} {}", req.method(), req.original_url());
    ///         Ok(next.run(req).await)
    ///     }))
    ///     .build()
    ///     .unwrap();
    /// # router
    /// # }
    /// # run();
    /// ```
    pub fn middleware(self, m: Middleware<B, E>) -> Self {
        self.and_then(move |mut inner| {
            inner.registrations.push(Registration::Middleware(m));
            Ok(inner)
        })
    }

    /// Adds a route for `path` and configures its handlers on the provided [Route](./struct.Route.html).
    ///
    /// All handlers of the route share one stack position, so param hooks run once for them.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Response};
    /// use strata::{Error, Router};
    ///
    /// # fn run() -> Router<Full<Bytes>, Error> {
    /// let router = Router::builder()
    ///     .route("/book", |route| {
    ///         route
    ///             .get(|_, _| async move { Ok(Response::new(Full::new(Bytes::from("Get a book")))) })
    ///             .put(|_, _| async move { Ok(Response::new(Full::new(Bytes::from("Update the book")))) })
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # router
    /// # }
    /// # run();
    /// ```
    pub fn route<P, F>(self, path: P, configure: F) -> Self
    where
        P: Into<String>,
        F: FnOnce(Route<B, E>) -> Route<B, E>,
    {
        let path = path.into();
        self.and_then(move |mut inner| {
            inner.registrations.push(Registration::Route(path, configure(Route::new())));
            Ok(inner)
        })
    }

    /// Adds a new route with `GET` method and the handler at the specified path.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Response};
    /// use strata::{Error, Router};
    ///
    /// # fn run() -> Router<Full<Bytes>, Error> {
    /// let router = Router::builder()
    ///     .get("/", |_, _| async move { Ok(Response::new(Full::new(Bytes::from("Hello world!")))) })
    ///     .build()
    ///     .unwrap();
    /// # router
    /// # }
    /// # run();
    /// ```
    pub fn get<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.get(handler))
    }

    /// Adds a new route with `POST` method and the handler at the specified path.
    pub fn post<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.post(handler))
    }

    /// Adds a new route with `PUT` method and the handler at the specified path.
    pub fn put<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.put(handler))
    }

    /// Adds a new route with `PATCH` method and the handler at the specified path.
    pub fn patch<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.patch(handler))
    }

    /// Adds a new route with `DELETE` method and the handler at the specified path.
    pub fn delete<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.delete(handler))
    }

    /// Adds a new route with `HEAD` method and the handler at the specified path.
    ///
    /// A `GET` route serves `HEAD` requests on its own, so this is only needed to answer them differently.
    pub fn head<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.head(handler))
    }

    /// Adds a new route with `OPTIONS` method and the handler at the specified path.
    ///
    /// Without it, an `OPTIONS` request is answered with the methods routed for the path.
    pub fn options<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.options(handler))
    }

    /// Adds a new route with all the http methods and the handler at the specified path.
    pub fn all<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.all(handler))
    }

    /// Adds a new route with the specified method(s) and the handler at the specified path. It can be used to define
    /// routes with multiple method types.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Method, Response};
    /// use strata::{Error, Router};
    ///
    /// # fn run() -> Router<Full<Bytes>, Error> {
    /// let router = Router::builder()
    ///     .add("/", vec![Method::GET, Method::POST], |_, _| async move {
    ///         Ok(Response::new(Full::new(Bytes::from("Hello world!"))))
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # router
    /// # }
    /// # run();
    /// ```
    pub fn add<P, H, R>(self, path: P, methods: Vec<Method>, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.route(path, move |route| route.methods(methods, handler))
    }

    /// Registers a hook which runs before any layer of this router whose path declares the parameter `name`.
    ///
    /// The hook receives the request, the decoded parameter value and the parameter name. Returning the request hands
    /// it on, returning an error skips the layer and sends the error down the stack. Hooks only apply to the layers of
    /// this router, not to those of a parent or of mounted routers.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Response, StatusCode};
    /// use strata::prelude::*;
    /// use strata::{Error, Router};
    ///
    /// #[derive(Clone)]
    /// struct UserId(u64);
    ///
    /// # fn run() -> Router<Full<Bytes>, Error> {
    /// let router = Router::builder()
    ///     .param("id", |mut req, value, _name| async move {
    ///         let id = match value.parse() {
    ///             Ok(id) => id,
    ///             Err(_) => return Err(Error::with_status(StatusCode::BAD_REQUEST, "Invalid user id")),
    ///         };
    ///         req.extensions_mut().insert(UserId(id));
    ///         Ok(req)
    ///     })
    ///     .get("/users/:id", |req, _| async move {
    ///         let id = req.extensions().get::<UserId>().unwrap().0;
    ///         Ok(Response::new(Full::new(Bytes::from(format!("User {}", id)))))
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # router
    /// # }
    /// # run();
    /// ```
    pub fn param<N, H, R>(self, name: N, handler: H) -> Self
    where
        N: Into<String>,
        H: Fn(Request<B>, String, String) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Request<B>, E>> + Send + 'static,
    {
        let name = name.into();
        self.and_then(move |mut inner| {
            inner.params.register(name, handler);
            Ok(inner)
        })
    }

    /// Mounts a router at `path`. Please refer to the [Scoping/Mounting Router](./index.html#scopingmounting-router)
    /// section for more info.
    ///
    /// Inside the mounted router, `req.path()` is relative to `path` and `req.base_url()` ends with it. Requests the
    /// mounted router doesn't answer continue with the next entry of this router.
    pub fn scope<P>(self, path: P, router: Router<B, E>) -> Self
    where
        P: Into<String>,
    {
        let path = path.into();
        self.and_then(move |mut inner| {
            inner.registrations.push(Registration::Scope(path, router));
            Ok(inner)
        })
    }
}

impl<B: Default + Send + 'static, E: Into<RouteError> + 'static> Default for RouterBuilder<B, E> {
    fn default() -> Self {
        RouterBuilder {
            inner: Ok(BuilderInner {
                registrations: Vec::new(),
                params: ParamRegistry::new(),
                options: RouterOptions::default(),
            }),
        }
    }
}
