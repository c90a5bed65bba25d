//! `strata` provides an ordered, layered request router for the Rust HTTP library [hyper](https://hyper.rs/), in the
//! style of Express.
//!
//! Core features:
//!
//! - An ordered stack of middleware, routes and mounted routers, which a request walks from top to bottom
//!
//! - Every handler receives a [Next] continuation and decides whether to answer or to pass the request on
//!
//! - Express-style route paths with named, optional and wildcard parameters
//!
//! - Param hooks which preprocess a route parameter before the handlers which declare it
//!
//! - Error middleware which only runs once something failed, and which can recover
//!
//! - Mountable routers with `base_url` / `path` rewriting
//!
//! ## Basic Example
//!
//! A simple application would look like the following:
//!
//! ```no_run
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response, StatusCode};
//! // Import the strata prelude traits.
//! use strata::prelude::*;
//! use strata::{Application, Body, Error, Middleware, Router, Settings};
//!
//! fn router(settings: &Settings) -> strata::Result<Router<Body, Error>> {
//!     Router::builder()
//!         .with_options(settings.router_options())
//!         // A middleware which logs every request.
//!         .middleware(Middleware::new(|req, next| async move {
//!             println!("{} {}", req.method(), req.original_url());
//!             Ok(next.run(req).await)
//!         }))
//!         .get("/", |_, _| async move { Ok(Response::new(Full::new(Bytes::from("Home page")))) })
//!         .get("/users/:userId", |req, _| async move {
//!             let user_id = req.param("userId").unwrap();
//!             Ok(Response::new(Full::new(Bytes::from(format!("Hello {}", user_id)))))
//!         })
//!         // An error middleware which turns every error into a response.
//!         .middleware(Middleware::error(|err, _, _| async move {
//!             let mut res = Response::new(Full::new(Bytes::from(format!("Something went wrong: {}", err))));
//!             *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
//!             Ok(res)
//!         }))
//!         .build()
//! }
//!
//! #[tokio::main]
//! async fn main() -> strata::Result<()> {
//!     let settings = Settings::from_env();
//!     let app = Application::new(settings, router(&settings)?);
//!     app.listen("127.0.0.1:3001").await
//! }
//! ```
//!
//! ## Routing
//!
//! ### Route Handlers
//!
//! A handler is a function or a closure which receives the request and the [Next] continuation, and resolves to a
//! response or an error.
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Request, Response};
//! use strata::{Error, Next, Router};
//!
//! async fn home_handler(_: Request<Full<Bytes>>, _: Next<Full<Bytes>, Error>) -> Result<Response<Full<Bytes>>, Error> {
//!     Ok(Response::new(Full::new(Bytes::from("Home page"))))
//! }
//!
//! # fn run() -> Router<Full<Bytes>, Error> {
//! let router = Router::builder()
//!     .get("/", home_handler)
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! A handler which doesn't want to answer calls `next.run(req)`: the request goes on to the next entry of the stack
//! which matches. A handler which returns an error hands the error on, as if it had called `next.raise(req, err)`. A
//! handler which panics is treated the same way.
//!
//! ### Route Paths
//!
//! Route paths, like `/home`, `/users/:userId` or `/files/*`, are compiled into regular expressions. Matching is case
//! insensitive and tolerates a trailing slash unless [RouterOptions] say otherwise.
//!
//! - `:name` matches one non-empty path segment and captures it.
//! - `:name?` after a `/` makes the segment and its slash optional.
//! - `*` matches anything, including `/`, and is captured as `0`, `1`, ... in declaration order.
//!
//! Routes match the whole path. Middleware and mounted routers match the path and everything below it, at a segment
//! boundary: a middleware at `/api` runs for `/api` and `/api/users`, not for `/apiv2`.
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response};
//! use strata::prelude::*;
//! use strata::{Error, Router};
//!
//! # fn run() -> Router<Full<Bytes>, Error> {
//! let router = Router::builder()
//!     .get("/files/*", |req, _| async move {
//!         Ok(Response::new(Full::new(Bytes::from(format!("File: {}", req.param("0").unwrap())))))
//!     })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! #### Handle 404 Pages
//!
//! A request which no handler answers gets a `404 Not Found` response with the body `Cannot {METHOD} {path}`. To
//! answer it differently, add a catch-all middleware at the end of the stack:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response, StatusCode};
//! use strata::{Error, Middleware, Router};
//!
//! # fn run() -> Router<Full<Bytes>, Error> {
//! let router = Router::builder()
//!     .get("/", |_, _| async move { Ok(Response::new(Full::new(Bytes::from("Home page")))) })
//!     .middleware(Middleware::new(|_, _| async move {
//!         let mut res = Response::new(Full::new(Bytes::from("NOT FOUND")));
//!         *res.status_mut() = StatusCode::NOT_FOUND;
//!         Ok(res)
//!     }))
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ### Route Parameters
//!
//! Captured parameters are URI-decoded strings, available through [`req.params()`](./ext/trait.RequestExt.html#tymethod.params)
//! and [`req.param(name)`](./ext/trait.RequestExt.html#tymethod.param). Param hooks registered with
//! [`RouterBuilder::param`] run before every matched entry of the router which declares the parameter.
//!
//! ### Scoping/Mounting Router
//!
//! A router can be mounted into another one with [`RouterBuilder::scope`]. Inside the mounted router, the mount point is
//! stripped from `req.path()` and appended to `req.base_url()`, while `req.original_url()` keeps the full url:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response};
//! use strata::prelude::*;
//! use strata::{Error, Router};
//!
//! fn api_router() -> Router<Full<Bytes>, Error> {
//!     Router::builder()
//!         .get("/users", |req, _| async move {
//!             // For "/api/users": base_url is "/api", path is "/users".
//!             let text = format!("{} {} {}", req.base_url(), req.path(), req.original_url());
//!             Ok(Response::new(Full::new(Bytes::from(text))))
//!         })
//!         .build()
//!         .unwrap()
//! }
//!
//! # fn run() -> Router<Full<Bytes>, Error> {
//! let router = Router::builder()
//!     .scope("/api", api_router())
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! When the mounted router doesn't answer a request, the parent stack continues after the mount point, with whatever
//! error the mounted router left pending.
//!
//! ## Middleware
//!
//! A [Middleware] runs for its path and all paths below it (`/` by default). It receives the request and the [Next]
//! continuation, so it can run code before the rest of the stack, change the response produced further down, or
//! answer on its own.
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, header::HeaderValue};
//! use strata::{Error, Middleware, Router};
//!
//! # fn run() -> Router<Full<Bytes>, Error> {
//! let router = Router::builder()
//!     .middleware(Middleware::new(|req, next| async move {
//!         let mut res = next.run(req).await;
//!         res.headers_mut().insert("x-powered-by", HeaderValue::from_static("strata"));
//!         Ok(res)
//!     }))
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ## Error Handling
//!
//! Once a handler fails, regular middleware and routes are skipped and only [error middleware](Middleware::error)
//! runs. It receives the error as a [RouteError], which can be downcast to the error type the handler returned. Calling
//! `next.run(req)` from an error middleware recovers: the error is dropped and the walk continues with regular
//! handlers. An error nobody handles ends in a response with the error's status (see [Error::with_status]), `500
//! Internal Server Error` otherwise.
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response, StatusCode};
//! use strata::{Error, Middleware, Router};
//!
//! # fn run() -> Router<Full<Bytes>, Error> {
//! let router = Router::builder()
//!     .get("/admin", |_, _| async move { Err(Error::with_status(StatusCode::FORBIDDEN, "Access denied")) })
//!     .middleware(Middleware::error(|err, _, _| async move {
//!         let status = err.downcast_ref::<Error>().map(Error::status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
//!         let mut res = Response::new(Full::new(Bytes::from(err.to_string())));
//!         *res.status_mut() = status;
//!         Ok(res)
//!     }))
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```

pub use self::application::Application;
pub use self::dispatch::Next;
pub use self::error::{Error, RouteError};
pub use self::middleware::{ErrorMiddleware, Middleware, RegularMiddleware};
pub use self::route::Route;
pub use self::router::{Router, RouterBuilder, RouterOptions};
pub use self::service::{RequestService, RouterService};
pub use self::settings::{Env, Settings};
pub use self::types::RouteParams;

mod application;
mod dispatch;
mod error;
pub mod ext;
mod helpers;
mod layer;
mod middleware;
mod param;
pub mod prelude;
mod regex_generator;
mod route;
mod router;
mod service;
mod settings;
mod terminal;
mod types;

/// The request body type of the requests served by [Application] and [RouterService].
pub type Body = http_body_util::combinators::BoxBody<hyper::body::Bytes, hyper::Error>;

/// A Result type often returned from methods that can have `strata` errors.
pub type Result<T> = std::result::Result<T, Error>;
