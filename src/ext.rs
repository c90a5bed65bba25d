//! Extension traits which add routing accessors to [`hyper::Request`].

use crate::types::{DispatchState, OriginalUrl, RemoteAddr, RouteParams};
use hyper::Request;
use std::net::SocketAddr;

lazy_static::lazy_static! {
    static ref EMPTY_PARAMS: RouteParams = RouteParams::new();
}

/// A extension trait which extends the [`hyper::Request`](https://docs.rs/hyper/1/hyper/struct.Request.html) type with some helpful methods.
pub trait RequestExt {
    /// It returns the route parameters as [RouteParams](../struct.RouteParams.html) type with the name of the parameter specified in the path as their respective keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Response};
    /// use strata::ext::RequestExt;
    /// use strata::{Error, Router};
    ///
    /// # fn run() -> Router<Full<Bytes>, Error> {
    /// let router = Router::builder()
    ///     .get("/users/:userName/books/:bookName", |req, _| async move {
    ///         let params = req.params();
    ///         let user_name = params.get("userName").unwrap();
    ///         let book_name = params.get("bookName").unwrap();
    ///
    ///         Ok(Response::new(Full::new(Bytes::from(format!(
    ///             "Username: {}, Book Name: {}",
    ///             user_name, book_name
    ///         )))))
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # router
    /// # }
    /// # run();
    /// ```
    fn params(&self) -> &RouteParams;

    /// It returns the route parameter value by the name of the parameter specified in the path.
    fn param<P: Into<String>>(&self, param_name: P) -> Option<&String>;

    /// The request path relative to the mount point of the router currently handling the request.
    fn path(&self) -> &str;

    /// The part of the request path consumed by the mount points and middleware paths traversed so far.
    fn base_url(&self) -> &str;

    /// The request target (path and query) as it was received.
    fn original_url(&self) -> &str;

    /// The remote address of the peer, when the request came in through a [`RouterService`](../struct.RouterService.html).
    fn remote_addr(&self) -> Option<SocketAddr>;
}

impl<B> RequestExt for Request<B> {
    fn params(&self) -> &RouteParams {
        self.extensions()
            .get::<DispatchState>()
            .map(|state| &state.params)
            .unwrap_or(&EMPTY_PARAMS)
    }

    fn param<P: Into<String>>(&self, param_name: P) -> Option<&String> {
        self.params().get(&param_name.into())
    }

    fn path(&self) -> &str {
        match self.extensions().get::<DispatchState>() {
            Some(state) => state.path.as_str(),
            None => self.uri().path(),
        }
    }

    fn base_url(&self) -> &str {
        self.extensions()
            .get::<DispatchState>()
            .map(|state| state.base_url.as_str())
            .unwrap_or("")
    }

    fn original_url(&self) -> &str {
        match self.extensions().get::<OriginalUrl>() {
            Some(url) => url.0.as_str(),
            None => self.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/"),
        }
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.extensions().get::<RemoteAddr>().map(|addr| addr.0)
    }
}
