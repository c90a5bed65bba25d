use std::collections::hash_map::{Iter, Keys};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::net::SocketAddr;

/// Represents a map of the route parameters using the name of the parameter specified in the path as their respective keys.
///
/// Please refer to the [Route Parameters](./index.html#route-parameters) section for more info.
///
/// **Note:** This type shouldn't be created directly. It will be populated into the `req` object of the route handler and
/// can be accessed as `req.params()`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    /// Creates an empty route parameters map.
    pub fn new() -> RouteParams {
        RouteParams(HashMap::new())
    }

    /// Creates an empty route parameters map with the capacity of `capacity`.
    pub fn with_capacity(capacity: usize) -> RouteParams {
        RouteParams(HashMap::with_capacity(capacity))
    }

    /// Sets a new parameter entry with the specified key and the value.
    pub fn set<N: Into<String>, V: Into<String>>(&mut self, param_name: N, param_val: V) {
        self.0.insert(param_name.into(), param_val.into());
    }

    /// Returns the route parameter value mapped with the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Response};
    /// use strata::prelude::*;
    /// use strata::{Error, Router};
    ///
    /// # fn run() -> Router<Full<Bytes>, Error> {
    /// let router = Router::builder()
    ///     .get("/users/:userName/books/:bookName", |req, _| async move {
    ///         let params = req.params();
    ///
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
    pub fn get<N: AsRef<str>>(&self, param_name: N) -> Option<&String> {
        self.0.get(param_name.as_ref())
    }

    /// Checks if a route parameter exists.
    pub fn has<N: AsRef<str>>(&self, param_name: N) -> bool {
        self.0.contains_key(param_name.as_ref())
    }

    /// Returns the length of the route parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no route parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an [Iterator](https://doc.rust-lang.org/std/collections/hash_map/struct.Keys.html) over the parameter names.
    pub fn params_names(&self) -> Keys<'_, String, String> {
        self.0.keys()
    }

    /// Returns an [Iterator](https://doc.rust-lang.org/std/collections/hash_map/struct.Iter.html) over the parameter entries
    /// as `(parameter_name: &String, parameter_value: &String)`.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }

    /// Copies every entry of `other` into this map. Entries of `other` win on name collision.
    pub(crate) fn extend(&mut self, other: RouteParams) {
        self.0.extend(other.0);
    }
}

impl Debug for RouteParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// The per-request routing state the dispatcher threads through the stack.
///
/// It lives in the request extensions and is replaced (never mutated in place) whenever a layer
/// rewrites it, so that the previous value can be put back once the layer hands control on.
#[derive(Debug, Clone, Default)]
pub(crate) struct DispatchState {
    /// The request path relative to the current mount point.
    pub(crate) path: String,
    /// The accumulated mount prefix.
    pub(crate) base_url: String,
    pub(crate) params: RouteParams,
}

impl DispatchState {
    pub(crate) fn new<P: Into<String>>(path: P) -> DispatchState {
        DispatchState {
            path: path.into(),
            base_url: String::new(),
            params: RouteParams::new(),
        }
    }
}

/// The request target as it was received, before any mount point stripped it.
#[derive(Debug, Clone)]
pub(crate) struct OriginalUrl(pub(crate) String);

#[derive(Debug, Clone, Copy)]
pub(crate) struct RemoteAddr(pub(crate) SocketAddr);
