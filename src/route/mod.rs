use crate::dispatch::{Handler, HandlerReturn, Next};
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;

struct Entry<B, E> {
    // `None` handles every method.
    methods: Option<Vec<Method>>,
    handler: Handler<B, E>,
}

/// Represents the handlers of a single route path.
///
/// A route consists of an ordered list of handlers, each bound to one or more http methods. It shouldn't be created
/// directly, use the [RouterBuilder](./struct.RouterBuilder.html) methods to create a route. The
/// [`route`](./struct.RouterBuilder.html#method.route) method hands it out to chain several verbs on the same path.
///
/// This `Route<B, E>` type accepts two type parameters: `B` and `E`.
///
/// * The `B` represents the request body type.
/// * The `E` represents any error type which will be used by route handlers and the middlewares. This error type must be
///   convertible into a [RouteError](./type.RouteError.html).
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Response};
/// use strata::{Error, Router};
///
/// fn run() -> Router<Full<Bytes>, Error> {
///     Router::builder()
///         .route("/resource", |route| {
///             route
///                 .get(|_, _| async move { Ok(Response::new(Full::new(Bytes::from("read")))) })
///                 .post(|_, _| async move { Ok(Response::new(Full::new(Bytes::from("created")))) })
///         })
///         .build()
///         .unwrap()
/// }
/// # run();
/// ```
pub struct Route<B, E> {
    entries: Vec<Entry<B, E>>,
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> Route<B, E> {
    pub(crate) fn new() -> Route<B, E> {
        Route { entries: Vec::new() }
    }

    fn push<H, R>(mut self, methods: Option<Vec<Method>>, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        let handler: Handler<B, E> =
            Box::new(move |req: Request<B>, next: Next<B, E>| -> HandlerReturn<E> { Box::new(handler(req, next)) });
        self.entries.push(Entry { methods, handler });
        self
    }

    /// Adds a handler for the given http methods.
    pub fn methods<H, R>(self, methods: Vec<Method>, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.push(Some(methods), handler)
    }

    /// Adds a handler for every http method.
    pub fn all<H, R>(self, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.push(None, handler)
    }

    /// Adds a handler for `GET` requests. It also serves `HEAD` requests unless the route has a `HEAD` handler.
    pub fn get<H, R>(self, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.methods(vec![Method::GET], handler)
    }

    /// Adds a handler for `POST` requests.
    pub fn post<H, R>(self, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.methods(vec![Method::POST], handler)
    }

    /// Adds a handler for `PUT` requests.
    pub fn put<H, R>(self, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.methods(vec![Method::PUT], handler)
    }

    /// Adds a handler for `PATCH` requests.
    pub fn patch<H, R>(self, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.methods(vec![Method::PATCH], handler)
    }

    /// Adds a handler for `DELETE` requests.
    pub fn delete<H, R>(self, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.methods(vec![Method::DELETE], handler)
    }

    /// Adds a handler for `HEAD` requests.
    pub fn head<H, R>(self, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.methods(vec![Method::HEAD], handler)
    }

    /// Adds a handler for `OPTIONS` requests.
    pub fn options<H, R>(self, handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.methods(vec![Method::OPTIONS], handler)
    }
}

impl<B, E> Route<B, E> {
    fn has_explicit(&self, method: &Method) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry.methods, Some(ref list) if list.contains(method)))
    }

    fn entry_handles(&self, entry: &Entry<B, E>, method: &Method) -> bool {
        match entry.methods {
            None => true,
            Some(ref list) if list.contains(method) => true,
            Some(ref list) => {
                *method == Method::HEAD && list.contains(&Method::GET) && !self.has_explicit(&Method::HEAD)
            }
        }
    }

    /// Position of the first handler at or after `from` that handles `method`.
    pub(crate) fn position(&self, method: &Method, from: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, entry)| self.entry_handles(entry, method))
            .map(|(idx, _)| idx)
    }

    pub(crate) fn handles_method(&self, method: &Method) -> bool {
        self.position(method, 0).is_some()
    }

    pub(crate) fn handler(&self, pos: usize) -> Option<&Handler<B, E>> {
        self.entries.get(pos).map(|entry| &entry.handler)
    }

    /// The explicitly routed methods in registration order, `HEAD` implied by `GET`.
    pub(crate) fn allowed_methods(&self) -> Vec<Method> {
        let mut allowed: Vec<Method> = Vec::new();

        for method in self.entries.iter().filter_map(|entry| entry.methods.as_ref()).flatten() {
            if !allowed.contains(method) {
                allowed.push(method.clone());
            }
        }

        if !allowed.contains(&Method::HEAD) {
            if let Some(idx) = allowed.iter().position(|m| *m == Method::GET) {
                allowed.insert(idx + 1, Method::HEAD);
            }
        }

        allowed
    }
}

impl<B, E> Debug for Route<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let methods: Vec<_> = self.entries.iter().map(|entry| &entry.methods).collect();
        write!(f, "{{ methods: {:?} }}", methods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    type TestRoute = Route<Full<Bytes>, Error>;

    fn route() -> TestRoute {
        Route::new()
    }

    #[test]
    fn head_falls_back_to_get() {
        let r = route().get(|_, _| async move { Ok(Response::new(Full::new(Bytes::new()))) });
        assert!(r.handles_method(&Method::GET));
        assert!(r.handles_method(&Method::HEAD));
        assert!(!r.handles_method(&Method::POST));
        assert_eq!(r.allowed_methods(), vec![Method::GET, Method::HEAD]);
    }

    #[test]
    fn explicit_head_wins_over_get() {
        let r = route()
            .get(|_, _| async move { Ok(Response::new(Full::new(Bytes::new()))) })
            .head(|_, _| async move { Ok(Response::new(Full::new(Bytes::new()))) });
        assert_eq!(r.position(&Method::HEAD, 0), Some(1));
        assert_eq!(r.allowed_methods(), vec![Method::GET, Method::HEAD]);
    }

    #[test]
    fn position_skips_entries_for_other_methods() {
        let r = route()
            .get(|_, _| async move { Ok(Response::new(Full::new(Bytes::new()))) })
            .post(|_, _| async move { Ok(Response::new(Full::new(Bytes::new()))) })
            .all(|_, _| async move { Ok(Response::new(Full::new(Bytes::new()))) });
        assert_eq!(r.position(&Method::POST, 0), Some(1));
        assert_eq!(r.position(&Method::POST, 2), Some(2));
        assert_eq!(r.position(&Method::GET, 1), Some(2));
        assert_eq!(r.position(&Method::GET, 3), None);
        assert!(r.handles_method(&Method::DELETE));
        assert_eq!(r.allowed_methods(), vec![Method::GET, Method::HEAD, Method::POST]);
    }
}
