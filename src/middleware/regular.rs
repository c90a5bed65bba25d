use crate::dispatch::{Handler, HandlerReturn, Next};
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;

/// The regular middleware type. Refer to [Middleware](./index.html#middleware) for more info.
///
/// A regular middleware is skipped while an error travels down the stack.
pub struct RegularMiddleware<B, E> {
    pub(crate) path: String,
    pub(crate) handler: Handler<B, E>,
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> RegularMiddleware<B, E> {
    /// Creates a regular middleware with a handler at the specified path.
    pub fn new<P, H, R>(path: P, handler: H) -> RegularMiddleware<B, E>
    where
        P: Into<String>,
        H: Fn(Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        let handler: Handler<B, E> =
            Box::new(move |req: Request<B>, next: Next<B, E>| -> HandlerReturn<E> { Box::new(handler(req, next)) });

        RegularMiddleware {
            path: path.into(),
            handler,
        }
    }
}

impl<B, E> Debug for RegularMiddleware<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ path: {:?} }}", self.path)
    }
}
