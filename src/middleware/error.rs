use crate::dispatch::{ErrorHandler, HandlerReturn, Next};
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;

/// The error middleware type. Refer to [Error Handling](./index.html#error-handling) for more info.
///
/// An error middleware only runs while an error travels down the stack. It can answer the request, hand the error on
/// with [`Next::raise`](./struct.Next.html#method.raise) (or by returning `Err`) or recover by calling
/// [`Next::run`](./struct.Next.html#method.run).
pub struct ErrorMiddleware<B, E> {
    pub(crate) path: String,
    pub(crate) handler: ErrorHandler<B, E>,
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> ErrorMiddleware<B, E> {
    /// Creates an error middleware with a handler at the specified path.
    pub fn new<P, H, R>(path: P, handler: H) -> ErrorMiddleware<B, E>
    where
        P: Into<String>,
        H: Fn(RouteError, Request<B>, Next<B, E>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        let handler: ErrorHandler<B, E> = Box::new(
            move |err: RouteError, req: Request<B>, next: Next<B, E>| -> HandlerReturn<E> {
                Box::new(handler(err, req, next))
            },
        );

        ErrorMiddleware {
            path: path.into(),
            handler,
        }
    }
}

impl<B, E> Debug for ErrorMiddleware<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ path: {:?} }}", self.path)
    }
}
