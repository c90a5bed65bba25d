use hyper::Request;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;

pub(crate) type ParamHandler<B, E> =
    Box<dyn Fn(Request<B>, String, String) -> ParamHandlerReturn<B, E> + Send + Sync + 'static>;
pub(crate) type ParamHandlerReturn<B, E> = Box<dyn Future<Output = Result<Request<B>, E>> + Send + 'static>;

/// Preprocessing hooks keyed by route parameter name.
///
/// Each router owns its own registry: hooks registered on a router never run for the layers of its parent or of the
/// routers mounted into it.
pub(crate) struct ParamRegistry<B, E> {
    handlers: HashMap<String, Vec<ParamHandler<B, E>>>,
}

impl<B: Send + 'static, E: 'static> ParamRegistry<B, E> {
    pub(crate) fn new() -> Self {
        ParamRegistry {
            handlers: HashMap::new(),
        }
    }

    pub(crate) fn register<N, H, R>(&mut self, name: N, handler: H)
    where
        N: Into<String>,
        H: Fn(Request<B>, String, String) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Request<B>, E>> + Send + 'static,
    {
        let handler: ParamHandler<B, E> = Box::new(move |req: Request<B>, value: String, name: String| {
            Box::new(handler(req, value, name)) as ParamHandlerReturn<B, E>
        });

        self.handlers.entry(name.into()).or_default().push(handler);
    }
}

impl<B, E> ParamRegistry<B, E> {
    /// The hooks for `name` in registration order.
    pub(crate) fn handlers(&self, name: &str) -> &[ParamHandler<B, E>] {
        self.handlers.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<B, E> Debug for ParamRegistry<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.iter().map(|(name, list)| (name, list.len())).collect();
        names.sort();
        write!(f, "{:?}", names)
    }
}
