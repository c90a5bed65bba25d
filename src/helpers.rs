use crate::types::{DispatchState, OriginalUrl};
use http::request::Parts;
use hyper::Request;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

pub(crate) fn percent_decode_param(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(Cow::Borrowed(s)) => s.to_owned(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => raw.to_owned(),
    }
}

/// Makes sure the request carries a dispatch state and the original url. A request which already went through a router
/// keeps its state.
pub(crate) fn init_dispatch_state<B>(req: &mut Request<B>) {
    if req.extensions().get::<DispatchState>().is_some() {
        return;
    }

    let original_url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| String::from("/"));
    let path = req.uri().path().to_owned();

    req.extensions_mut().insert(OriginalUrl(original_url));
    req.extensions_mut().insert(DispatchState::new(path));
}

pub(crate) fn dispatch_state<B>(req: &Request<B>) -> DispatchState {
    req.extensions().get::<DispatchState>().cloned().unwrap_or_default()
}

pub(crate) fn set_dispatch_state<B>(req: &mut Request<B>, state: DispatchState) {
    req.extensions_mut().insert(state);
}

/// Computes the state seen by a prefix layer which consumed `prefix_len` bytes of the current path.
pub(crate) fn strip_prefix(state: &DispatchState, prefix_len: usize) -> DispatchState {
    let (removed, rest) = state.path.split_at(prefix_len.min(state.path.len()));

    let path = if rest.starts_with('/') {
        rest.to_owned()
    } else {
        format!("/{}", rest)
    };

    let mut base_url = String::with_capacity(state.base_url.len() + removed.len());
    base_url.push_str(&state.base_url);
    base_url.push_str(removed.strip_suffix('/').unwrap_or(removed));

    DispatchState {
        path,
        base_url,
        params: state.params.clone(),
    }
}

/// A copy of everything in a request but its body.
pub(crate) struct RequestHead(Parts);

impl RequestHead {
    pub(crate) fn of<B>(req: &Request<B>) -> RequestHead {
        let mut builder = Request::builder()
            .method(req.method().clone())
            .uri(req.uri().clone())
            .version(req.version());

        if let Some(headers) = builder.headers_mut() {
            *headers = req.headers().clone();
        }
        if let Some(extensions) = builder.extensions_mut() {
            *extensions = req.extensions().clone();
        }

        // The components were taken from a valid request, so the builder can't be in an error state.
        let (parts, _) = builder.body(()).unwrap_or_default().into_parts();
        RequestHead(parts)
    }

    /// Rebuilds a request with an empty body. Used when a handler gave up on a request it had taken ownership of.
    pub(crate) fn into_request<B: Default>(self) -> Request<B> {
        Request::from_parts(self.0, B::default())
    }
}
