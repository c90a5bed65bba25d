use crate::helpers;
use crate::middleware::Middleware;
use crate::regex_generator::{Pattern, PatternOptions};
use crate::route::Route;
use crate::router::{Router, RouterOptions};
use crate::types::RouteParams;
use std::fmt::{self, Debug, Formatter};

pub(crate) enum LayerKind<B, E> {
    Middleware(Middleware<B, E>),
    Route(Route<B, E>),
    Scope(Router<B, E>),
}

/// One entry of a router's stack: a compiled path and what to run when it matches.
pub(crate) struct Layer<B, E> {
    pub(crate) pattern: Pattern,
    pub(crate) kind: LayerKind<B, E>,
}

#[derive(Debug)]
pub(crate) struct LayerMatch {
    /// Decoded parameter values in declaration order.
    pub(crate) params: Vec<(String, String)>,
    /// Bytes of the path consumed by a middleware or scope layer.
    pub(crate) prefix_len: usize,
}

impl LayerMatch {
    pub(crate) fn route_params(&self) -> RouteParams {
        let mut params = RouteParams::with_capacity(self.params.len());
        for (name, value) in &self.params {
            params.set(name.as_str(), value.as_str());
        }
        params
    }
}

impl<B, E> Layer<B, E> {
    pub(crate) fn new(path: &str, kind: LayerKind<B, E>, options: &RouterOptions) -> crate::Result<Layer<B, E>> {
        let opts = PatternOptions {
            prefix: !matches!(kind, LayerKind::Route(_)),
            case_sensitive: options.case_sensitive,
            strict: options.strict,
        };

        let pattern = Pattern::compile(path, opts)?;

        tracing::trace!(
            path,
            prefix = opts.prefix,
            keys = ?pattern.keys().iter().map(|key| key.name.as_str()).collect::<Vec<_>>(),
            "compiled layer"
        );

        Ok(Layer { pattern, kind })
    }

    pub(crate) fn match_path(&self, path: &str) -> Option<LayerMatch> {
        let m = self.pattern.find(path)?;

        let params = m
            .captures
            .into_iter()
            .map(|(key, raw)| (key.name.clone(), helpers::percent_decode_param(raw)))
            .collect();

        Some(LayerMatch {
            params,
            prefix_len: m.prefix_len,
        })
    }

    /// Whether the layer takes part in dispatch while an error is (or isn't) pending.
    pub(crate) fn accepts(&self, has_err: bool) -> bool {
        match self.kind {
            LayerKind::Middleware(Middleware::Regular(_)) => !has_err,
            LayerKind::Middleware(Middleware::Error(_)) => has_err,
            LayerKind::Route(_) => !has_err,
            // A mounted router decides on its own which of its layers run.
            LayerKind::Scope(_) => true,
        }
    }

    pub(crate) fn as_route(&self) -> Option<&Route<B, E>> {
        match self.kind {
            LayerKind::Route(ref route) => Some(route),
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self.kind {
            LayerKind::Middleware(Middleware::Regular(_)) => "middleware",
            LayerKind::Middleware(Middleware::Error(_)) => "error middleware",
            LayerKind::Route(_) => "route",
            LayerKind::Scope(_) => "scope",
        }
    }
}

impl<B, E> Debug for Layer<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ kind: {}, pattern: {:?} }}", self.describe(), self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::Response;

    type TestLayer = Layer<Full<Bytes>, Error>;

    fn route_layer(path: &str) -> TestLayer {
        let route: Route<Full<Bytes>, Error> = Route::new().get(|_, _| async move { Ok(Response::new(Full::new(Bytes::new()))) });
        Layer::new(path, LayerKind::Route(route), &RouterOptions::default()).unwrap()
    }

    fn middleware_layer(path: &str) -> TestLayer {
        let mw: Middleware<Full<Bytes>, Error> =
            Middleware::with_path(path, |req, next| async move { Ok(next.run(req).await) });
        Layer::new(path, LayerKind::Middleware(mw), &RouterOptions::default()).unwrap()
    }

    #[test]
    fn params_are_decoded_strings() {
        let layer = route_layer("/users/:id");

        let m = layer.match_path("/users/42").unwrap();
        assert_eq!(m.params, vec![("id".to_owned(), "42".to_owned())]);

        let m = layer.match_path("/users/%20").unwrap();
        assert_eq!(m.route_params().get("id").unwrap(), " ");
    }

    #[test]
    fn malformed_escapes_keep_the_raw_value() {
        let layer = route_layer("/files/:name");
        let m = layer.match_path("/files/%E0%A4%A").unwrap();
        assert_eq!(m.params[0].1, "%E0%A4%A");
    }

    #[test]
    fn routes_match_exactly() {
        let layer = route_layer("/users");
        assert!(layer.match_path("/users").is_some());
        assert!(layer.match_path("/users/").is_some());
        assert!(layer.match_path("/users/1").is_none());
        assert_eq!(layer.match_path("/users").unwrap().prefix_len, 0);
    }

    #[test]
    fn middleware_matches_descendants() {
        let layer = middleware_layer("/api");
        assert_eq!(layer.match_path("/api/users").unwrap().prefix_len, 4);
        assert!(layer.match_path("/apiv2").is_none());

        let root = middleware_layer("/");
        assert_eq!(root.match_path("/anything").unwrap().prefix_len, 0);
    }

    #[test]
    fn error_gate_follows_the_layer_kind() {
        let regular = middleware_layer("/");
        assert!(regular.accepts(false));
        assert!(!regular.accepts(true));

        let err: Middleware<Full<Bytes>, Error> =
            Middleware::error(|_, _, _| async move { Ok(Response::new(Full::new(Bytes::new()))) });
        let layer = Layer::new("/", LayerKind::Middleware(err), &RouterOptions::default()).unwrap();
        assert!(!layer.accepts(false));
        assert!(layer.accepts(true));

        let route = route_layer("/x");
        assert!(route.accepts(false));
        assert!(!route.accepts(true));
    }
}
