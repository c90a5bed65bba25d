use crate::router::Router;
use crate::settings::Env;
use crate::types::RemoteAddr;
use crate::{Body, RouteError};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{service::Service, Request, Response};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use tracing::Instrument;

/// A [`Service`](https://docs.rs/hyper/1/hyper/service/trait.Service.html) which dispatches the requests of a single
/// connection through a router.
///
/// It is created by [RouterService](./struct.RouterService.html) for every accepted connection. Before dispatching it
/// records the peer address and the environment in the request, so handlers can read them with
/// [`remote_addr`](./ext/trait.RequestExt.html#tymethod.remote_addr).
#[derive(Debug)]
pub struct RequestService<E> {
    pub(crate) router: Router<Body, E>,
    pub(crate) remote_addr: SocketAddr,
    pub(crate) env: Env,
}

impl<E: Into<RouteError> + 'static> RequestService<E> {
    /// Creates a service for a connection from `remote_addr`.
    pub fn new(router: Router<Body, E>, remote_addr: SocketAddr, env: Env) -> RequestService<E> {
        RequestService {
            router,
            remote_addr,
            env,
        }
    }
}

impl<E: Into<RouteError> + 'static> Service<Request<Incoming>> for RequestService<E> {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    #[allow(clippy::type_complexity)]
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let router = self.router.clone();
        let span = tracing::debug_span!("request", method = %req.method(), path = %req.uri().path());

        let mut req = req.map(|body| body.boxed());
        req.extensions_mut().insert(RemoteAddr(self.remote_addr));
        req.extensions_mut().insert(self.env);

        Box::pin(async move { Ok(router.handle(req).await) }.instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::{Env, Error, Router};
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::{Request, Response, StatusCode};
    use std::net::SocketAddr;
    use std::str::FromStr;

    #[tokio::test]
    async fn router_sees_remote_addr_and_env() {
        let remote_addr = SocketAddr::from_str("10.0.0.7:8080").unwrap();
        let router: Router<crate::Body, Error> = Router::builder()
            .get("/", |req, _| async move {
                let env = *req.extensions().get::<Env>().unwrap();
                Ok(Response::new(Full::new(Bytes::from(format!("{} {}", req.remote_addr().unwrap(), env)))))
            })
            .build()
            .unwrap();

        let mut req: Request<crate::Body> = Request::builder().uri("/").body(Default::default()).unwrap();
        req.extensions_mut().insert(crate::types::RemoteAddr(remote_addr));
        req.extensions_mut().insert(Env::Test);

        let res = router.handle(req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = http_body_util::BodyExt::collect(res.into_body()).await.unwrap().to_bytes();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "10.0.0.7:8080 test");
    }
}
