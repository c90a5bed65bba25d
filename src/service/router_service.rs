use crate::router::Router;
use crate::service::request_service::RequestService;
use crate::settings::Env;
use crate::{Body, RouteError};
use hyper::service::Service;
use std::convert::Infallible;
use std::future::{ready, Ready};
use tokio::net::TcpStream;

/// A [`Service`](https://docs.rs/hyper/1/hyper/service/trait.Service.html) which creates a
/// [RequestService](./struct.RequestService.html) for every accepted TCP connection.
///
/// [Application](./struct.Application.html) runs the accept loop with it. It can also be driven by hand:
///
/// # Examples
///
/// ```no_run
/// use http_body_util::Full;
/// use hyper::body::Bytes;
/// use hyper::service::Service;
/// use hyper::Response;
/// use hyper_util::rt::{TokioExecutor, TokioIo};
/// use hyper_util::server::conn::auto::Builder;
/// use strata::{Body, Error, Router, RouterService};
/// use std::net::SocketAddr;
/// use std::sync::Arc;
/// use tokio::net::TcpListener;
///
/// fn router() -> Router<Body, Error> {
///     Router::builder()
///         .get("/", |_, _| async move { Ok(Response::new(Full::new(Bytes::from("Home page")))) })
///         .build()
///         .unwrap()
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let service = Arc::new(RouterService::new(router()));
///
///     let addr: SocketAddr = SocketAddr::from(([127, 0, 0, 1], 3001));
///     let listener = TcpListener::bind(addr).await?;
///
///     loop {
///         let (stream, _) = listener.accept().await?;
///         let router_service = service.clone();
///
///         tokio::spawn(async move {
///             // Get the request service for this connection.
///             let request_service = router_service.call(&stream).await.unwrap();
///
///             let io = TokioIo::new(stream);
///             let builder = Builder::new(TokioExecutor::new());
///             if let Err(err) = builder.serve_connection(io, request_service).await {
///                 eprintln!("Error serving connection: {:?}", err);
///             }
///         });
///     }
/// }
/// ```
#[derive(Debug)]
pub struct RouterService<E> {
    router: Router<Body, E>,
    env: Env,
}

impl<E: Into<RouteError> + 'static> RouterService<E> {
    /// Creates a new service for `router` in the development environment.
    pub fn new(router: Router<Body, E>) -> RouterService<E> {
        RouterService::with_env(router, Env::default())
    }

    /// Creates a new service for `router` which tags every request with `env`.
    pub fn with_env(router: Router<Body, E>, env: Env) -> RouterService<E> {
        RouterService { router, env }
    }
}

impl<E: Into<RouteError> + 'static> Service<&TcpStream> for RouterService<E> {
    type Response = RequestService<E>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, conn: &TcpStream) -> Self::Future {
        let addr = match conn.peer_addr() {
            Ok(addr) => addr,
            Err(_) => std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
        };

        ready(Ok(RequestService::new(self.router.clone(), addr, self.env)))
    }
}
