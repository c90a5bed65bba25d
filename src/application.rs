use crate::router::Router;
use crate::service::RouterService;
use crate::settings::{Env, Settings};
use crate::{Body, RouteError};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};

/// The root of an application: a router plus the settings it runs with.
///
/// # Examples
///
/// ```no_run
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Response};
/// use strata::{Application, Error, Router, Settings};
///
/// #[tokio::main]
/// async fn main() -> strata::Result<()> {
///     let settings = Settings::from_env();
///
///     let router = Router::builder()
///         .with_options(settings.router_options())
///         .get("/", |_, _| async move { Ok(Response::new(Full::new(Bytes::from("Home page")))) })
///         .build()?;
///
///     let app: Application<Error> = Application::new(settings, router);
///     app.listen("127.0.0.1:3000").await
/// }
/// ```
#[derive(Debug)]
pub struct Application<E> {
    settings: Settings,
    router: Router<Body, E>,
}

impl<E: Into<RouteError> + 'static> Application<E> {
    /// Creates an application. The root router should be built with [`Settings::router_options`] to honor the routing
    /// settings.
    pub fn new(settings: Settings, router: Router<Body, E>) -> Application<E> {
        if router.options().case_sensitive != settings.case_sensitive_routing
            || router.options().strict != settings.strict_routing
        {
            tracing::warn!(
                options = ?router.options(),
                "the root router was built with options which differ from the routing settings"
            );
        }

        Application { settings, router }
    }

    /// The settings the application was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The root router.
    pub fn router(&self) -> &Router<Body, E> {
        &self.router
    }

    /// Dispatches a single request, as if it was received by the server.
    pub async fn handle(&self, mut req: Request<Body>) -> Response<Full<Bytes>> {
        req.extensions_mut().insert(self.settings.env);
        self.router.handle(req).await
    }

    /// Converts the application into a per-connection service factory.
    pub fn into_service(self) -> RouterService<E> {
        RouterService::with_env(self.router, self.settings.env)
    }

    /// Binds `addr` and serves the application on it.
    pub async fn listen<A: ToSocketAddrs>(self, addr: A) -> crate::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| crate::Error::new(format!("Couldn't bind the listener: {}", err)))?;

        let local_addr = listener
            .local_addr()
            .map_err(|err| crate::Error::new(format!("Couldn't read the listener address: {}", err)))?;
        tracing::info!(addr = %local_addr, env = %self.settings.env, "application is listening");

        self.serve(listener).await
    }

    /// Serves the application on an already bound listener. Runs until accepting a connection fails for good.
    pub async fn serve(self, listener: TcpListener) -> crate::Result<()> {
        let env = self.settings.env;
        let service = Arc::new(self.into_service());

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    tracing::warn!(error = %err, "couldn't accept a connection");
                    continue;
                }
            };

            let service = service.clone();

            tokio::spawn(async move {
                let request_service = match service.call(&stream).await {
                    Ok(svc) => svc,
                    Err(never) => match never {},
                };

                let io = TokioIo::new(stream);
                let builder = Builder::new(TokioExecutor::new());

                if let Err(err) = builder.serve_connection(io, request_service).await {
                    log_connection_error(env, peer, &*err);
                }
            });
        }
    }
}

fn log_connection_error(env: Env, peer: SocketAddr, err: &(dyn std::error::Error + Send + Sync)) {
    if env != Env::Test {
        tracing::debug!(%peer, error = %err, "error serving connection");
    }
}
