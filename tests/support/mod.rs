#![allow(dead_code)]

use futures::future::BoxFuture;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use strata::{Application, Body, Error, Next, RouteError, Router, RouterBuilder, Settings};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Body type used by the in-process tests.
pub type TestBody = Full<Bytes>;

pub type TestRouter = Router<TestBody, Error>;

pub fn builder() -> RouterBuilder<TestBody, Error> {
    Router::builder()
}

pub fn request(method: Method, uri: &str) -> Request<TestBody> {
    Request::builder().method(method).uri(uri).body(TestBody::default()).unwrap()
}

pub fn text(body: impl Into<String>) -> Response<Full<Bytes>> {
    Response::new(Full::new(Bytes::from(body.into())))
}

pub async fn into_text<B>(body: B) -> String
where
    B: hyper::body::Body<Data = Bytes> + Send,
    B::Error: std::fmt::Debug,
{
    String::from_utf8_lossy(&body.collect().await.unwrap().to_bytes()).to_string()
}

/// Dispatches `method uri` through `router` and returns the status and the body text.
pub async fn call(router: &TestRouter, method: Method, uri: &str) -> (u16, String) {
    let res = router.handle(request(method, uri)).await;
    let status = res.status().as_u16();
    (status, into_text(res.into_body()).await)
}

/// Records which handlers ran, in order.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn new() -> Log {
        Log::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| e.as_str() == entry).count()
    }
}

pub type HandlerFuture = BoxFuture<'static, Result<Response<Full<Bytes>>, Error>>;

/// A handler which records `name` and hands the request on.
pub fn passing(
    log: &Log,
    name: &'static str,
) -> impl Fn(Request<TestBody>, Next<TestBody, Error>) -> HandlerFuture + Send + Sync + 'static {
    let log = log.clone();
    move |req: Request<TestBody>, next: Next<TestBody, Error>| -> HandlerFuture {
        let log = log.clone();
        Box::pin(async move {
            log.push(name);
            Ok(next.run(req).await)
        })
    }
}

/// A handler which records `name` and answers with it.
pub fn answering(
    log: &Log,
    name: &'static str,
) -> impl Fn(Request<TestBody>, Next<TestBody, Error>) -> HandlerFuture + Send + Sync + 'static {
    let log = log.clone();
    move |_: Request<TestBody>, _: Next<TestBody, Error>| -> HandlerFuture {
        let log = log.clone();
        Box::pin(async move {
            log.push(name);
            Ok(text(name))
        })
    }
}

/// A handler which records `name` and fails with an error carrying it as message.
pub fn failing(
    log: &Log,
    name: &'static str,
) -> impl Fn(Request<TestBody>, Next<TestBody, Error>) -> HandlerFuture + Send + Sync + 'static {
    let log = log.clone();
    move |_: Request<TestBody>, _: Next<TestBody, Error>| -> HandlerFuture {
        let log = log.clone();
        Box::pin(async move {
            log.push(name);
            Err(Error::new(name))
        })
    }
}

/// An error handler which records `name` and the error, and answers with the error message.
pub fn recovering(
    log: &Log,
    name: &'static str,
) -> impl Fn(RouteError, Request<TestBody>, Next<TestBody, Error>) -> HandlerFuture + Send + Sync + 'static {
    let log = log.clone();
    move |err: RouteError, _: Request<TestBody>, _: Next<TestBody, Error>| -> HandlerFuture {
        let log = log.clone();
        Box::pin(async move {
            log.push(format!("{}: {}", name, err));
            let mut res = text(format!("handled: {}", err));
            *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            Ok(res)
        })
    }
}

pub struct Serve {
    addr: SocketAddr,
    handle: JoinHandle<strata::Result<()>>,
}

impl Serve {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn new_request(&self, method: &str, route: &str) -> http::request::Builder {
        http::request::Request::builder()
            .method(method.to_ascii_uppercase().as_str())
            .uri(format!("http://{}{}", self.addr(), route))
    }

    pub async fn send(&self, req: Request<Full<Bytes>>) -> Response<hyper::body::Incoming> {
        let client = Client::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();
        client.request(req).await.unwrap()
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

/// Serves `router` on a free local port.
pub async fn serve(settings: Settings, router: Router<Body, Error>) -> Serve {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Application::new(settings, router);
    let handle = tokio::spawn(app.serve(listener));

    Serve { addr, handle }
}
