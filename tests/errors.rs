use self::support::{answering, builder, call, failing, passing, recovering, text, Log, TestBody};
use hyper::{Method, Request, StatusCode};
use std::fmt;
use strata::prelude::*;
use strata::{Error, Middleware, Next, RouteError};

mod support;

#[derive(Debug)]
struct Teapot;

impl fmt::Display for Teapot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("short and stout")
    }
}

impl std::error::Error for Teapot {}

#[tokio::test]
async fn errors_skip_regular_handlers() {
    let log = Log::new();
    let router = builder()
        .get("/fail", |req, next: Next<TestBody, Error>| async move { Ok(next.raise(req, Error::new("x")).await) })
        .middleware(Middleware::new(answering(&log, "M")))
        .get("/fail", answering(&log, "later route"))
        .middleware(Middleware::error(recovering(&log, "E")))
        .build()
        .unwrap();

    let (status, body) = call(&router, Method::GET, "/fail").await;
    assert_eq!(status, 500);
    assert_eq!(body, "handled: x");
    assert_eq!(log.entries(), vec!["E: x"]);
}

#[tokio::test]
async fn logging_route_error_handler_scenario() {
    let log = Log::new();
    let router = builder()
        .middleware(Middleware::with_path("/", passing(&log, "logging")))
        .get("/users/:id", |_, _| async move { Err(Error::new("user lookup failed")) })
        .middleware(Middleware::error(|err, req, _| async move {
            let mut res = text(format!("error page for {}: {}", req.original_url(), err));
            *res.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
            Ok(res)
        }))
        .build()
        .unwrap();

    let (status, body) = call(&router, Method::GET, "/users/7").await;
    assert_eq!(status, 503);
    assert_eq!(body, "error page for /users/7: user lookup failed");
    assert_eq!(log.count("logging"), 1);
}

#[tokio::test]
async fn error_handlers_can_pass_the_error_on() {
    let log = Log::new();
    let router = builder()
        .get("/", failing(&log, "route"))
        .middleware(Middleware::error({
            let log = log.clone();
            move |err, req, next: Next<TestBody, Error>| {
                let log = log.clone();
                async move {
                    log.push(format!("first: {}", err));
                    Ok(next.raise(req, err).await)
                }
            }
        }))
        .middleware(Middleware::error(recovering(&log, "second")))
        .build()
        .unwrap();

    let (_, body) = call(&router, Method::GET, "/").await;
    assert_eq!(body, "handled: route");
    assert_eq!(log.entries(), vec!["route", "first: route", "second: route"]);
}

#[tokio::test]
async fn error_handlers_can_recover() {
    let log = Log::new();
    let router = builder()
        .middleware(Middleware::new(failing(&log, "auth")))
        .middleware(Middleware::error(passing_error(&log)))
        .get("/", answering(&log, "route"))
        .build()
        .unwrap();

    let (status, body) = call(&router, Method::GET, "/").await;
    assert_eq!(status, 200);
    assert_eq!(body, "route");
    assert_eq!(log.entries(), vec!["auth", "recovered from auth", "route"]);
}

fn passing_error(
    log: &Log,
) -> impl Fn(RouteError, Request<TestBody>, Next<TestBody, Error>) -> support::HandlerFuture + Send + Sync + 'static {
    let log = log.clone();
    move |err: RouteError, req: Request<TestBody>, next: Next<TestBody, Error>| -> support::HandlerFuture {
        let log = log.clone();
        Box::pin(async move {
            log.push(format!("recovered from {}", err));
            Ok(next.run(req).await)
        })
    }
}

#[tokio::test]
async fn panics_become_errors() {
    let log = Log::new();
    let router = builder()
        .get("/panic", |_, _| async move {
            if true {
                panic!("kaboom");
            }
            Ok(text("unreachable"))
        })
        .middleware(Middleware::error(recovering(&log, "handler")))
        .build()
        .unwrap();

    let (status, body) = call(&router, Method::GET, "/panic").await;
    assert_eq!(status, 500);
    assert_eq!(body, "handled: Handler panicked: kaboom");
}

#[tokio::test]
async fn errors_keep_their_type() {
    let router = builder()
        .get("/tea", |_, _| async move { Err(Error::new("wrapped")) })
        .middleware(Middleware::error(|_, req, next: Next<TestBody, Error>| async move {
            Ok(next.raise(req, Teapot).await)
        }))
        .middleware(Middleware::error(|err, _, _| async move {
            let status = if err.downcast_ref::<Teapot>().is_some() {
                StatusCode::IM_A_TEAPOT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let mut res = text(err.to_string());
            *res.status_mut() = status;
            Ok(res)
        }))
        .build()
        .unwrap();

    let (status, body) = call(&router, Method::GET, "/tea").await;
    assert_eq!(status, 418);
    assert_eq!(body, "short and stout");
}

#[tokio::test]
async fn unhandled_errors_get_the_default_response() {
    let router = builder()
        .get("/plain", |_, _| async move { Err(Error::new("plain failure")) })
        .get("/forbidden", |_, _| async move {
            Err(Error::with_status(StatusCode::FORBIDDEN, "no entry"))
        })
        .get("/redirect", |_, _| async move { Err(Error::with_status(StatusCode::FOUND, "not an error status")) })
        .build()
        .unwrap();

    assert_eq!(
        call(&router, Method::GET, "/plain").await,
        (500, String::from("plain failure"))
    );
    assert_eq!(
        call(&router, Method::GET, "/forbidden").await,
        (403, String::from("no entry"))
    );
    assert_eq!(call(&router, Method::GET, "/redirect").await.0, 500);
}

#[tokio::test]
async fn failing_error_handlers_replace_the_error() {
    let log = Log::new();
    let router = builder()
        .get("/", failing(&log, "route"))
        .middleware(Middleware::error(|_, _, _| async move { Err(Error::new("handler broke")) }))
        .middleware(Middleware::error(recovering(&log, "last")))
        .build()
        .unwrap();

    let (_, body) = call(&router, Method::GET, "/").await;
    assert_eq!(body, "handled: handler broke");
}

#[tokio::test]
async fn error_middleware_respects_its_path() {
    let log = Log::new();
    let router = builder()
        .get("/public/a", failing(&log, "public"))
        .get("/admin/a", failing(&log, "admin"))
        .middleware(Middleware::error_with_path("/admin", recovering(&log, "admin handler")))
        .build()
        .unwrap();

    assert_eq!(call(&router, Method::GET, "/admin/a").await.1, "handled: admin");
    assert_eq!(call(&router, Method::GET, "/public/a").await.1, "public");
    assert_eq!(log.count("admin handler: public"), 0);
}
