use http_body_util::Full;
use hyper::{body::Bytes, Request, Response, StatusCode};
// Import the strata prelude traits.
use strata::prelude::*;
use strata::{Application, Body, Error, Middleware, Next, RouteError, Router, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
struct User {
    id: u64,
    name: String,
}

fn text(body: String) -> Response<Full<Bytes>> {
    Response::new(Full::new(Bytes::from(body)))
}

// A handler for "/" page.
async fn home_handler(_: Request<Body>, _: Next<Body, Error>) -> Result<Response<Full<Bytes>>, Error> {
    Ok(text(String::from("Home page")))
}

// A handler for "/users/:id" page. The user was loaded by the "id" param hook.
async fn user_handler(req: Request<Body>, _: Next<Body, Error>) -> Result<Response<Full<Bytes>>, Error> {
    let user = req
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| Error::new("The user wasn't loaded"))?;
    Ok(text(format!("Hello {} (#{})", user.name, user.id)))
}

// Resolves the "id" param before any handler which declares it.
async fn load_user(mut req: Request<Body>, value: String, _name: String) -> Result<Request<Body>, Error> {
    let id: u64 = value
        .parse()
        .map_err(|_| Error::with_status(StatusCode::BAD_REQUEST, format!("Invalid user id: {}", value)))?;

    if id == 0 {
        return Err(Error::with_status(StatusCode::NOT_FOUND, "No such user"));
    }

    req.extensions_mut().insert(User {
        id,
        name: format!("user-{}", id),
    });
    Ok(req)
}

// A middleware which logs an http request.
async fn logger(req: Request<Body>, next: Next<Body, Error>) -> Result<Response<Full<Bytes>>, Error> {
    let method = req.method().clone();
    let url = req.original_url().to_owned();
    let res = next.run(req).await;
    tracing::info!(%method, %url, status = res.status().as_u16(), "served");
    Ok(res)
}

// Turns every error into a plain response with the error's status.
async fn error_handler(
    err: RouteError,
    _: Request<Body>,
    _: Next<Body, Error>,
) -> Result<Response<Full<Bytes>>, Error> {
    let status = err
        .downcast_ref::<Error>()
        .map(Error::status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut res = text(format!("Something went wrong: {}", err));
    *res.status_mut() = status;
    Ok(res)
}

fn api_router() -> strata::Result<Router<Body, Error>> {
    Router::builder()
        .route("/books", |route| {
            route
                .get(|req, _| async move { Ok(text(format!("List of books at {}{}", req.base_url(), req.path()))) })
                .post(|_, _| async move { Ok(text(String::from("Book created"))) })
        })
        .build()
}

fn router(settings: &Settings) -> strata::Result<Router<Body, Error>> {
    Router::builder()
        .with_options(settings.router_options())
        .middleware(Middleware::new(logger))
        .param("id", load_user)
        .get("/", home_handler)
        .get("/users/:id", user_handler)
        .scope("/api", api_router()?)
        .middleware(Middleware::error(error_handler))
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "strata=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    let app = Application::new(settings, router(&settings)?);

    app.listen("127.0.0.1:3000").await?;
    Ok(())
}
