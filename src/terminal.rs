//! Responses generated when a request falls off the end of the root stack.

use crate::error::{self, RouteError};
use crate::settings::Env;
use crate::types::OriginalUrl;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};

pub(crate) fn respond<B>(req: &Request<B>, err: Option<RouteError>) -> Response<Full<Bytes>> {
    let env = req.extensions().get::<Env>().copied().unwrap_or_default();

    match err {
        Some(err) => {
            let status = error::status_of(&err);

            if env != Env::Test {
                tracing::error!(
                    method = %req.method(),
                    url = %original_path(req),
                    status = status.as_u16(),
                    "unhandled error: {}",
                    err
                );
            }

            let body = match env {
                Env::Production => status.canonical_reason().unwrap_or("Unknown Error").to_owned(),
                _ => err.to_string(),
            };

            text_response(status, body)
        }
        None => {
            let path = original_path(req);
            tracing::debug!(method = %req.method(), %path, "no handler matched");
            text_response(StatusCode::NOT_FOUND, format!("Cannot {} {}", req.method(), path))
        }
    }
}

pub(crate) fn options_response(allow: &[Method]) -> Response<Full<Bytes>> {
    let allow = allow.iter().map(Method::as_str).collect::<Vec<_>>().join(",");

    let mut res = text_response(StatusCode::OK, allow.clone());
    if let Ok(value) = HeaderValue::from_str(&allow) {
        res.headers_mut().insert(header::ALLOW, value);
    }
    res
}

fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut res = Response::new(Full::new(Bytes::from(body)));
    *res.status_mut() = status;

    let headers = res.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

    res
}

// The path of the url the client asked for, before any mount point stripped it.
fn original_path<B>(req: &Request<B>) -> String {
    match req.extensions().get::<OriginalUrl>() {
        Some(url) => url.0.split('?').next().unwrap_or_default().to_owned(),
        None => req.uri().path().to_owned(),
    }
}
