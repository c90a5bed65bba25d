use hyper::StatusCode;

/// The error type handed to error handlers.
///
/// Every error a handler returns is boxed into a `RouteError` before it travels down the stack. The original error
/// can be recovered with [`downcast_ref`](https://doc.rust-lang.org/std/error/trait.Error.html#method.downcast_ref).
pub type RouteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type used by the `strata` library.
///
/// It is returned when a router can't be built (e.g. an invalid route path) and it can also be used by handlers to
/// fail a request with a specific HTTP status.
///
/// # Examples
///
/// ```
/// use hyper::StatusCode;
/// use strata::Error;
///
/// let err = Error::with_status(StatusCode::FORBIDDEN, "Access denied");
/// assert_eq!(err.status(), StatusCode::FORBIDDEN);
/// assert_eq!(err.to_string(), "Access denied");
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{msg}")]
pub struct Error {
    msg: String,
    status: Option<StatusCode>,
}

impl Error {
    /// Creates a new error instance with the specified message.
    pub fn new<M: Into<String>>(msg: M) -> Self {
        Error {
            msg: msg.into(),
            status: None,
        }
    }

    /// Creates a new error which asks the default error responder to use `status`.
    pub fn with_status<M: Into<String>>(status: StatusCode, msg: M) -> Self {
        Error {
            msg: msg.into(),
            status: Some(status),
        }
    }

    /// The HTTP status associated with this error, `500 Internal Server Error` when none was given.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

/// Resolves the status the default responder uses for `err`.
///
/// Only statuses in the `4xx` and `5xx` ranges are honored.
pub(crate) fn status_of(err: &RouteError) -> StatusCode {
    match err.downcast_ref::<Error>() {
        Some(e) if e.status().is_client_error() || e.status().is_server_error() => e.status(),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> RouteError {
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic payload")
    };

    Box::new(Error::new(format!("Handler panicked: {}", msg)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_internal_server_error() {
        let err: RouteError = Box::new(Error::new("boom"));
        assert_eq!(status_of(&err), StatusCode::INTERNAL_SERVER_ERROR);

        let err: RouteError = Box::new(std::io::Error::new(std::io::ErrorKind::Other, "io"));
        assert_eq!(status_of(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn status_ignores_non_error_codes() {
        let err: RouteError = Box::new(Error::with_status(StatusCode::FOUND, "redirect"));
        assert_eq!(status_of(&err), StatusCode::INTERNAL_SERVER_ERROR);

        let err: RouteError = Box::new(Error::with_status(StatusCode::UNPROCESSABLE_ENTITY, "bad"));
        assert_eq!(status_of(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let err = from_panic(Box::new("oops"));
        assert_eq!(err.to_string(), "Handler panicked: oops");

        let err = from_panic(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "Handler panicked: owned");
    }
}
