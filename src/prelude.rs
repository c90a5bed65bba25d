//! The prelude re-exports the extension traits, so handlers can call `req.param("id")` with a single glob import.

pub use crate::ext::RequestExt;
