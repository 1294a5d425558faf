//! Typed command/query dispatch.
//!
//! A [`Request`] is an immutable, fully-populated struct carrying its own
//! declarative validation [`Schema`]. A [`ServiceBus`] binds exactly one
//! [`Handler`] per request type at startup and routes each executed request
//! to it — single attempt, no retry, no queue. Two bus instances share this
//! one implementation: a command bus for state-changing requests and a query
//! bus for reads.

mod bus;
mod error;
mod request;
mod validation;

pub use bus::ServiceBus;
pub use error::{Error, HandlerError, Result};
pub use request::{Handler, Request, validate};
pub use validation::{FieldErrors, Schema, ValidationError};
