//! The request contract.

use crate::error::HandlerError;
use crate::validation::{FieldErrors, Schema};
use async_trait::async_trait;

/// A typed, immutable request routed through a [`crate::ServiceBus`].
///
/// Requests are constructed fully populated, so schema rules can safely read
/// sibling fields for cross-checks.
pub trait Request: Send + Sync + 'static {
    /// What the bound handler returns on success.
    type Response: Send + 'static;

    /// Stable identity used for binding and for error reporting.
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// The request's validation schema. Defaults to empty, which validates
    /// every instance successfully.
    fn schema() -> Schema<Self>
    where
        Self: Sized,
    {
        Schema::new()
    }
}

/// Validate a request against its declared schema.
pub fn validate<R: Request>(request: &R) -> Vec<FieldErrors> {
    R::schema().validate(request)
}

/// Serves one request type. Each handler self-declares the type it serves
/// through the `R` parameter; the bus binds exactly one handler per type.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> Result<R::Response, HandlerError>;
}
