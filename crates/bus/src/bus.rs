//! Request dispatch.

use crate::error::{Error, Result};
use crate::request::{Handler, Request};
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Routes typed requests to their single bound handler.
///
/// A process holds two instances — one for commands, one for queries — both
/// populated once at startup. Execution is single-attempt and asynchronous;
/// a handler failure propagates directly to the caller.
#[derive(Default)]
pub struct ServiceBus {
    bindings: HashMap<TypeId, Binding>,
}

struct Binding {
    request_type: &'static str,
    handler: Box<dyn Any + Send + Sync>,
}

impl ServiceBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` as the one handler for request type `R`.
    ///
    /// Binding a second handler for the same type is a wiring defect and is
    /// rejected.
    pub fn bind<R, H>(&mut self, handler: H) -> Result<()>
    where
        R: Request,
        H: Handler<R> + 'static,
    {
        let type_id = TypeId::of::<R>();
        if self.bindings.contains_key(&type_id) {
            return Err(Error::InvalidHandler(R::type_name()));
        }
        let handler: Box<dyn Handler<R>> = Box::new(handler);
        self.bindings.insert(
            type_id,
            Binding {
                request_type: R::type_name(),
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Whether a handler is bound for request type `R`.
    pub fn is_bound<R: Request>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<R>())
    }

    /// Resolve the request's type to its bound handler and invoke it once.
    pub async fn execute<R: Request>(&self, request: R) -> Result<R::Response> {
        let binding = self
            .bindings
            .get(&TypeId::of::<R>())
            .ok_or(Error::HandlerNotFound(R::type_name()))?;
        let handler = binding
            .handler
            .downcast_ref::<Box<dyn Handler<R>>>()
            .ok_or(Error::InvalidHandler(binding.request_type))?;
        Ok(handler.handle(request).await?)
    }
}
