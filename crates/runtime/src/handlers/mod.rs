//! Use-case handlers.
//!
//! Every command handler runs the same pipeline: validate the request's
//! schema, read capabilities fresh, resolve the access path, build the
//! operation call, and submit through the session's active backend. A
//! forbidden decision refuses before the backend is ever touched.

mod commands;
mod queries;

pub use commands::{
    BurnHandler, CashInHandler, DeleteHandler, FreezeHandler, GrantRoleHandler, PauseHandler,
    RescueHandler, RevokeRoleHandler, UnfreezeHandler, UnpauseHandler, WipeHandler,
};
pub use queries::GetCapabilitiesHandler;

use crate::adapter::OperationCall;
use crate::requests::{
    BurnRequest, CashInRequest, DeleteRequest, FreezeRequest, GetCapabilitiesRequest,
    GrantRoleRequest, PauseRequest, RescueRequest, RevokeRoleRequest, UnfreezeRequest,
    UnpauseRequest, WipeRequest,
};
use crate::session::NetworkSession;
use crate::{Error, Result};
use bus::{HandlerError, Request, ServiceBus, validate};
use capability::{AccountId, Amount, Operation, Role, TokenId};
use std::sync::Arc;

/// Validate a request against its schema, flattening failures into the
/// handler-error envelope.
fn ensure_valid<R: Request>(request: &R) -> std::result::Result<(), HandlerError> {
    let failures = validate(request);
    if failures.is_empty() {
        return Ok(());
    }
    let detail = failures
        .iter()
        .flat_map(|f| {
            f.errors
                .iter()
                .map(move |e| format!("{}: {}", f.field, e.message))
        })
        .collect::<Vec<_>>()
        .join("; ");
    Err(HandlerError::new("validation_failed", detail))
}

/// Read capabilities fresh, decide the access path, and assemble the call.
/// Amounts are re-parsed here at the coin's own scale.
async fn resolve(
    session: &NetworkSession,
    operation: Operation,
    token: &str,
    target: Option<&str>,
    amount: Option<&str>,
    role: Option<Role>,
) -> Result<OperationCall> {
    let token: TokenId = token.parse()?;
    let capabilities = session.capabilities_of(token).await?;

    let access = capabilities
        .decide(operation)
        .access()
        .ok_or_else(|| Error::OperationNotAllowed(format!("{operation} on {token}")))?;

    let target = match target {
        Some(t) => Some(t.parse::<AccountId>()?),
        None => None,
    };
    let amount = match amount {
        Some(a) => Some(Amount::parse(a, capabilities.coin.decimals)?),
        None => None,
    };

    Ok(OperationCall {
        token,
        contract: capabilities.coin.contract,
        target,
        amount,
        role,
        access,
    })
}

/// The command side of the process: every state-changing request type bound
/// to its handler.
pub fn command_bus(session: Arc<NetworkSession>) -> bus::Result<ServiceBus> {
    let mut bus = ServiceBus::new();
    bus.bind::<CashInRequest, _>(CashInHandler::new(session.clone()))?;
    bus.bind::<BurnRequest, _>(BurnHandler::new(session.clone()))?;
    bus.bind::<WipeRequest, _>(WipeHandler::new(session.clone()))?;
    bus.bind::<FreezeRequest, _>(FreezeHandler::new(session.clone()))?;
    bus.bind::<UnfreezeRequest, _>(UnfreezeHandler::new(session.clone()))?;
    bus.bind::<PauseRequest, _>(PauseHandler::new(session.clone()))?;
    bus.bind::<UnpauseRequest, _>(UnpauseHandler::new(session.clone()))?;
    bus.bind::<DeleteRequest, _>(DeleteHandler::new(session.clone()))?;
    bus.bind::<RescueRequest, _>(RescueHandler::new(session.clone()))?;
    bus.bind::<GrantRoleRequest, _>(GrantRoleHandler::new(session.clone()))?;
    bus.bind::<RevokeRoleRequest, _>(RevokeRoleHandler::new(session))?;
    Ok(bus)
}

/// The query side: read-only request types.
pub fn query_bus(session: Arc<NetworkSession>) -> bus::Result<ServiceBus> {
    let mut bus = ServiceBus::new();
    bus.bind::<GetCapabilitiesRequest, _>(GetCapabilitiesHandler::new(session))?;
    Ok(bus)
}

#[cfg(test)]
mod tests;
