//! State-changing use cases.

use super::{ensure_valid, resolve};
use crate::adapter::TransactionOutcome;
use crate::requests::{
    BurnRequest, CashInRequest, DeleteRequest, FreezeRequest, GrantRoleRequest, PauseRequest,
    RescueRequest, RevokeRoleRequest, UnfreezeRequest, UnpauseRequest, WipeRequest,
};
use crate::session::NetworkSession;
use crate::Error;
use async_trait::async_trait;
use bus::{Handler, HandlerError};
use capability::Operation;
use std::sync::Arc;

macro_rules! command_handler {
    ($handler:ident, $request:ident, $operation:expr, |$r:ident| ($target:expr, $amount:expr)) => {
        pub struct $handler {
            session: Arc<NetworkSession>,
        }

        impl $handler {
            pub fn new(session: Arc<NetworkSession>) -> Self {
                Self { session }
            }
        }

        #[async_trait]
        impl Handler<$request> for $handler {
            async fn handle(
                &self,
                $r: $request,
            ) -> Result<TransactionOutcome, HandlerError> {
                ensure_valid(&$r)?;
                let call = resolve(
                    &self.session,
                    $operation,
                    &$r.token,
                    $target,
                    $amount,
                    None,
                )
                .await?;
                Ok(self.session.submit($operation, &call).await?)
            }
        }
    };
}

command_handler!(CashInHandler, CashInRequest, Operation::CashIn, |r| (
    Some(&r.target),
    Some(&r.amount)
));
command_handler!(BurnHandler, BurnRequest, Operation::Burn, |r| (
    None,
    Some(&r.amount)
));
command_handler!(WipeHandler, WipeRequest, Operation::Wipe, |r| (
    Some(&r.target),
    Some(&r.amount)
));
command_handler!(FreezeHandler, FreezeRequest, Operation::Freeze, |r| (
    Some(&r.target),
    None
));
command_handler!(UnfreezeHandler, UnfreezeRequest, Operation::Unfreeze, |r| (
    Some(&r.target),
    None
));
command_handler!(PauseHandler, PauseRequest, Operation::Pause, |r| (
    None, None
));
command_handler!(UnpauseHandler, UnpauseRequest, Operation::Unpause, |r| (
    None, None
));
command_handler!(DeleteHandler, DeleteRequest, Operation::Delete, |r| (
    None, None
));

/// Rescue moves treasury funds, so beyond the capability check it refuses
/// any amount above what the treasury actually holds — before the backend
/// is touched.
pub struct RescueHandler {
    session: Arc<NetworkSession>,
}

impl RescueHandler {
    pub fn new(session: Arc<NetworkSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Handler<RescueRequest> for RescueHandler {
    async fn handle(&self, request: RescueRequest) -> Result<TransactionOutcome, HandlerError> {
        ensure_valid(&request)?;
        let call = resolve(
            &self.session,
            Operation::Rescue,
            &request.token,
            None,
            Some(&request.amount),
            None,
        )
        .await?;

        let balance = self
            .session
            .treasury_balance_of(call.token)
            .await?;
        if let Some(amount) = call.amount {
            if amount > balance {
                return Err(Error::OperationNotAllowed(format!(
                    "rescue of {amount} exceeds treasury balance {balance}"
                ))
                .into());
            }
        }

        Ok(self
            .session
            .submit(Operation::Rescue, &call)
            .await?)
    }
}

/// Grants run per target, sequentially, in request order. The response
/// carries one outcome per target; a mid-list failure stops the walk.
pub struct GrantRoleHandler {
    session: Arc<NetworkSession>,
}

impl GrantRoleHandler {
    pub fn new(session: Arc<NetworkSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Handler<GrantRoleRequest> for GrantRoleHandler {
    async fn handle(
        &self,
        request: GrantRoleRequest,
    ) -> Result<Vec<TransactionOutcome>, HandlerError> {
        ensure_valid(&request)?;
        let mut outcomes = Vec::with_capacity(request.targets.len());
        for (i, target) in request.targets.iter().enumerate() {
            let call = resolve(
                &self.session,
                Operation::GrantRole,
                &request.token,
                Some(target),
                request.amounts.get(i).map(String::as_str),
                Some(request.role),
            )
            .await?;
            outcomes.push(
                self.session
                    .submit(Operation::GrantRole, &call)
                    .await?,
            );
        }
        Ok(outcomes)
    }
}

pub struct RevokeRoleHandler {
    session: Arc<NetworkSession>,
}

impl RevokeRoleHandler {
    pub fn new(session: Arc<NetworkSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Handler<RevokeRoleRequest> for RevokeRoleHandler {
    async fn handle(
        &self,
        request: RevokeRoleRequest,
    ) -> Result<Vec<TransactionOutcome>, HandlerError> {
        ensure_valid(&request)?;
        let mut outcomes = Vec::with_capacity(request.targets.len());
        for target in &request.targets {
            let call = resolve(
                &self.session,
                Operation::RevokeRole,
                &request.token,
                Some(target),
                None,
                Some(request.role),
            )
            .await?;
            outcomes.push(
                self.session
                    .submit(Operation::RevokeRole, &call)
                    .await?,
            );
        }
        Ok(outcomes)
    }
}
