//! Read-only use cases.

use super::ensure_valid;
use crate::requests::GetCapabilitiesRequest;
use crate::session::NetworkSession;
use async_trait::async_trait;
use bus::{Handler, HandlerError};
use capability::CoinCapabilities;
use std::sync::Arc;

pub struct GetCapabilitiesHandler {
    session: Arc<NetworkSession>,
}

impl GetCapabilitiesHandler {
    pub fn new(session: Arc<NetworkSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Handler<GetCapabilitiesRequest> for GetCapabilitiesHandler {
    async fn handle(
        &self,
        request: GetCapabilitiesRequest,
    ) -> Result<CoinCapabilities, HandlerError> {
        ensure_valid(&request)?;
        let token = request.token.parse().map_err(crate::Error::from)?;
        Ok(self.session.capabilities_of(token).await?)
    }
}
