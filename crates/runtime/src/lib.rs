//! Stablecoin operation execution.
//!
//! Ties the pieces together: requests validated by their schemas, routed
//! through the command and query buses, decided against a fresh capability
//! read, and executed by whichever backend the session currently holds.
//!
//! ```no_run
//! use runtime::adapter::{HttpLedgerClient, NativeAdapter, Network};
//! use runtime::handlers::command_bus;
//! use runtime::reader::HttpCapabilityReader;
//! use runtime::requests::CashInRequest;
//! use runtime::session::NetworkSession;
//! use std::sync::Arc;
//!
//! # async fn run(key: ed25519_dalek::SigningKey) -> Result<(), Box<dyn std::error::Error>> {
//! let reader = Arc::new(HttpCapabilityReader::new("https://mirror.example"));
//! let session = Arc::new(NetworkSession::new(reader));
//! session
//!     .connect(Box::new(NativeAdapter::new(
//!         Arc::new(HttpLedgerClient::new("https://node.example")),
//!         "0.0.500".parse()?,
//!         Network::Testnet,
//!         key,
//!     )))
//!     .await?;
//!
//! let bus = command_bus(session)?;
//! let outcome = bus
//!     .execute(CashInRequest {
//!         token: "0.0.100".into(),
//!         target: "0.0.300".into(),
//!         amount: "25.00".into(),
//!     })
//!     .await?;
//! println!("{:?}", outcome.id);
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod adapter;
pub mod handlers;
pub mod reader;
pub mod requests;
pub mod session;

mod error;

pub use error::{Error, Result};
