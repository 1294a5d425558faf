//! Pending-transaction record store for the multi-sig backend.
//!
//! A multi-sig submission does not hit the network when it is made. The
//! built (and possibly partially-signed) transaction is parked here under a
//! generated id; the remaining signers pick it up and real submission happens
//! later, out of band. The store is deliberately dumb: create, get, list,
//! update, delete.
//!
//! # Example
//!
//! ```no_run
//! use store::{PendingStore, PendingTransaction};
//!
//! let store = PendingStore::open("pending.db")?;
//!
//! let record = PendingTransaction::new(
//!     "cash in 100.00 to 0.0.300",
//!     "0a1b2c",
//!     vec!["aabb".into(), "ccdd".into()],
//!     2,
//!     "testnet",
//! );
//! store.create(&record)?;
//!
//! for pending in store.list()? {
//!     println!("{}: {}", pending.id, pending.description);
//! }
//!
//! store.delete(record.id)?;
//! # Ok::<(), store::Error>(())
//! ```

mod error;
mod record;
mod store;

pub use error::{Error, Result};
pub use record::{PendingId, PendingTransaction};
pub use store::PendingStore;
