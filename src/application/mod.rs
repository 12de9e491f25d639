// Application layer - use cases and orchestration.
// The domain aggregator stays pure; this layer fetches snapshots through
// the `LedgerStore` port and shapes the results into view models.

pub mod error;
pub mod reporting;
pub mod service;
pub mod store;

pub use error::*;
pub use reporting::*;
pub use service::*;
pub use store::*;
