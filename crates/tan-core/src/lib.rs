// crates/tan-core/src/lib.rs
//
// tan-core: Core types, errors, and collaborator traits for the TAN farm.
//
// This is the leaf crate that the rest of the workspace depends on. It
// defines account addresses, the call context every state transition runs
// under, the protocol-wide error taxonomy, and the trait seams between the
// staking engine and the ledgers it drives.

pub mod address;
pub mod call;
pub mod crypto;
pub mod error;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use tan_core::Address;`
pub use address::Address;
pub use call::CallContext;
pub use error::FarmError;
pub use traits::{FungibleLedger, RewardMinter, StakingReceipt};
