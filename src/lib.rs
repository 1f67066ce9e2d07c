pub mod common;
pub mod directory;
pub mod domain;
pub mod ledger;
pub mod store;

pub use common::error::LedgerError;
pub use common::money::Money;
pub use domain::debt::Debt;
pub use domain::user::{User, UserTotals};
pub use ledger::Ledger;
pub use store::memory::MemoryStore;
pub use store::DocumentStore;
