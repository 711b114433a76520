pub mod memory_store;
pub mod operator_roster;
pub mod store;

pub use memory_store::*;
pub use operator_roster::*;
pub use store::StoreState;
