// Domain services: pure decisions shared by every storage implementation

pub mod admission;
pub mod eligibility;
pub mod identifier;

pub use admission::*;
pub use eligibility::*;
pub use identifier::*;
