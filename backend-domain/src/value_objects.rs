// Domain value objects
pub mod broadcast_kind;
pub mod identifiers;

pub use broadcast_kind::*;
pub use identifiers::*;
