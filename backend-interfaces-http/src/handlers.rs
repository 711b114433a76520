pub mod auth_handlers;
pub mod checkin_handlers;
pub mod display_handlers;
pub mod event_handlers;
pub mod guest_handlers;
pub mod ops_handlers;
pub mod prize_handlers;
pub mod souvenir_handlers;
pub mod stream_handlers;

pub use auth_handlers::*;
pub use checkin_handlers::*;
pub use display_handlers::*;
pub use event_handlers::*;
pub use guest_handlers::*;
pub use ops_handlers::*;
pub use prize_handlers::*;
pub use souvenir_handlers::*;
pub use stream_handlers::*;
