// Domain entities

pub mod config;
pub mod event;
pub mod guest;
pub mod operator;
pub mod prize;
pub mod realtime;
pub mod souvenir;

pub use config::*;
pub use event::*;
pub use guest::*;
pub use operator::*;
pub use prize::*;
pub use realtime::*;
pub use souvenir::*;
