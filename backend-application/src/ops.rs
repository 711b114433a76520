pub mod realtime_hub;

pub use realtime_hub::*;
