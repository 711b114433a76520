pub mod event_queries;
pub mod guest_queries;
pub mod operator_queries;
pub mod prize_queries;
pub mod souvenir_queries;
