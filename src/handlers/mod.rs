pub mod fallback;
pub mod health;
pub mod heartbeat;
pub mod join;
pub mod link;
pub mod logout;
pub mod metrics;
pub mod peers;
