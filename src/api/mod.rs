pub mod attendance;
pub mod manager;
