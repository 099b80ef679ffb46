pub mod attendance;
pub mod report;
pub mod roster;
