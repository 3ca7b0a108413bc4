pub mod attendance;
pub mod office;
