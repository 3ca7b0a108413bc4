pub mod attendance;
pub mod office;

#[cfg(test)]
pub mod memory;
