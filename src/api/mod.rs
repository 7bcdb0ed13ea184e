pub mod attendance;
pub mod portal;
