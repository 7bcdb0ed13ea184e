pub mod clock;
pub mod portal;
pub mod resolver;
