pub mod attendance;
pub mod employee;
pub mod shift_rule;
