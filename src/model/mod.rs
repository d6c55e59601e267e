pub mod attendance;
pub mod payroll_period;
pub mod role;
pub mod user;
