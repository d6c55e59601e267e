pub mod attendance;
pub mod health;
pub mod payroll_period;
