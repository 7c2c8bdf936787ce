//! Background maintenance jobs.

mod maintenance;
mod scheduler;

pub use maintenance::start_maintenance;
pub use scheduler::Scheduler;
