//! Scheduling domain models.
//!
//! Provides the data types for describing a skill-constrained scheduling
//! problem and its candidate solutions.
//!
//! # Domain Mappings
//!
//! | u-skillsched | Student projects | Software teams | Field service |
//! |--------------|------------------|----------------|---------------|
//! | Task | Assignment item | Ticket | Job |
//! | Worker | Student | Engineer | Technician |
//! | Solution | Work plan | Sprint plan | Dispatch plan |
//! | Schedule | Timeline | Roadmap | Route sheet |

mod problem;
mod schedule;
mod solution;
mod task;
mod worker;

pub use problem::{Problem, ProblemData};
pub use schedule::{Schedule, ScheduledTask, Violation, ViolationType};
pub use solution::{Assignment, Solution};
pub use task::Task;
pub use worker::Worker;
