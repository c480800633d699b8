//! Schedule repair, feasibility checking, and KPI evaluation.
//!
//! Turns a [`Solution`](crate::models::Solution) into a concrete
//! [`Schedule`](crate::models::Schedule) and measures it.
//!
//! # Algorithm
//!
//! [`repair_schedule`] is a greedy, order-preserving placement: each gene
//! is pushed right past its dependencies and into the first free slot of
//! its worker. It is not optimal, but it turns any GA result into an
//! executable timeline.
//!
//! # KPI
//!
//! [`ScheduleKpi`] computes workforce metrics: makespan, per-worker
//! workload and utilization, workload imbalance, and skill shortfall.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod repair;

pub use kpi::ScheduleKpi;
pub use repair::{build_schedule, check_schedule, is_feasible, repair_schedule};
