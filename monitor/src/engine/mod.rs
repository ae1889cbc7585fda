pub mod profit;
pub mod runner;
pub mod state;

pub use profit::{FIXED_FEE, NOTIONAL, derived_profit};
pub use runner::{Collaborators, CycleReport, Monitor};
pub use state::{MonitorHandle, RunState};
