pub mod scheduler;
pub mod session;

pub use scheduler::{plan_pending, Plan, RunSummary, Scheduler, TaskOutcome};
pub use session::GameSession;
