mod engine;
mod types;

pub use engine::{project, project_goal, project_lump_sum, project_sip, project_swp};
pub use types::{Projection, Scenario, ScenarioError, YearPoint};
