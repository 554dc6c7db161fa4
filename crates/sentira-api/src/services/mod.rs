// Services layer for business logic
// Services own validation and orchestration, calling the backend traits directly

pub mod analysis;

pub use analysis::{AnalysisOutcome, AnalysisService};
