pub mod classifier;
pub mod health;
pub mod status;

pub use classifier::{classify, classify_tier, Classification, StatusTier};
pub use health::{project_health_score, HealthScore};
pub use status::{blend_status, StatusInputs};
