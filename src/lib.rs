pub mod config;
pub mod database;
pub mod diagnostics;
pub mod error;
pub mod joints;
pub mod kinematics;
pub mod model;
pub mod record;
pub mod results;
pub mod scene;
pub mod scorer;
pub mod study;

pub use database::ReachDatabase;
pub use error::{ReachError, ReachResult};
pub use record::ReachRecord;
pub use results::StudyResults;
