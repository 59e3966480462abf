//! Dashboard domain module: the aggregated data of one user and what is
//! derived from it.

mod model;

pub use model::{CompletionScore, CvStatus, DashboardData, completion};
