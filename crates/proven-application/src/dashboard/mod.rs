//! Dashboard read model and its aggregator.

mod aggregator;

pub use aggregator::{
    DashboardView, LoadPhase, LoadTicket, ResourceAggregator, ResourceRepositories,
};
