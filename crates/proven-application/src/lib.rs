//! Application layer of the Proven client.
//!
//! Orchestrates the domain traits from `proven-core`: the per-context session
//! lifecycle, the dashboard aggregator, the resource editors, and the use
//! cases that wire them together.

pub mod auth_usecase;
pub mod dashboard;
pub mod dashboard_usecase;
pub mod editor;
pub mod session;

#[cfg(test)]
mod testing;

pub use auth_usecase::AuthUseCase;
pub use dashboard::{
    DashboardView, LoadPhase, LoadTicket, ResourceAggregator, ResourceRepositories,
};
pub use dashboard_usecase::DashboardUseCase;
pub use editor::{
    Confirmation, EditAction, EditReport, EditStatus, ResourceEditor, ResourceEditors,
};
pub use session::{IdentityChangeCallback, SessionLifecycleManager};
