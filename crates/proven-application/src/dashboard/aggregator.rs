//! Resource aggregation for the dashboard.
//!
//! A load fetches the four collections of one user concurrently and
//! publishes them together. Every load takes a generation token; only the
//! load whose token is still current when it settles may publish, so a slow
//! response for an earlier request never overwrites a newer one.

use proven_core::dashboard::{CompletionScore, CvStatus, DashboardData};
use proven_core::error::Result;
use proven_core::identity::UserId;
use proven_core::resource::{
    CvResource, ProfileResource, RefereeResource, ResourceKind, ResourceRepository,
    WorkExperienceResource,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// The repositories an aggregator reads from.
#[derive(Clone)]
pub struct ResourceRepositories {
    pub profile: Arc<dyn ResourceRepository<ProfileResource>>,
    pub work_experience: Arc<dyn ResourceRepository<WorkExperienceResource>>,
    pub referees: Arc<dyn ResourceRepository<RefereeResource>>,
    pub cvs: Arc<dyn ResourceRepository<CvResource>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    /// First load for this owner; nothing to show yet.
    Loading,
    /// Reloading while the previous data stays visible.
    Refreshing,
}

/// Read model published by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardView {
    pub owner: Option<UserId>,
    pub data: DashboardData,
    pub phase: LoadPhase,
    /// Categories whose last fetch failed. Their data is the last-known value.
    pub failed: Vec<ResourceKind>,
    /// Whether any load for this owner has published.
    pub loaded: bool,
}

impl DashboardView {
    pub fn completion(&self) -> CompletionScore {
        self.data.completion()
    }

    pub fn cv_status(&self) -> CvStatus {
        self.data.cv_status()
    }

    /// Number of records in a category. The profile counts as one once it
    /// has personal details.
    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Profile => usize::from(self.data.profile.has_personal_details()),
            ResourceKind::WorkExperience => self.data.work_experience.len(),
            ResourceKind::Referees => self.data.referees.len(),
            ResourceKind::Cv => self.data.cvs.len(),
        }
    }

    pub fn has_failed(&self, kind: ResourceKind) -> bool {
        self.failed.contains(&kind)
    }

    pub fn is_busy(&self) -> bool {
        self.phase != LoadPhase::Idle
    }
}

/// A started load, tied to the generation it claimed.
#[derive(Debug)]
pub struct LoadTicket {
    owner: UserId,
    token: u64,
}

/// Loads and caches the dashboard data of the current user.
pub struct ResourceAggregator {
    repositories: ResourceRepositories,
    generation: AtomicU64,
    view: watch::Sender<DashboardView>,
}

impl ResourceAggregator {
    pub fn new(repositories: ResourceRepositories) -> Self {
        let (view, _) = watch::channel(DashboardView::default());
        Self {
            repositories,
            generation: AtomicU64::new(0),
            view,
        }
    }

    /// Fetches all four collections of `owner` and publishes them together.
    ///
    /// Returns `false` when a newer load or a `clear` superseded this one and
    /// its results were discarded.
    pub async fn load(&self, owner: &UserId) -> bool {
        let ticket = self.begin(owner);
        self.complete(ticket).await
    }

    /// Claims a generation for `owner` and marks the view as loading.
    ///
    /// Runs synchronously so a `clear` issued after it always invalidates
    /// the load, even when [`complete`](Self::complete) runs on another task.
    pub fn begin(&self, owner: &UserId) -> LoadTicket {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.view.send_modify(|view| {
            if view.owner.as_ref() == Some(owner) {
                view.phase = LoadPhase::Refreshing;
            } else {
                *view = DashboardView {
                    owner: Some(owner.clone()),
                    phase: LoadPhase::Loading,
                    ..DashboardView::default()
                };
            }
        });
        tracing::debug!("Loading dashboard for user {} (generation {})", owner, token);

        LoadTicket {
            owner: owner.clone(),
            token,
        }
    }

    /// Runs the fetches of a started load and publishes them if the ticket is
    /// still current.
    pub async fn complete(&self, ticket: LoadTicket) -> bool {
        let LoadTicket { owner, token } = ticket;

        let (profile, work_experience, referees, cvs) = tokio::join!(
            self.repositories.profile.fetch(&owner),
            self.repositories.work_experience.fetch(&owner),
            self.repositories.referees.fetch(&owner),
            self.repositories.cvs.fetch(&owner),
        );

        // The token is compared under the channel's lock so a concurrent load
        // either resets the view after this publish or makes it a no-op.
        let published = self.view.send_if_modified(|view| {
            if self.generation.load(Ordering::SeqCst) != token {
                return false;
            }

            let mut failed = Vec::new();
            settle(&mut view.data.profile, profile, ResourceKind::Profile, &mut failed);
            settle(
                &mut view.data.work_experience,
                work_experience,
                ResourceKind::WorkExperience,
                &mut failed,
            );
            settle(&mut view.data.referees, referees, ResourceKind::Referees, &mut failed);
            settle(&mut view.data.cvs, cvs, ResourceKind::Cv, &mut failed);

            view.failed = failed;
            view.phase = LoadPhase::Idle;
            view.loaded = true;
            true
        });

        if !published {
            tracing::debug!("Discarded superseded dashboard load (generation {})", token);
        }
        published
    }

    /// Reloads all four collections for the current owner.
    ///
    /// Returns `false` without fetching when no owner is loaded.
    pub async fn refresh(&self) -> bool {
        let owner = self.view.borrow().owner.clone();
        match owner {
            Some(owner) => self.load(&owner).await,
            None => false,
        }
    }

    /// Invalidates any in-flight load and forgets the cached data.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.view.send_replace(DashboardView::default());
    }

    pub fn owner(&self) -> Option<UserId> {
        self.view.borrow().owner.clone()
    }

    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.subscribe()
    }
}

fn settle<T>(slot: &mut T, result: Result<T>, kind: ResourceKind, failed: &mut Vec<ResourceKind>) {
    match result {
        Ok(value) => *slot = value,
        Err(e) => {
            tracing::warn!("Failed to load {}: {}", kind.label().to_lowercase(), e);
            failed.push(kind);
        }
    }
}
