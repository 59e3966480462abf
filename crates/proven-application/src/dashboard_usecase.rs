//! Dashboard use case.
//!
//! Wires the aggregator and the editors to the lifecycle manager: every
//! identity change invalidates the cached data and starts a load for the new
//! owner, and every successful edit reloads all four collections.

use proven_core::error::{ProvenError, Result};
use proven_core::identity::{Identity, SessionState};
use proven_core::resource::{RecordId, Resource};
use std::sync::Arc;

use crate::dashboard::{DashboardView, ResourceAggregator, ResourceRepositories};
use crate::editor::{Confirmation, EditReport, ResourceEditor, ResourceEditors};
use crate::session::SessionLifecycleManager;

pub struct DashboardUseCase {
    session: SessionLifecycleManager,
    aggregator: Arc<ResourceAggregator>,
    editors: ResourceEditors,
}

impl DashboardUseCase {
    pub fn new(session: SessionLifecycleManager, repositories: ResourceRepositories) -> Self {
        Self {
            session,
            aggregator: Arc::new(ResourceAggregator::new(repositories.clone())),
            editors: ResourceEditors::new(&repositories),
        }
    }

    /// Installs the identity hook and settles the initial session state.
    ///
    /// A restored identity starts a background load right away.
    pub async fn start(&self) -> SessionState {
        let aggregator = Arc::clone(&self.aggregator);
        let on_identity_change = move |identity: Option<&Identity>| match identity {
            Some(identity) => {
                // Claimed here so a sign-out before the task runs discards it.
                let ticket = aggregator.begin(&identity.id);
                let aggregator = Arc::clone(&aggregator);
                tokio::spawn(async move {
                    aggregator.complete(ticket).await;
                });
            }
            None => aggregator.clear(),
        };
        self.session
            .set_identity_change_callback(Arc::new(on_identity_change))
            .await;

        self.session.initialize().await
    }

    /// Loads the current user's data and waits for it.
    pub async fn reload(&self) -> Result<DashboardView> {
        let identity = self.require_identity()?;
        self.aggregator.load(&identity.id).await;
        Ok(self.aggregator.view())
    }

    /// Returns the current user's data, waiting for a load already in flight
    /// instead of starting another one.
    pub async fn settled(&self) -> Result<DashboardView> {
        let identity = self.require_identity()?;
        let mut rx = self.aggregator.subscribe();
        let view = rx
            .wait_for(|view| view.owner.as_ref() != Some(&identity.id) || !view.is_busy())
            .await
            .map_err(|_| ProvenError::internal("dashboard channel closed"))?
            .clone();

        if view.owner.as_ref() == Some(&identity.id) && view.loaded {
            return Ok(view);
        }
        self.reload().await
    }

    /// Creates or updates a record of the current user.
    ///
    /// A successful edit reloads the dashboard before returning.
    pub async fn submit<R: Resource>(
        &self,
        editor: &ResourceEditor<R>,
        form: &R::Form,
        existing: Option<&RecordId>,
    ) -> Result<EditReport> {
        let identity = self.require_identity()?;
        let report = editor.submit(&identity.id, form, existing).await;
        self.after_edit(&identity, &report).await;
        Ok(report)
    }

    /// Deletes a record of the current user once confirmed.
    pub async fn remove<R: Resource>(
        &self,
        editor: &ResourceEditor<R>,
        id: &RecordId,
        confirmation: Confirmation,
    ) -> Result<EditReport> {
        let identity = self.require_identity()?;
        let report = editor.remove(&identity.id, id, confirmation).await;
        self.after_edit(&identity, &report).await;
        Ok(report)
    }

    pub fn session(&self) -> &SessionLifecycleManager {
        &self.session
    }

    pub fn aggregator(&self) -> &ResourceAggregator {
        &self.aggregator
    }

    pub fn editors(&self) -> &ResourceEditors {
        &self.editors
    }

    pub fn view(&self) -> DashboardView {
        self.aggregator.view()
    }

    fn require_identity(&self) -> Result<Identity> {
        self.session.identity().ok_or(ProvenError::Unauthenticated)
    }

    async fn after_edit(&self, identity: &Identity, report: &EditReport) {
        if !report.is_success() {
            return;
        }
        // The session may have ended while the request was in flight.
        if self.session.identity().as_ref().map(|i| &i.id) == Some(&identity.id) {
            self.aggregator.load(&identity.id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRepositories;
    use proven_core::identity::UserId;
    use proven_core::resource::{ProfileRecord, RefereeForm, RefereeRecord};
    use proven_core::session::{PersistedSession, SessionStore};
    use proven_infrastructure::MemorySessionStore;
    use std::time::Duration;

    fn alice() -> Identity {
        Identity::new("1", "Alice", "alice@example.com", "user")
    }

    fn bob() -> Identity {
        Identity::new("2", "Bob", "bob@example.com", "user")
    }

    fn referee_form() -> RefereeForm {
        RefereeForm {
            name: "Jane".to_string(),
            email: Some("jane@example.com".to_string()),
            ..Default::default()
        }
    }

    fn usecase(store: &MemorySessionStore, repos: &MockRepositories) -> DashboardUseCase {
        let session = SessionLifecycleManager::new(
            Arc::new(store.open_context()),
            Duration::from_secs(1800),
        );
        DashboardUseCase::new(session, repos.wire())
    }

    async fn wait_for_owner(usecase: &DashboardUseCase, owner: Option<UserId>) {
        let mut rx = usecase.aggregator().subscribe();
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|view| view.owner == owner && !view.is_busy()),
        )
        .await
        .expect("timed out waiting for dashboard")
        .expect("aggregator dropped");
    }

    #[tokio::test]
    async fn test_restored_session_loads_dashboard() {
        let store = MemorySessionStore::new();
        store
            .seed(PersistedSession::encode(&alice()).unwrap())
            .await;
        let repos = MockRepositories::new();
        repos.profile.set(
            "1",
            ProfileRecord {
                name: Some("Alice".to_string()),
                ..Default::default()
            },
        );
        let usecase = usecase(&store, &repos);

        assert!(usecase.start().await.is_authenticated());
        wait_for_owner(&usecase, Some(UserId::new("1"))).await;

        assert_eq!(usecase.view().completion().percent(), 25);
    }

    #[tokio::test]
    async fn test_logout_clears_dashboard() {
        let store = MemorySessionStore::new();
        let repos = MockRepositories::new();
        let usecase = usecase(&store, &repos);
        usecase.start().await;
        usecase.session().login(alice()).await.unwrap();
        wait_for_owner(&usecase, Some(UserId::new("1"))).await;

        usecase.session().logout().await.unwrap();

        assert_eq!(usecase.view(), DashboardView::default());
    }

    #[tokio::test]
    async fn test_logout_before_background_load_runs_discards_it() {
        let store = MemorySessionStore::new();
        let repos = MockRepositories::new();
        repos.profile.set(
            "1",
            ProfileRecord {
                name: Some("Alice".to_string()),
                ..Default::default()
            },
        );
        let usecase = usecase(&store, &repos);
        usecase.start().await;

        usecase.session().login(alice()).await.unwrap();
        usecase.session().logout().await.unwrap();
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }

        assert!(!usecase.session().state().is_authenticated());
        assert_eq!(usecase.view(), DashboardView::default());
    }

    #[tokio::test]
    async fn test_settled_waits_for_restored_load() {
        let store = MemorySessionStore::new();
        store
            .seed(PersistedSession::encode(&alice()).unwrap())
            .await;
        let repos = MockRepositories::new();
        let usecase = usecase(&store, &repos);
        usecase.start().await;

        let view = usecase.settled().await.unwrap();

        assert_eq!(view.owner, Some(UserId::new("1")));
        assert!(view.loaded);
        assert_eq!(repos.profile.fetches(), 1);
        assert_eq!(repos.cvs.fetches(), 1);
    }

    #[tokio::test]
    async fn test_restored_session_without_start_does_not_fetch() {
        let store = MemorySessionStore::new();
        store
            .seed(PersistedSession::encode(&alice()).unwrap())
            .await;
        let repos = MockRepositories::new();
        let usecase = usecase(&store, &repos);

        assert!(usecase.session().initialize().await.is_authenticated());
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(repos.profile.fetches(), 0);
        assert_eq!(usecase.view(), DashboardView::default());
    }

    #[tokio::test]
    async fn test_settled_loads_when_nothing_in_flight() {
        let store = MemorySessionStore::new();
        let repos = MockRepositories::new();
        let usecase = usecase(&store, &repos);
        usecase.session().initialize().await;
        usecase.session().login(alice()).await.unwrap();

        let view = usecase.settled().await.unwrap();

        assert!(view.loaded);
        assert_eq!(repos.referees.fetches(), 1);
    }

    #[tokio::test]
    async fn test_external_switch_reloads_for_new_owner() {
        let store = MemorySessionStore::new();
        let repos = MockRepositories::new();
        repos.referees.set(
            "2",
            vec![RefereeRecord {
                id: RecordId::new("9"),
                user_id: Some(UserId::new("2")),
                name: "Ref".to_string(),
                position: None,
                company: None,
                email: None,
                phone: None,
                relationship: None,
            }],
        );
        let usecase = usecase(&store, &repos);
        usecase.start().await;
        usecase.session().login(alice()).await.unwrap();
        wait_for_owner(&usecase, Some(UserId::new("1"))).await;

        store
            .open_context()
            .write(&PersistedSession::encode(&bob()).unwrap())
            .await
            .unwrap();

        wait_for_owner(&usecase, Some(UserId::new("2"))).await;
        assert_eq!(usecase.view().data.referees.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_requires_identity() {
        let store = MemorySessionStore::new();
        let repos = MockRepositories::new();
        let usecase = usecase(&store, &repos);
        usecase.start().await;

        let err = usecase
            .submit(&usecase.editors().referees, &referee_form(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvenError::Unauthenticated));
        assert!(repos.referees.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_edit_reloads_all_four() {
        let store = MemorySessionStore::new();
        let repos = MockRepositories::new();
        let usecase = usecase(&store, &repos);
        usecase.start().await;
        usecase.session().login(alice()).await.unwrap();
        wait_for_owner(&usecase, Some(UserId::new("1"))).await;
        let before = repos.profile.fetches();

        let report = usecase
            .submit(&usecase.editors().referees, &referee_form(), None)
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(repos.profile.fetches(), before + 1);
        assert_eq!(repos.cvs.fetches(), before + 1);
    }

    #[tokio::test]
    async fn test_failed_edit_does_not_reload() {
        let store = MemorySessionStore::new();
        let repos = MockRepositories::new();
        let usecase = usecase(&store, &repos);
        usecase.start().await;
        usecase.session().login(alice()).await.unwrap();
        wait_for_owner(&usecase, Some(UserId::new("1"))).await;
        let before = repos.profile.fetches();

        let report = usecase
            .remove(
                &usecase.editors().referees,
                &RecordId::new("1"),
                Confirmation::Declined,
            )
            .await
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(repos.profile.fetches(), before);
    }

    #[tokio::test]
    async fn test_reload_returns_fresh_view() {
        let store = MemorySessionStore::new();
        let repos = MockRepositories::new();
        let usecase = usecase(&store, &repos);
        usecase.start().await;
        usecase.session().login(alice()).await.unwrap();

        let view = usecase.reload().await.unwrap();

        assert_eq!(view.owner, Some(UserId::new("1")));
        assert!(view.loaded);
    }
}
