pub mod auth;
pub mod config;
pub mod dashboard;
pub mod resources;
pub mod watch;

use anyhow::{Context as _, Result};
use colored::Colorize;
use proven_application::{AuthUseCase, DashboardUseCase, ResourceRepositories, SessionLifecycleManager};
use proven_core::error::ProvenError;
use proven_infrastructure::{
    ApiClient, ConfigService, FileSessionStore, HttpCredentialService, HttpResourceRepositories,
    ProvenPaths,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Paths and configuration resolved once per invocation.
pub struct Context {
    paths: ProvenPaths,
    config_service: ConfigService,
}

impl Context {
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self> {
        let paths = ProvenPaths::new(config_dir);
        let config_service = ConfigService::new(&paths)?;
        Ok(Self {
            paths,
            config_service,
        })
    }

    pub fn config_service(&self) -> &ConfigService {
        &self.config_service
    }

    /// Wires the session, the HTTP collaborators and the use cases, then
    /// settles the session from the session file.
    pub async fn services(&self) -> Result<Services> {
        let services = self.wire().await?;
        services.session().initialize().await;
        Ok(services)
    }

    /// Like [`services`](Self::services), but a restored session starts
    /// loading the dashboard right away.
    pub async fn dashboard_services(&self) -> Result<Services> {
        let services = self.wire().await?;
        services.dashboard.start().await;
        Ok(services)
    }

    async fn wire(&self) -> Result<Services> {
        let config = self
            .config_service
            .load_effective()
            .context("Failed to load configuration")?;

        let session_file = self.paths.session_file().map_err(ProvenError::from)?;
        let store = FileSessionStore::open(session_file, config.store_poll_interval()).await?;
        let session = SessionLifecycleManager::from_config(Arc::new(store), &config);

        let api = ApiClient::from_config(&config)?;
        let http = HttpResourceRepositories::new(&api);
        let repositories = ResourceRepositories {
            profile: Arc::new(http.profile),
            work_experience: Arc::new(http.work_experience),
            referees: Arc::new(http.referees),
            cvs: Arc::new(http.cvs),
        };

        let auth = AuthUseCase::new(
            Arc::new(HttpCredentialService::new(api)),
            session.clone(),
        );
        let dashboard = DashboardUseCase::new(session, repositories);

        Ok(Services { auth, dashboard })
    }
}

pub struct Services {
    pub auth: AuthUseCase,
    pub dashboard: DashboardUseCase,
}

impl Services {
    pub fn session(&self) -> &SessionLifecycleManager {
        self.dashboard.session()
    }

    pub async fn shutdown(&self) {
        self.session().shutdown().await;
    }
}

/// Turns a failed operation into the message the user should see.
pub fn fail(err: ProvenError, fallback: &str) -> anyhow::Error {
    tracing::debug!("{:?}", err);
    anyhow::anyhow!("{}", err.user_message(fallback).red())
}
