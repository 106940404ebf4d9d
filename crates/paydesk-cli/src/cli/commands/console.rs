//! Per-invocation state: configuration plus the restored session.

use std::path::PathBuf;

use anyhow::Context;
use paydesk_core::{
    guard, ApiClient, ClientConfig, FileStore, GuardDecision, PaydeskError, PaydeskResult,
    RedirectReason, Role, SessionContext, TokenProvider,
};
use tracing::{debug, warn};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub credentials: Option<PathBuf>,
}

pub struct Console {
    pub config: ClientConfig,
    pub session: SessionContext<FileStore>,
}

impl Console {
    pub fn open(opts: &GlobalOpts) -> anyhow::Result<Self> {
        let mut config = match &opts.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
            None => ClientConfig::from_env(),
        };
        if let Some(path) = &opts.credentials {
            config = config.with_credentials_path(path);
        }

        let store = match &config.credentials_path {
            Some(path) => FileStore::new(path),
            None => FileStore::at_default_location()?,
        };
        debug!(path = %store.path().display(), "credential file");

        Ok(Self {
            session: SessionContext::restore(store),
            config,
        })
    }

    pub fn anonymous_client(&self) -> anyhow::Result<ApiClient> {
        Ok(ApiClient::new(&self.config)?)
    }

    /// Client carrying the session credential. `role` scopes the command to
    /// one role; a mismatch is refused before anything is sent.
    pub fn client(&self, role: Option<Role>) -> anyhow::Result<ApiClient> {
        match guard(self.session.state(), role) {
            GuardDecision::Allow => {}
            GuardDecision::RedirectToLogin {
                reason: RedirectReason::RoleMismatch { required, actual },
                ..
            } => {
                return Err(PaydeskError::Forbidden {
                    message: format!("this command requires {required}, logged in as {actual}"),
                }
                .into())
            }
            GuardDecision::RedirectToLogin { .. } | GuardDecision::Pending => {
                return Err(PaydeskError::NotAuthenticated.into())
            }
        }

        let provider = TokenProvider::from_session(&self.session);
        Ok(ApiClient::with_token_provider(&self.config, provider)?)
    }

    /// Pass `result` through, logging out first when the server rejected the
    /// credential.
    pub fn settle<T>(&mut self, result: PaydeskResult<T>) -> anyhow::Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.invalidates_session() {
                    warn!("credential rejected by the server, logging out");
                    if let Err(clear) = self.session.logout() {
                        warn!(error = %clear, "failed to clear credential");
                    }
                }
                Err(e.into())
            }
        }
    }
}
