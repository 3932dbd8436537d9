use anyhow::Context;
use vestry_config::VestryConfig;
use vestry_db::service::EntitlementService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: EntitlementService,
    pub config: VestryConfig,
}

impl AppContext {
    /// Open the store and, when `with_tenant` is set, resolve the church to
    /// act for.
    ///
    /// `--db` forces a local store at that path; otherwise a remote store is
    /// used when `store.url` and `store.auth_token` are both configured.
    pub async fn init(
        config: VestryConfig,
        flags: &GlobalFlags,
        with_tenant: bool,
    ) -> anyhow::Result<Self> {
        let mut service = if let Some(path) = flags.db.as_deref() {
            EntitlementService::new_local(path)
                .await
                .with_context(|| format!("failed to open store at {path}"))?
        } else if config.store.is_remote() {
            EntitlementService::new_remote(&config.store.url, &config.store.auth_token)
                .await
                .with_context(|| format!("failed to connect to {}", config.store.url))?
        } else {
            EntitlementService::new_local(&config.store.path)
                .await
                .with_context(|| format!("failed to open store at {}", config.store.path))?
        };

        if !with_tenant {
            return Ok(Self { service, config });
        }

        let tenant = super::resolve_tenant(&service, flags, &config)
            .await
            .context("failed to resolve church")?;
        if let Some((church_id, source)) = &tenant {
            tracing::debug!(%church_id, ?source, "church resolved");
        }
        service.set_tenant(tenant.map(|(church_id, _)| church_id));

        Ok(Self { service, config })
    }

    /// Fallback for list limits: `general.default_limit`.
    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.config.general.default_limit
    }
}
