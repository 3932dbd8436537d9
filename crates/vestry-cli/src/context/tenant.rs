use vestry_config::VestryConfig;
use vestry_db::service::EntitlementService;

use crate::cli::GlobalFlags;

/// Where the church ID came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TenantSource {
    ChurchFlag,
    UserFlag,
    ConfigChurch,
    ConfigUser,
}

/// Pick the church to act for.
///
/// Order: `--church`, `--user` (profile lookup), `tenant.church_id`,
/// `tenant.user_id`. Returns `None` when nothing is set; church-scoped
/// commands then fail with `MissingTenantContext`.
pub async fn resolve_tenant(
    service: &EntitlementService,
    flags: &GlobalFlags,
    config: &VestryConfig,
) -> anyhow::Result<Option<(String, TenantSource)>> {
    if let Some(church) = non_blank(flags.church.as_deref()) {
        return Ok(Some((church.to_string(), TenantSource::ChurchFlag)));
    }
    if let Some(user) = non_blank(flags.user.as_deref()) {
        let church = service.resolve_church_for_user(user).await?;
        return Ok(Some((church, TenantSource::UserFlag)));
    }
    if config.tenant.has_church() {
        return Ok(Some((
            config.tenant.church_id.trim().to_string(),
            TenantSource::ConfigChurch,
        )));
    }
    if config.tenant.has_user() {
        let church = service
            .resolve_church_for_user(config.tenant.user_id.trim())
            .await?;
        return Ok(Some((church, TenantSource::ConfigUser)));
    }
    Ok(None)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vestry_config::VestryConfig;
    use vestry_db::service::EntitlementService;

    use super::{TenantSource, resolve_tenant};
    use crate::cli::{GlobalFlags, OutputFormat};

    fn flags(church: Option<&str>, user: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            church: church.map(str::to_string),
            user: user.map(str::to_string),
            db: None,
        }
    }

    async fn store_with_user() -> (EntitlementService, String) {
        let svc = EntitlementService::new_local(":memory:")
            .await
            .expect("store should open");
        let church = svc
            .register_church("Grace", None)
            .await
            .expect("church should register");
        svc.create_profile("user-1", None, None, Some(&church.id))
            .await
            .expect("profile should be created");
        (svc, church.id)
    }

    #[tokio::test]
    async fn church_flag_wins_over_everything() {
        let (svc, _) = store_with_user().await;
        let mut config = VestryConfig::default();
        config.tenant.church_id = "chr-config".into();

        let resolved = resolve_tenant(&svc, &flags(Some("chr-flag"), Some("user-1")), &config)
            .await
            .expect("should resolve");
        assert_eq!(
            resolved,
            Some(("chr-flag".to_string(), TenantSource::ChurchFlag))
        );
    }

    #[tokio::test]
    async fn user_flag_looks_up_profile() {
        let (svc, church_id) = store_with_user().await;
        let resolved = resolve_tenant(&svc, &flags(None, Some("user-1")), &VestryConfig::default())
            .await
            .expect("should resolve");
        assert_eq!(resolved, Some((church_id, TenantSource::UserFlag)));
    }

    #[tokio::test]
    async fn config_church_before_config_user() {
        let (svc, _) = store_with_user().await;
        let mut config = VestryConfig::default();
        config.tenant.church_id = "chr-config".into();
        config.tenant.user_id = "user-1".into();

        let resolved = resolve_tenant(&svc, &flags(None, None), &config)
            .await
            .expect("should resolve");
        assert_eq!(
            resolved,
            Some(("chr-config".to_string(), TenantSource::ConfigChurch))
        );
    }

    #[tokio::test]
    async fn nothing_set_resolves_to_none() {
        let (svc, _) = store_with_user().await;
        let resolved = resolve_tenant(&svc, &flags(Some("  "), None), &VestryConfig::default())
            .await
            .expect("should resolve");
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn unknown_user_is_an_error() {
        let (svc, _) = store_with_user().await;
        let result = resolve_tenant(&svc, &flags(None, Some("ghost")), &VestryConfig::default()).await;
        assert!(result.is_err());
    }
}
