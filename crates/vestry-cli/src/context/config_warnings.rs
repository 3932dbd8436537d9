use vestry_config::VestryConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &VestryConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &VestryConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.store.is_remote()
        && has_env_prefix(&env_keys, "VESTRY_STORE")
        && !has_env_prefix(&env_keys, "VESTRY_STORE__")
    {
        warnings.push(
            "Store config appears default while VESTRY_STORE* env vars exist. Use double underscores (example: VESTRY_STORE__URL)."
                .to_string(),
        );
    }

    if !config.tenant.has_church()
        && !config.tenant.has_user()
        && has_env_prefix(&env_keys, "VESTRY_TENANT")
    {
        warnings.push(
            "Tenant config is empty while VESTRY_TENANT* env vars exist. Use double underscores (example: VESTRY_TENANT__CHURCH_ID)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
