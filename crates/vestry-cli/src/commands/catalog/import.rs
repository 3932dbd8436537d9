use std::path::Path;

use anyhow::Context;
use vestry_core::catalog::CatalogSeed;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(file: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let seed = read_seed(Path::new(file))?;
    let report = ctx.service.import_catalog(&seed).await?;
    output(&report, flags.format)
}

fn read_seed(path: &Path) -> anyhow::Result<CatalogSeed> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid catalog file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::read_seed;

    #[test]
    fn reads_nested_agents() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
[[modules]]
module_name = "mod_care"
price = 9.0

[[modules.agents]]
agent_name = "Follow-up"
required = true
"#
        )
        .expect("write seed");

        let seed = read_seed(file.path()).expect("seed should parse");
        assert_eq!(seed.modules.len(), 1);
        assert!(seed.modules[0].agents[0].required);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_seed(std::path::Path::new("/nonexistent/catalog.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/catalog.toml"));
    }
}
