use affirank::config::{Config, DEFAULT_CONFIG_FILE};
use anyhow::{Context, Result};
use std::path::Path;

/// Default configuration as commented TOML
pub fn default_config_toml() -> String {
    let config = Config::default();

    format!(
        r#"# affirank configuration

[fetch]
timeout_secs = {}
connect_timeout_secs = {}
user_agent = "{}"
max_redirects = {}
max_content_size = {}

[extraction]
# Affiliate hosts without a product id rule; their links are counted by raw URL
extra_hosts = []
# Resolve amzn.to / a.r10.to links before counting them
expand_short_links = {}

[report]
resolve_titles = {}
# Only title and export the top N products
# max_titles = 50
politeness_delay_ms = {}
output_dir = "{}"
file_prefix = "{}"
write_bom = {}

[logging]
format = "text"
level = "{}"
"#,
        config.fetch.timeout_secs,
        config.fetch.connect_timeout_secs,
        config.fetch.user_agent,
        config.fetch.max_redirects,
        config.fetch.max_content_size,
        config.extraction.expand_short_links,
        config.report.resolve_titles,
        config.report.politeness_delay_ms,
        config.report.output_dir.display(),
        config.report.file_prefix,
        config.report.write_bom,
        config.logging.level,
    )
}

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    let config_path = path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    std::fs::write(&config_path, default_config_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
