use crate::constants::{net, poll};
use crate::poller::PollSettings;
use crate::types::{FilterConfig, SortOrder};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// EchoTube - channel comment moderation dashboard
///
/// Keeps a live view of comments, videos and channel statistics, and lets the
/// channel owner like, heart and reply to comments.
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "echotube")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Channel comment moderation dashboard", long_about = None)]
pub struct CliArgs {
    /// Dashboard backend base URL
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// HTTP request timeout in milliseconds (1000-60000)
    #[arg(long, env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Live channel statistics refresh period in milliseconds (1000-3600000)
    #[arg(long, env = "LIVE_STATS_INTERVAL_MS")]
    pub live_stats_interval_ms: Option<u64>,

    /// Hashtag trend refresh period in milliseconds (1000-86400000)
    #[arg(long, env = "HASHTAG_INTERVAL_MS")]
    pub hashtag_interval_ms: Option<u64>,

    /// Consecutive poll failures before a category is flagged degraded (1-100)
    #[arg(long, env = "POLL_FAILURE_WARN_THRESHOLD")]
    pub poll_failure_warn_threshold: Option<u32>,

    /// Hide comments written by the channel owner
    #[arg(long, env = "HIDE_OWNER_COMMENTS")]
    pub hide_owner_comments: Option<bool>,

    /// Only show comments that have no replies yet
    #[arg(long, env = "SHOW_UNREPLIED_ONLY")]
    pub show_unreplied_only: Option<bool>,

    /// Comment order: newest or oldest
    #[arg(long, env = "SORT_ORDER", value_parser = clap::value_parser!(SortOrder))]
    pub sort_order: Option<SortOrder>,

    /// Channel id treated as the owner (otherwise learned from the backend)
    #[arg(long, env = "OWNER_CHANNEL_ID")]
    pub owner_channel_id: Option<String>,

    /// Optional config file path (TOML format)
    #[arg(long, env = "ECHOTUBE_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
}

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub polling: PollingSection,
    #[serde(default)]
    pub filters: FilterSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub owner_channel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollingSection {
    pub live_stats_interval_ms: Option<u64>,
    pub hashtag_interval_ms: Option<u64>,
    pub failure_warn_threshold: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSection {
    pub hide_owner_comments: Option<bool>,
    pub show_unreplied_only: Option<bool>,
    pub sort_order: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub live_stats_interval_ms: u64,
    pub hashtag_interval_ms: u64,
    pub poll_failure_warn_threshold: u32,
    pub hide_owner_comments: bool,
    pub show_unreplied_only: bool,
    pub sort_order: SortOrder,
    pub owner_channel_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let filter = FilterConfig::default();
        Self {
            api_base_url: net::DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: net::REQUEST_TIMEOUT_MS,
            live_stats_interval_ms: poll::LIVE_STATS_INTERVAL_MS,
            hashtag_interval_ms: poll::HASHTAG_INTERVAL_MS,
            poll_failure_warn_threshold: poll::FAILURE_WARN_THRESHOLD,
            hide_owner_comments: filter.hide_owner_comments,
            show_unreplied_only: filter.show_unreplied_only,
            sort_order: filter.sort_order,
            owner_channel_id: None,
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

fn load_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

/// Load configuration from CLI args, environment variables and the optional file
pub fn load() -> Result<Config> {
    let args = CliArgs::parse();
    let file = match args.config_file.as_deref() {
        Some(path) => {
            log::info!("[config] loading configuration from {}", path.display());
            load_file(path)?
        }
        None => ConfigFile::default(),
    };
    resolve(args, file)
}

/// Merge already-parsed sources. CLI/env values win over the file, the file
/// wins over defaults. Everything is validated after merging.
pub fn resolve(args: CliArgs, file: ConfigFile) -> Result<Config> {
    let defaults = Config::default();

    let api_base_url = args
        .api_base_url
        .or(file.api.base_url)
        .unwrap_or(defaults.api_base_url);
    validate_url(&api_base_url, "API_BASE_URL")?;

    let request_timeout_ms = args
        .request_timeout_ms
        .or(file.api.request_timeout_ms)
        .unwrap_or(defaults.request_timeout_ms);
    let request_timeout_ms =
        validate_in_range(request_timeout_ms, 1_000, 60_000, "REQUEST_TIMEOUT_MS")?;

    let live_stats_interval_ms = args
        .live_stats_interval_ms
        .or(file.polling.live_stats_interval_ms)
        .unwrap_or(defaults.live_stats_interval_ms);
    let live_stats_interval_ms = validate_in_range(
        live_stats_interval_ms,
        1_000,
        3_600_000,
        "LIVE_STATS_INTERVAL_MS",
    )?;

    let hashtag_interval_ms = args
        .hashtag_interval_ms
        .or(file.polling.hashtag_interval_ms)
        .unwrap_or(defaults.hashtag_interval_ms);
    let hashtag_interval_ms =
        validate_in_range(hashtag_interval_ms, 1_000, 86_400_000, "HASHTAG_INTERVAL_MS")?;

    let poll_failure_warn_threshold = args
        .poll_failure_warn_threshold
        .or(file.polling.failure_warn_threshold)
        .unwrap_or(defaults.poll_failure_warn_threshold);
    let poll_failure_warn_threshold = validate_in_range(
        poll_failure_warn_threshold,
        1,
        100,
        "POLL_FAILURE_WARN_THRESHOLD",
    )?;

    let sort_order = match (args.sort_order, file.filters.sort_order) {
        (Some(order), _) => order,
        (None, Some(raw)) => raw
            .parse()
            .with_context(|| "Invalid [filters].sort_order in config file")?,
        (None, None) => defaults.sort_order,
    };

    let owner_channel_id = args
        .owner_channel_id
        .or(file.api.owner_channel_id)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(Config {
        api_base_url,
        request_timeout_ms,
        live_stats_interval_ms,
        hashtag_interval_ms,
        poll_failure_warn_threshold,
        hide_owner_comments: args
            .hide_owner_comments
            .or(file.filters.hide_owner_comments)
            .unwrap_or(defaults.hide_owner_comments),
        show_unreplied_only: args
            .show_unreplied_only
            .or(file.filters.show_unreplied_only)
            .unwrap_or(defaults.show_unreplied_only),
        sort_order,
        owner_channel_id,
    })
}

impl Config {
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            hide_owner_comments: self.hide_owner_comments,
            show_unreplied_only: self.show_unreplied_only,
            sort_order: self.sort_order,
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            live_stats_interval: Duration::from_millis(self.live_stats_interval_ms),
            hashtag_interval: Duration::from_millis(self.hashtag_interval_ms),
            failure_threshold: self.poll_failure_warn_threshold,
        }
    }

    pub fn print_summary(&self) {
        log::info!("EchoTube Configuration:");
        log::info!("  Backend: {}", self.api_base_url);
        log::info!("  Request Timeout: {}ms", self.request_timeout_ms);
        log::info!("  Live Stats Interval: {}ms", self.live_stats_interval_ms);
        log::info!("  Hashtag Interval: {}ms", self.hashtag_interval_ms);
        log::info!(
            "  Filters: hide_owner={} unreplied_only={} sort={}",
            self.hide_owner_comments,
            self.show_unreplied_only,
            self.sort_order
        );
        if let Some(owner) = &self.owner_channel_id {
            log::info!("  Owner Channel: {owner}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = resolve(CliArgs::default(), ConfigFile::default()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.live_stats_interval_ms, 30_000);
        assert_eq!(cfg.hashtag_interval_ms, 300_000);
        assert!(cfg.hide_owner_comments);
        assert_eq!(cfg.sort_order, SortOrder::Newest);
    }

    #[test]
    fn test_cli_beats_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            [api]
            base_url = "https://file.example"
            [polling]
            live_stats_interval_ms = 5000
            [filters]
            sort_order = "oldest"
            show_unreplied_only = true
            "#,
        )
        .unwrap();
        let args = CliArgs {
            api_base_url: Some("https://cli.example".into()),
            ..Default::default()
        };
        let cfg = resolve(args, file).unwrap();
        assert_eq!(cfg.api_base_url, "https://cli.example");
        assert_eq!(cfg.live_stats_interval_ms, 5000);
        assert_eq!(cfg.sort_order, SortOrder::Oldest);
        assert!(cfg.show_unreplied_only);
        assert_eq!(
            cfg.poll_settings().live_stats_interval,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        let args = CliArgs {
            request_timeout_ms: Some(10),
            ..Default::default()
        };
        let err = resolve(args, ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_MS"));

        let args = CliArgs {
            api_base_url: Some("ftp://nope".into()),
            ..Default::default()
        };
        assert!(resolve(args, ConfigFile::default()).is_err());
    }

    #[test]
    fn test_blank_owner_ignored() {
        let args = CliArgs {
            owner_channel_id: Some("  ".into()),
            ..Default::default()
        };
        let cfg = resolve(args, ConfigFile::default()).unwrap();
        assert_eq!(cfg.owner_channel_id, None);
    }
}
