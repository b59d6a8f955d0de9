use clap::Parser;
use reqwest::Url;
use std::time::Duration;

/// Parameters of one load run.
///
/// Every flag falls back to an environment variable, then to the default
/// shown in `--help`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "loadgen",
    version,
    about = "Drive synthetic GET traffic at the page server and check status and latency"
)]
pub struct LoadConfig {
    /// Number of concurrent virtual users.
    #[arg(
        long,
        env = "LOAD_VUS",
        default_value_t = 100,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub vus: u32,

    /// Wall-clock length of the run (e.g. `1m`, `30s`).
    #[arg(long, env = "LOAD_DURATION", default_value = "1m", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Page requested by every virtual user.
    #[arg(
        long = "url",
        env = "LOAD_TARGET_URL",
        default_value = "http://127.0.0.1:5000/index.html"
    )]
    pub target_url: Url,

    /// A response slower than this fails the latency check.
    #[arg(
        long = "threshold",
        env = "LOAD_LATENCY_THRESHOLD",
        default_value = "200ms",
        value_parser = humantime::parse_duration
    )]
    pub latency_threshold: Duration,

    /// Pause between two requests of the same virtual user.
    #[arg(long, env = "LOAD_SLEEP", default_value = "1s", value_parser = humantime::parse_duration)]
    pub sleep: Duration,

    /// Per-request timeout; a timed out request counts as a transport error.
    #[arg(long, env = "LOAD_TIMEOUT", default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Print the final report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        LoadConfig::command().debug_assert();
    }

    #[test]
    fn defaults_match_reference_scenario() {
        // ---
        let cfg = LoadConfig::try_parse_from(["loadgen"]).unwrap();

        assert_eq!(cfg.vus, 100);
        assert_eq!(cfg.duration, Duration::from_secs(60));
        assert_eq!(cfg.target_url.as_str(), "http://127.0.0.1:5000/index.html");
        assert_eq!(cfg.latency_threshold, Duration::from_millis(200));
        assert_eq!(cfg.sleep, Duration::from_secs(1));
        assert!(!cfg.json);
    }

    #[test]
    fn flags_parse_human_durations() {
        // ---
        let cfg = LoadConfig::try_parse_from([
            "loadgen",
            "--vus",
            "5",
            "--duration",
            "1m 30s",
            "--url",
            "http://localhost:8080/",
            "--threshold",
            "150ms",
            "--sleep",
            "250ms",
            "--timeout",
            "2s",
            "--json",
        ])
        .unwrap();

        assert_eq!(cfg.vus, 5);
        assert_eq!(cfg.duration, Duration::from_secs(90));
        assert_eq!(cfg.target_url.as_str(), "http://localhost:8080/");
        assert_eq!(cfg.latency_threshold, Duration::from_millis(150));
        assert_eq!(cfg.sleep, Duration::from_millis(250));
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert!(cfg.json);
    }

    #[test]
    fn zero_virtual_users_is_rejected() {
        assert!(LoadConfig::try_parse_from(["loadgen", "--vus", "0"]).is_err());
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(LoadConfig::try_parse_from(["loadgen", "--url", "not a url"]).is_err());
    }
}
