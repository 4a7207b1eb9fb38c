use std::sync::OnceLock;
use std::time::Duration;

/// What the filter pipeline does when the liveness dependency cannot answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivenessFallback {
    /// Treat the destination as live and keep routing.
    FailOpen,
    /// Reject the call.
    FailClosed,
}

#[derive(Clone, Debug)]
pub struct FilterConfig {
    pub required_country_code: String,
    pub expected_length: usize,
    pub liveness_fallback: LivenessFallback,
    pub fallback_region: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            required_country_code: "212".to_string(),
            expected_length: 12,
            liveness_fallback: LivenessFallback::FailOpen,
            fallback_region: "UNKNOWN".to_string(),
        }
    }
}

impl FilterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let required_country_code = env_non_empty("FILTER_REQUIRED_COUNTRY_CODE")
            .map(|value| value.trim_start_matches('+').to_string())
            .filter(|value| value.chars().all(|c| c.is_ascii_digit()) && !value.is_empty())
            .unwrap_or(defaults.required_country_code);
        let expected_length = env_u32("FILTER_EXPECTED_LENGTH", defaults.expected_length as u32);
        let liveness_fallback = if env_bool("FILTER_LIVENESS_FAIL_OPEN", true) {
            LivenessFallback::FailOpen
        } else {
            LivenessFallback::FailClosed
        };
        let fallback_region =
            env_non_empty("PHONE_FALLBACK_REGION").unwrap_or(defaults.fallback_region);
        Self {
            required_country_code,
            expected_length: expected_length as usize,
            liveness_fallback,
            fallback_region,
        }
    }
}

static FILTER_CONFIG: OnceLock<FilterConfig> = OnceLock::new();

pub fn filter_config() -> &'static FilterConfig {
    FILTER_CONFIG.get_or_init(FilterConfig::from_env)
}

/// Which external service answers liveness lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivenessProvider {
    /// Messaging-channel account check.
    WaValidator,
    /// Line-type lookup used as a backup when the primary is unavailable.
    NumVerify,
}

impl LivenessProvider {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "wa" | "whatsapp" | "wa-validator" => Some(Self::WaValidator),
            "numverify" => Some(Self::NumVerify),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LivenessConfig {
    pub provider: LivenessProvider,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub batch_concurrency: usize,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            provider: LivenessProvider::WaValidator,
            api_url: None,
            api_key: None,
            timeout: Duration::from_millis(10_000),
            cache_ttl: Duration::from_secs(86_400),
            batch_concurrency: 5,
        }
    }
}

impl LivenessConfig {
    pub fn from_env() -> Self {
        let provider = match env_non_empty("LIVENESS_PROVIDER") {
            Some(raw) => LivenessProvider::from_label(&raw).unwrap_or_else(|| {
                log::warn!("[config] LIVENESS_PROVIDER={} is unknown, using wa", raw);
                LivenessProvider::WaValidator
            }),
            None => LivenessProvider::WaValidator,
        };
        let api_url = env_non_empty("LIVENESS_API_URL");
        let api_key = env_non_empty("LIVENESS_API_KEY");
        if api_url.is_some() && api_key.is_none() {
            log::warn!("[config] LIVENESS_API_URL is set but LIVENESS_API_KEY is missing");
        }
        Self {
            provider,
            api_url,
            api_key,
            timeout: env_duration_ms("LIVENESS_TIMEOUT_MS", 10_000),
            cache_ttl: env_duration_sec("LIVENESS_CACHE_TTL_SEC", 86_400),
            batch_concurrency: env_u32("LIVENESS_BATCH_CONCURRENCY", 5).max(1) as usize,
        }
    }
}

static LIVENESS_CONFIG: OnceLock<LivenessConfig> = OnceLock::new();

pub fn liveness_config() -> &'static LivenessConfig {
    LIVENESS_CONFIG.get_or_init(LivenessConfig::from_env)
}

#[derive(Clone, Debug)]
pub struct ClassifierConfig {
    pub confidence_threshold: f64,
    pub scorer_enabled: bool,
    pub scorer_url: String,
    pub scorer_model: String,
    pub scorer_timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            scorer_enabled: false,
            scorer_url: "http://localhost:11434/api/chat".to_string(),
            scorer_model: "llama3".to_string(),
            scorer_timeout: Duration::from_millis(20_000),
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut confidence_threshold =
            env_f64("CLASSIFIER_CONFIDENCE_THRESHOLD", defaults.confidence_threshold);
        if !(0.0..=1.0).contains(&confidence_threshold) {
            log::warn!(
                "[config] CLASSIFIER_CONFIDENCE_THRESHOLD={} outside [0,1], using {}",
                confidence_threshold,
                defaults.confidence_threshold
            );
            confidence_threshold = defaults.confidence_threshold;
        }
        Self {
            confidence_threshold,
            scorer_enabled: env_bool("CLASSIFIER_SCORER_ENABLED", false),
            scorer_url: env_non_empty("CLASSIFIER_SCORER_URL").unwrap_or(defaults.scorer_url),
            scorer_model: env_non_empty("CLASSIFIER_SCORER_MODEL")
                .unwrap_or(defaults.scorer_model),
            scorer_timeout: env_duration_ms("CLASSIFIER_SCORER_TIMEOUT_MS", 20_000),
        }
    }
}

static CLASSIFIER_CONFIG: OnceLock<ClassifierConfig> = OnceLock::new();

pub fn classifier_config() -> &'static ClassifierConfig {
    CLASSIFIER_CONFIG.get_or_init(ClassifierConfig::from_env)
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    fn from_env() -> Self {
        Self {
            url: env_non_empty("DATABASE_URL"),
            max_connections: env_u32("DATABASE_MAX_CONNECTIONS", 5).max(1),
        }
    }
}

static DATABASE_CONFIG: OnceLock<DatabaseConfig> = OnceLock::new();

pub fn database_config() -> &'static DatabaseConfig {
    DATABASE_CONFIG.get_or_init(DatabaseConfig::from_env)
}

/// Assisted-handling agents that take over suspicious calls.
#[derive(Clone, Debug, Default)]
pub struct AgentConfig {
    pub endpoints: Vec<String>,
}

impl AgentConfig {
    fn from_env() -> Self {
        let endpoints = env_non_empty("ASSISTED_AGENT_ENDPOINTS")
            .map(|raw| {
                raw.split(',')
                    .map(|endpoint| endpoint.trim().to_string())
                    .filter(|endpoint| !endpoint.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { endpoints }
    }
}

static AGENT_CONFIG: OnceLock<AgentConfig> = OnceLock::new();

pub fn agent_config() -> &'static AgentConfig {
    AGENT_CONFIG.get_or_init(AgentConfig::from_env)
}

#[derive(Clone, Debug)]
pub enum LogMode {
    Stdout,
    File,
}

#[derive(Clone, Debug)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub mode: LogMode,
    pub format: LogFormat,
    pub dir: Option<String>,
    pub file_name: String,
}

impl LoggingConfig {
    fn from_env() -> Self {
        let dir_env = env_non_empty("LOG_DIR");
        let format = match env_non_empty("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        let mode = match env_non_empty("LOG_MODE").as_deref() {
            Some("file") => LogMode::File,
            Some("stdout") => LogMode::Stdout,
            _ if dir_env.is_some() => LogMode::File,
            _ => LogMode::Stdout,
        };
        let dir = match mode {
            LogMode::File => Some(dir_env.unwrap_or_else(|| "logs".to_string())),
            LogMode::Stdout => None,
        };
        let file_name =
            env_non_empty("LOG_FILE_NAME").unwrap_or_else(|| "call-gateway.log".to_string());
        Self {
            mode,
            format,
            dir,
            file_name,
        }
    }
}

static LOGGING: OnceLock<LoggingConfig> = OnceLock::new();

pub fn logging_config() -> &'static LoggingConfig {
    LOGGING.get_or_init(LoggingConfig::from_env)
}

fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(key, default_ms))
}

fn env_duration_sec(key: &str, default_sec: u64) -> Duration {
    Duration::from_secs(env_u64(key, default_sec))
}

fn env_bool(key: &str, default_value: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(default_value)
}

fn env_u32(key: &str, default_value: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default_value)
}

fn env_u64(key: &str, default_value: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_value)
}

fn env_f64(key: &str, default_value: f64) -> f64 {
    match env_non_empty(key) {
        Some(raw) => raw.parse::<f64>().unwrap_or_else(|_| {
            log::warn!("[config] {}={} is not a number, using {}", key, raw, default_value);
            default_value
        }),
        None => default_value,
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_target_morocco_mobile_numbers() {
        let cfg = FilterConfig::default();
        assert_eq!(cfg.required_country_code, "212");
        assert_eq!(cfg.expected_length, 12);
        assert_eq!(cfg.liveness_fallback, LivenessFallback::FailOpen);
    }

    #[test]
    fn liveness_provider_labels() {
        assert_eq!(
            LivenessProvider::from_label("NumVerify"),
            Some(LivenessProvider::NumVerify)
        );
        assert_eq!(
            LivenessProvider::from_label("wa"),
            Some(LivenessProvider::WaValidator)
        );
        assert_eq!(LivenessProvider::from_label("twilio"), None);
        assert_eq!(
            LivenessConfig::default().provider,
            LivenessProvider::WaValidator
        );
    }

    #[test]
    fn env_bool_accepts_common_truthy_values() {
        std::env::set_var("CGW_TEST_ENV_BOOL", "Yes");
        assert!(env_bool("CGW_TEST_ENV_BOOL", false));
        std::env::set_var("CGW_TEST_ENV_BOOL", "off");
        assert!(!env_bool("CGW_TEST_ENV_BOOL", true));
        std::env::remove_var("CGW_TEST_ENV_BOOL");
        assert!(env_bool("CGW_TEST_ENV_BOOL", true));
    }

    #[test]
    fn env_non_empty_ignores_blank_values() {
        std::env::set_var("CGW_TEST_ENV_BLANK", "   ");
        assert_eq!(env_non_empty("CGW_TEST_ENV_BLANK"), None);
        std::env::remove_var("CGW_TEST_ENV_BLANK");
    }
}
