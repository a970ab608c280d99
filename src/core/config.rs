//! Configuration management for the classroom relay.
//!
//! All settings are read once from the environment at startup and injected
//! into the handler state, so request handling never touches ambient
//! process state.

use anyhow::{Context, Result};

/// Default upstream model used when the caller omits one or sends an invalid value.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default base URL of the upstream text-generation API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Fixed output-token ceiling sent with every upstream request.
pub const MAX_OUTPUT_TOKENS: u32 = 900;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration (host, port)
    pub server: ServerConfig,

    /// Upstream provider settings
    pub upstream: UpstreamConfig,

    /// Shared secret expected in `x-app-token`. `None` disables the gate.
    pub access_token: Option<String>,

    /// Input length caps
    pub guardrails: GuardrailConfig,

    /// Output formatting behaviour
    pub formatting: FormattingConfig,

    /// Whether to verify SSL certificates for upstream requests
    pub verify_ssl: bool,

    /// Optional client timeout for the upstream call; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

/// Server-specific configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 18000,
        }
    }
}

/// Upstream text-generation provider configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL; the relay posts to `{api_base}/responses`
    pub api_base: String,

    /// Bearer credential. Missing keys are reported per request, not at startup.
    pub api_key: Option<String>,

    /// Model used when the caller's choice is absent or rejected
    pub default_model: String,

    pub max_output_tokens: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// Length caps applied to caller-supplied fields.
#[derive(Debug, Clone)]
pub struct GuardrailConfig {
    pub enabled: bool,

    pub max_model_len: usize,

    pub max_system_len: usize,

    pub max_prompt_len: usize,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_model_len: 60,
            max_system_len: 4000,
            max_prompt_len: 20_000,
        }
    }
}

/// Output formatting toggles.
#[derive(Debug, Clone)]
pub struct FormattingConfig {
    /// Append the plain-text math instruction to the system text
    pub plain_math_note: bool,

    /// Strip LaTeX delimiters from the returned text
    pub cleanup: bool,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            plain_math_note: true,
            cleanup: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            access_token: None,
            guardrails: GuardrailConfig::default(),
            formatting: FormattingConfig::default(),
            verify_ssl: true,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// Unset variables fall back to defaults. Empty secrets are treated as unset.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use classroom_relay::core::config::AppConfig;
    ///
    /// let config = AppConfig::from_env().expect("invalid configuration");
    /// ```
    pub fn from_env() -> Result<Self> {
        let mut config = AppConfig::default();

        if let Ok(host) = std::env::var("HOST") {
            config.server.host = host;
        }

        if let Ok(port_str) = std::env::var("PORT") {
            config.server.port = port_str
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", port_str))?;
        }

        if let Ok(api_base) = std::env::var("OPENAI_API_BASE") {
            config.upstream.api_base = api_base.trim_end_matches('/').to_string();
        }

        config.upstream.api_key = non_empty_var("OPENAI_API_KEY");

        if let Some(model) = non_empty_var("DEFAULT_MODEL") {
            config.upstream.default_model = model;
        }

        config.access_token = non_empty_var("APP_TOKEN");

        if let Ok(value) = std::env::var("GUARDRAILS_ENABLED") {
            config.guardrails.enabled = str_to_bool(&value);
        }

        if let Ok(value) = std::env::var("PLAIN_MATH_NOTE") {
            config.formatting.plain_math_note = str_to_bool(&value);
        }

        if let Ok(value) = std::env::var("OUTPUT_CLEANUP") {
            config.formatting.cleanup = str_to_bool(&value);
        }

        if let Ok(verify_ssl_str) = std::env::var("VERIFY_SSL") {
            config.verify_ssl = str_to_bool(&verify_ssl_str);
        }

        if let Ok(timeout_str) = std::env::var("REQUEST_TIMEOUT_SECS") {
            let timeout = timeout_str
                .parse::<u64>()
                .with_context(|| format!("Invalid REQUEST_TIMEOUT_SECS value: {}", timeout_str))?;
            config.request_timeout_secs = Some(timeout);
        }

        Ok(config)
    }

    /// Whether the `x-app-token` gate is active.
    pub fn access_gate_enabled(&self) -> bool {
        self.access_token.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: &[&str] = &[
        "HOST",
        "PORT",
        "OPENAI_API_BASE",
        "OPENAI_API_KEY",
        "DEFAULT_MODEL",
        "APP_TOKEN",
        "GUARDRAILS_ENABLED",
        "PLAIN_MATH_NOTE",
        "OUTPUT_CLEANUP",
        "VERIFY_SSL",
        "REQUEST_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_str_to_bool() {
        assert!(str_to_bool("true"));
        assert!(str_to_bool("TRUE"));
        assert!(str_to_bool("1"));
        assert!(str_to_bool("yes"));
        assert!(str_to_bool("On"));
        assert!(!str_to_bool("false"));
        assert!(!str_to_bool("0"));
        assert!(!str_to_bool("off"));
        assert!(!str_to_bool(""));
        assert!(!str_to_bool("invalid"));
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 18000);
        assert_eq!(config.upstream.api_base, "https://api.openai.com/v1");
        assert_eq!(config.upstream.default_model, "gpt-4.1-mini");
        assert_eq!(config.upstream.max_output_tokens, 900);
        assert_eq!(config.guardrails.max_model_len, 60);
        assert_eq!(config.guardrails.max_system_len, 4000);
        assert_eq!(config.guardrails.max_prompt_len, 20_000);
        assert!(config.guardrails.enabled);
        assert!(config.formatting.plain_math_note);
        assert!(config.formatting.cleanup);
        assert!(config.request_timeout_secs.is_none());
        assert!(!config.access_gate_enabled());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = AppConfig::from_env().unwrap();
        assert!(config.upstream.api_key.is_none());
        assert!(config.access_token.is_none());
        assert!(config.verify_ssl);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("HOST", "127.0.0.1");
            std::env::set_var("PORT", "9999");
            std::env::set_var("OPENAI_API_BASE", "http://localhost:8080/v1/");
            std::env::set_var("OPENAI_API_KEY", "sk-test");
            std::env::set_var("APP_TOKEN", "classroom");
            std::env::set_var("GUARDRAILS_ENABLED", "false");
            std::env::set_var("OUTPUT_CLEANUP", "no");
            std::env::set_var("REQUEST_TIMEOUT_SECS", "45");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.upstream.api_base, "http://localhost:8080/v1");
        assert_eq!(config.upstream.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.access_token.as_deref(), Some("classroom"));
        assert!(config.access_gate_enabled());
        assert!(!config.guardrails.enabled);
        assert!(!config.formatting.cleanup);
        assert!(config.formatting.plain_math_note);
        assert_eq!(config.request_timeout_secs, Some(45));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_secrets_are_unset() {
        clear_env();
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "");
            std::env::set_var("APP_TOKEN", "");
        }

        let config = AppConfig::from_env().unwrap();
        assert!(config.upstream.api_key.is_none());
        assert!(!config.access_gate_enabled());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_error() {
        clear_env();
        unsafe {
            std::env::set_var("PORT", "not-a-port");
        }
        assert!(AppConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_is_error() {
        clear_env();
        unsafe {
            std::env::set_var("REQUEST_TIMEOUT_SECS", "soon");
        }
        assert!(AppConfig::from_env().is_err());
        clear_env();
    }
}
