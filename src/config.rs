//! Configuration types.
//!
//! Everything is read once at startup and handed to each component
//! explicitly. No component reads the environment on its own.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::LlmConfig;
use crate::source::arxiv::DEFAULT_OAI_URL;

/// Default file the file notifier overwrites.
pub const DEFAULT_OUTPUT_PATH: &str = "./tmp.md";

/// Default SMTPS relay (implicit TLS).
pub const DEFAULT_SMTP_HOST: &str = "smtp.qq.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Default completion token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default completion request timeout.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Mail account used by the email notifier.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Sender address, also the SMTP login.
    pub sender: String,
    /// SMTP authorization secret.
    pub auth_code: SecretString,
    pub receivers: Vec<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

/// Where the digest goes.
#[derive(Debug, Clone)]
pub enum Delivery {
    Email(MailConfig),
    File(PathBuf),
}

impl Delivery {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::File(_) => "file",
        }
    }
}

/// Process-wide configuration for one digest run.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub llm: LlmConfig,
    /// Category filter applied by the paper source (e.g. `cs.CL`).
    pub categories: Vec<String>,
    /// Abstract keywords, original case preserved for highlighting.
    pub keywords: Vec<String>,
    /// Truncate the filtered paper set to two items for cheap dry runs.
    pub smoke_test: bool,
    pub delivery: Delivery,
    /// OAI-PMH endpoint of the listing service.
    pub oai_base_url: String,
    /// Write `meta_info.csv` alongside the run.
    pub save_meta_info: bool,
}

impl DigestConfig {
    /// Build config from environment variables.
    ///
    /// A `.env` file in the working directory is honoured when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let max_tokens = parse_or(&lookup, "MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        let timeout_secs = parse_or(&lookup, "LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?;

        let llm = LlmConfig {
            api_key: SecretString::from(required("API_KEY")?),
            base_url: required("BASE_URL")?,
            model: required("MODEL_NAME")?,
            max_tokens,
            timeout: Duration::from_secs(timeout_secs),
        };

        let categories = split_list(&required("CATEGORIES")?);
        let keywords = split_list(&required("KEYWORDS")?);

        let smoke_test = parse_flag(&lookup, "SMOKE_TEST")?;
        let save_meta_info = parse_flag(&lookup, "SAVE_META_INFO")?;

        let delivery = match lookup("DELIVERY")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            None | Some("") | Some("email") => Delivery::Email(MailConfig {
                sender: required("SENDER")?,
                auth_code: SecretString::from(required("AUTH_CODE")?),
                receivers: split_list(&required("RECEIVERS")?),
                smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                smtp_port: parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            }),
            Some("file") => Delivery::File(PathBuf::from(
                lookup("OUTPUT_PATH").unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            )),
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "DELIVERY".into(),
                    message: format!("expected 'email' or 'file', got '{other}'"),
                });
            }
        };

        Ok(Self {
            llm,
            categories,
            keywords,
            smoke_test,
            delivery,
            oai_base_url: lookup("ARXIV_OAI_URL").unwrap_or_else(|| DEFAULT_OAI_URL.to_string()),
            save_meta_info,
        })
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("API_KEY", "sk-test"),
            ("BASE_URL", "http://localhost:9999/v1/chat/completions"),
            ("MODEL_NAME", "deepseek-r1"),
            ("CATEGORIES", "cs.CL, cs.LG"),
            ("KEYWORDS", "LLM, diffusion ,"),
            ("SENDER", "bot@qq.com"),
            ("AUTH_CODE", "secret"),
            ("RECEIVERS", "a@example.com, b@example.com"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<DigestConfig, ConfigError> {
        DigestConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn loads_required_values_with_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.llm.api_key.expose_secret(), "sk-test");
        assert_eq!(config.llm.model, "deepseek-r1");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.llm.timeout, Duration::from_secs(120));
        assert_eq!(config.categories, vec!["cs.CL", "cs.LG"]);
        assert_eq!(config.keywords, vec!["LLM", "diffusion"]);
        assert!(!config.smoke_test);
        assert!(!config.save_meta_info);
        assert_eq!(config.oai_base_url, DEFAULT_OAI_URL);

        match config.delivery {
            Delivery::Email(mail) => {
                assert_eq!(mail.sender, "bot@qq.com");
                assert_eq!(mail.receivers, vec!["a@example.com", "b@example.com"]);
                assert_eq!(mail.smtp_host, "smtp.qq.com");
                assert_eq!(mail.smtp_port, 465);
            }
            other => panic!("expected email delivery, got {}", other.label()),
        }
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let mut env = base_env();
        env.remove("API_KEY");
        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "API_KEY"));
    }

    #[test]
    fn email_delivery_requires_mail_credentials() {
        let mut env = base_env();
        env.remove("AUTH_CODE");
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::MissingEnvVar(ref k) if k == "AUTH_CODE"
        ));
    }

    #[test]
    fn file_delivery_skips_mail_credentials() {
        let mut env = base_env();
        env.remove("SENDER");
        env.remove("AUTH_CODE");
        env.remove("RECEIVERS");
        env.insert("DELIVERY", "file");
        env.insert("OUTPUT_PATH", "/tmp/digest.html");

        let config = load(&env).unwrap();
        match config.delivery {
            Delivery::File(path) => assert_eq!(path, PathBuf::from("/tmp/digest.html")),
            other => panic!("expected file delivery, got {}", other.label()),
        }
    }

    #[test]
    fn unknown_delivery_mode_rejected() {
        let mut env = base_env();
        env.insert("DELIVERY", "pigeon");
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::InvalidValue { ref key, .. } if key == "DELIVERY"
        ));
    }

    #[test]
    fn smoke_test_flag_parsing() {
        for raw in ["1", "true", "YES", " on "] {
            let mut env = base_env();
            env.insert("SMOKE_TEST", raw);
            assert!(load(&env).unwrap().smoke_test, "{raw} should be truthy");
        }
        for raw in ["0", "false", "No", ""] {
            let mut env = base_env();
            env.insert("SMOKE_TEST", raw);
            assert!(!load(&env).unwrap().smoke_test, "{raw} should be falsy");
        }

        let mut env = base_env();
        env.insert("SMOKE_TEST", "maybe");
        assert!(load(&env).is_err());
    }

    #[test]
    fn numeric_overrides_and_errors() {
        let mut env = base_env();
        env.insert("MAX_TOKENS", "2048");
        env.insert("LLM_TIMEOUT_SECS", "30");
        env.insert("SMTP_PORT", "587");
        let config = load(&env).unwrap();
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
        match config.delivery {
            Delivery::Email(mail) => assert_eq!(mail.smtp_port, 587),
            other => panic!("expected email delivery, got {}", other.label()),
        }

        env.insert("MAX_TOKENS", "lots");
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::InvalidValue { ref key, .. } if key == "MAX_TOKENS"
        ));
    }

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(split_list(" a , b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
