//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags (`--port`, `--address`, ...), `BOOKMD_*`
//! environment variables and an optional configuration file, in that order
//! of precedence. Unset values fall back to the defaults below. A `.env`
//! file, when present, seeds the process environment before loading; it
//! never overrides variables that are already set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::transcription::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Port the server listens on when none is configured.
pub const DEFAULT_PORT: u16 = 9779;
/// Public address whose host part is bound when none is configured.
pub const DEFAULT_ADDRESS: &str = "http://localhost";
/// Connections kept by the database pool when none is configured.
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
/// Environment variable consulted when no API key is configured.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

const DEFAULT_DATABASE_PATH: &str = "./notes.db";
const DEFAULT_IMAGES_DIR: &str = "./images";
const DEFAULT_STATIC_DIR: &str = "./static";

/// Configuration for the notes service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKMD")]
pub struct AppSettings {
    /// Port to listen on.
    #[ortho_config(default = 9779)]
    pub port: u16,
    /// Public address; only its host is used for binding.
    pub address: Option<String>,
    /// SQLite database file.
    pub database_path: Option<PathBuf>,
    /// Directory uploaded images are stored in.
    pub images_dir: Option<PathBuf>,
    /// Directory served under `/static/`.
    pub static_dir: Option<PathBuf>,
    /// Bearer token for the transcription provider.
    pub api_key: Option<String>,
    /// Chat-completion model name.
    pub model: Option<String>,
    /// Base URL of the OpenAI-compatible provider.
    pub base_url: Option<String>,
    /// Request timeout for transcription calls, in seconds.
    pub transcription_timeout_secs: Option<u64>,
    /// Maximum database connections.
    pub db_pool_size: Option<u32>,
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The provider base URL could not be parsed.
    #[error("invalid base URL `{value}`: {source}")]
    BaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Load `KEY=value` pairs from the nearest `.env` file (the working directory
/// or one of its ancestors) into the process environment.
///
/// # Errors
/// Returns the [`dotenvy::Error`]; [`dotenvy::Error::not_found`] tells an
/// absent file apart from an unreadable or malformed one.
pub fn load_dotenv() -> Result<PathBuf, dotenvy::Error> {
    dotenvy::dotenv()
}

/// Load `KEY=value` pairs from the `.env`-formatted file at `path`.
///
/// # Errors
/// As [`load_dotenv`].
pub fn load_dotenv_from(path: &Path) -> Result<(), dotenvy::Error> {
    dotenvy::from_path(path)
}

fn non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

impl AppSettings {
    /// Configured address, falling back to [`DEFAULT_ADDRESS`].
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_ADDRESS)
    }

    /// Host to bind: the host part of [`Self::address`], or the address
    /// itself when it is not a URL.
    pub fn bind_host(&self) -> String {
        let address = self.address();
        match Url::parse(address) {
            Ok(url) => url
                .host_str()
                .map(|host| host.trim_matches(['[', ']']).to_owned())
                .unwrap_or_else(|| address.to_owned()),
            Err(_) => address.to_owned(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    pub fn images_dir(&self) -> PathBuf {
        self.images_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR))
    }

    pub fn static_dir(&self) -> PathBuf {
        self.static_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
    }

    /// API key from settings, else from `OPENAI_API_KEY`. Blank values count
    /// as unset.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| non_blank(key))
            .or_else(|| {
                std::env::var(OPENAI_API_KEY_VAR)
                    .ok()
                    .filter(|key| non_blank(key))
            })
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|model| non_blank(model))
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Provider base URL.
    ///
    /// # Errors
    /// Returns [`SettingsError::BaseUrl`] when the configured value is not a
    /// valid URL.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let value = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(value).map_err(|source| SettingsError::BaseUrl {
            value: value.to_owned(),
            source,
        })
    }

    /// Transcription request timeout; `None` means no timeout.
    pub fn transcription_timeout(&self) -> Option<Duration> {
        self.transcription_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_DB_POOL_SIZE).max(1)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and fallbacks.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 11] = [
        "BOOKMD_PORT",
        "BOOKMD_ADDRESS",
        "BOOKMD_DATABASE_PATH",
        "BOOKMD_IMAGES_DIR",
        "BOOKMD_STATIC_DIR",
        "BOOKMD_API_KEY",
        "BOOKMD_MODEL",
        "BOOKMD_BASE_URL",
        "BOOKMD_TRANSCRIPTION_TIMEOUT_SECS",
        "BOOKMD_DB_POOL_SIZE",
        OPENAI_API_KEY_VAR,
    ];

    fn cleared_env(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load(args: &[&str]) -> AppSettings {
        let argv = std::iter::once(OsString::from("bookmd")).chain(args.iter().map(OsString::from));
        AppSettings::load_from_iter(argv).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared_env(&[]));

        let settings = load(&[]);

        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.address(), DEFAULT_ADDRESS);
        assert_eq!(settings.bind_host(), "localhost");
        assert_eq!(settings.database_path(), PathBuf::from("./notes.db"));
        assert_eq!(settings.images_dir(), PathBuf::from("./images"));
        assert_eq!(settings.static_dir(), PathBuf::from("./static"));
        assert_eq!(settings.api_key(), None);
        assert_eq!(settings.model(), DEFAULT_MODEL);
        assert_eq!(
            settings.base_url().expect("default base url parses").as_str(),
            DEFAULT_BASE_URL
        );
        assert_eq!(settings.transcription_timeout(), None);
        assert_eq!(settings.db_pool_size(), DEFAULT_DB_POOL_SIZE);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_env(&[
            ("BOOKMD_PORT", "8080"),
            ("BOOKMD_ADDRESS", "http://0.0.0.0"),
            ("BOOKMD_DATABASE_PATH", "/tmp/notes.db"),
            ("BOOKMD_API_KEY", "from-bookmd"),
            ("BOOKMD_MODEL", "gpt-4o-mini"),
            ("BOOKMD_TRANSCRIPTION_TIMEOUT_SECS", "30"),
            ("BOOKMD_DB_POOL_SIZE", "8"),
        ]));

        let settings = load(&[]);

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.bind_host(), "0.0.0.0");
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/notes.db"));
        assert_eq!(settings.api_key().as_deref(), Some("from-bookmd"));
        assert_eq!(settings.model(), "gpt-4o-mini");
        assert_eq!(settings.transcription_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.db_pool_size(), 8);
    }

    #[rstest]
    fn cli_flags_override_environment() {
        let _guard = lock_env(cleared_env(&[("BOOKMD_PORT", "8080")]));

        let settings = load(&["--port", "9000", "--address", "http://127.0.0.1"]);

        assert_eq!(settings.port, 9000);
        assert_eq!(settings.bind_host(), "127.0.0.1");
    }

    #[rstest]
    #[case(Some("   "), Some("from-openai"), Some("from-openai"))]
    #[case(None, Some("from-openai"), Some("from-openai"))]
    #[case(Some("configured"), Some("from-openai"), Some("configured"))]
    #[case(None, Some(""), None)]
    fn api_key_falls_back_to_openai_variable(
        #[case] configured: Option<&str>,
        #[case] openai: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let mut overrides = Vec::new();
        if let Some(value) = openai {
            overrides.push((OPENAI_API_KEY_VAR, value));
        }
        let _guard = lock_env(cleared_env(&overrides));
        let mut settings = load(&[]);
        settings.api_key = configured.map(str::to_owned);

        assert_eq!(settings.api_key().as_deref(), expected);
    }

    #[rstest]
    #[case("http://localhost", "localhost")]
    #[case("https://notes.example.com:8443", "notes.example.com")]
    #[case("http://[::1]", "::1")]
    #[case("127.0.0.1", "127.0.0.1")]
    fn bind_host_uses_the_address_host(#[case] address: &str, #[case] expected: &str) {
        let settings = AppSettings {
            port: DEFAULT_PORT,
            address: Some(address.to_owned()),
            database_path: None,
            images_dir: None,
            static_dir: None,
            api_key: None,
            model: None,
            base_url: None,
            transcription_timeout_secs: None,
            db_pool_size: None,
        };

        assert_eq!(settings.bind_host(), expected);
    }

    #[rstest]
    fn zero_timeout_means_no_timeout() {
        let _guard = lock_env(cleared_env(&[("BOOKMD_TRANSCRIPTION_TIMEOUT_SECS", "0")]));
        assert_eq!(load(&[]).transcription_timeout(), None);
    }

    #[rstest]
    fn dotenv_file_supplies_the_api_key_and_prefixed_settings() {
        let _guard = lock_env(cleared_env(&[("BOOKMD_PORT", "8080")]));
        let dir = tempfile::tempdir().expect("temp dir");
        let env_file = dir.path().join(".env");
        std::fs::write(
            &env_file,
            "OPENAI_API_KEY=sk-from-dotenv\nBOOKMD_MODEL=gpt-4o-mini\nBOOKMD_PORT=1234\n",
        )
        .expect("write .env");

        load_dotenv_from(&env_file).expect(".env loads");
        let settings = load(&[]);

        assert_eq!(settings.api_key().as_deref(), Some("sk-from-dotenv"));
        assert_eq!(settings.model(), "gpt-4o-mini");
        assert_eq!(settings.port, 8080, "set variables win over the file");
    }

    #[rstest]
    fn missing_dotenv_file_is_reported_as_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");

        let err = load_dotenv_from(&dir.path().join(".env")).expect_err("no file");

        assert!(err.not_found());
    }
}
