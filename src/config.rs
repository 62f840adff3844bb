use std::{
    env,
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const DEFAULT_LOG_FILE: &str = "sisense.log";
const DEFAULT_HTTP_PORT: u16 = 30845;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An error encountered while loading or resolving a configuration profile.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to load config file")]
    Io(#[from] io::Error),
    #[error("Invalid configuration")]
    Invalid(#[from] serde_yaml::Error),
    #[error("No domain found")]
    NoDomain,
    #[error("No token found")]
    NoToken,
    #[error("Token contains invalid characters")]
    InvalidToken,
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("Invalid URI")]
    InvalidUri(#[from] http::uri::InvalidUri),
}

/// A fully resolved configuration profile for talking to a Sisense
/// deployment.
#[derive(Clone, Serialize)]
pub struct Profile {
    /// The hostname of the deployment, without scheme.
    pub domain: String,
    /// The bearer token sent with every request.
    #[serde(serialize_with = "mask")]
    pub token: String,
    /// Use `https://` (true) or `http://` on the non-SSL port (false).
    pub is_ssl: bool,
    /// Verify TLS certificates. Only meaningful when `is_ssl` is set; turning
    /// it off affects this profile's clients only.
    pub verify_tls: bool,
    /// An explicit port. Defaults to 443 for SSL and 30845 otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// The timeout for a single call, including connecting and reading the
    /// response.
    #[serde(serialize_with = "humantime_str")]
    pub timeout: Duration,
    /// The file client logs are appended to.
    pub log_file: PathBuf,
    /// Log at DEBUG instead of INFO.
    pub debug: bool,
    /// The user-agent used on requests. Intended for internal use.
    #[serde(skip)]
    pub user_agent: String,
    /// The config file this profile was loaded from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("domain", &self.domain)
            .field("token", &"********")
            .field("is_ssl", &self.is_ssl)
            .field("verify_tls", &self.verify_tls)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("log_file", &self.log_file)
            .field("debug", &self.debug)
            .finish()
    }
}

fn mask<S: Serializer>(_token: &str, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str("********")
}

fn humantime_str<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&humantime::format_duration(*d))
}

/// A timeout in the config file: either whole seconds or a humantime string
/// like `1m 30s`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Secs(u64),
    Human(String),
}

/// The config file as written on disk.
#[derive(Debug, Default, Clone, Deserialize)]
struct ConfigFile {
    domain: Option<String>,
    token: Option<String>,
    is_ssl: Option<bool>,
    verify_ssl: Option<bool>,
    port: Option<u16>,
    timeout: Option<RawTimeout>,
    log_file: Option<PathBuf>,
    debug: Option<bool>,
}

impl Profile {
    /// Create a profile for the given domain and token, with every other
    /// setting at its default.
    pub fn new(domain: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            token: token.into(),
            is_ssl: true,
            verify_tls: true,
            port: None,
            timeout: DEFAULT_TIMEOUT,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            debug: false,
            user_agent: make_ua(None),
            config_path: None,
        }
    }

    /// Prepend a product name to the user-agent sent with requests.
    pub fn with_ua_product(self, ua_product: &str) -> Self {
        Self {
            user_agent: make_ua(Some(ua_product)),
            ..self
        }
    }

    /// Load the profile from the file named by `SISENSE_CONFIG`, or
    /// `config.yaml` in the working directory, applying environment
    /// overrides. See [Profile::from_env].
    pub fn from_default_env() -> Result<Self, Error> {
        let path = env::var_os("SISENSE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::from_env(path)
    }

    /// Load the profile from the given file. If the file does not exist,
    /// the profile is loaded solely from the environment.
    ///
    /// The following environment variables override the corresponding
    /// values in the config file:
    ///
    /// | Environment Variable | Config Value |
    /// |----------------------|--------------|
    /// | `SISENSE_DOMAIN`     | `domain`     |
    /// | `SISENSE_TOKEN`      | `token`      |
    /// | `SISENSE_IS_SSL`     | `is_ssl`     |
    pub fn from_env(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let (raw, config_path) = match read_config(path) {
            Ok(raw) => (raw, Some(path.to_owned())),
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file found");
                (ConfigFile::default(), None)
            }
            Err(e) => return Err(e),
        };

        let raw = apply_overrides(raw, |name| env::var(name).ok());
        Self::from_raw(raw, config_path)
    }

    /// Load the profile from the given file, which must be a valid config
    /// file. Does not read any environment variables.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = read_config(path)?;
        Self::from_raw(raw, Some(path.to_owned()))
    }

    /// The scheme, host and port that call paths are appended to.
    pub fn base_url(&self) -> String {
        match (self.is_ssl, self.port) {
            (true, None) => format!("https://{}", self.domain),
            (true, Some(port)) => format!("https://{}:{port}", self.domain),
            (false, port) => format!(
                "http://{}:{}",
                self.domain,
                port.unwrap_or(DEFAULT_HTTP_PORT)
            ),
        }
    }

    fn from_raw(raw: ConfigFile, config_path: Option<PathBuf>) -> Result<Self, Error> {
        let ConfigFile {
            domain,
            token,
            is_ssl,
            verify_ssl,
            port,
            timeout,
            log_file,
            debug,
        } = raw;

        let domain = domain
            .map(|d| d.trim().trim_end_matches('/').to_owned())
            .filter(|d| !d.is_empty())
            .ok_or(Error::NoDomain)?;

        let token = token.ok_or(Error::NoToken)?;
        if !token.is_ascii() {
            return Err(Error::InvalidToken);
        }

        let timeout = match timeout {
            None => DEFAULT_TIMEOUT,
            Some(RawTimeout::Secs(secs)) => Duration::from_secs(secs),
            Some(RawTimeout::Human(s)) => {
                humantime::parse_duration(&s).map_err(|_| Error::InvalidTimeout(s))?
            }
        };

        if timeout.is_zero() {
            return Err(Error::InvalidTimeout("0s".to_string()));
        }

        let profile = Self {
            domain,
            token,
            is_ssl: is_ssl.unwrap_or(true),
            verify_tls: verify_ssl.unwrap_or(true),
            port,
            timeout,
            log_file: log_file.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            debug: debug.unwrap_or(false),
            user_agent: make_ua(None),
            config_path,
        };

        // Reject domains that can't form a URI now rather than on every call.
        let _: http::Uri = profile.base_url().parse()?;
        Ok(profile)
    }
}

fn read_config(p: &Path) -> Result<ConfigFile, Error> {
    let file = File::open(p)?;
    let config: ConfigFile = serde_yaml::from_reader(file).map_err(Error::Invalid)?;

    debug!(path = %p.display(), "loaded config file");
    Ok(config)
}

fn apply_overrides(mut raw: ConfigFile, var: impl Fn(&str) -> Option<String>) -> ConfigFile {
    if let Some(domain) = var("SISENSE_DOMAIN") {
        raw.domain = Some(domain);
    }

    if let Some(token) = var("SISENSE_TOKEN") {
        raw.token = Some(token);
    }

    if let Some(is_ssl) = var("SISENSE_IS_SSL") {
        match is_ssl.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => raw.is_ssl = Some(true),
            "0" | "false" | "no" | "off" => raw.is_ssl = Some(false),
            other => debug!(value = other, "ignoring unrecognized SISENSE_IS_SSL"),
        }
    }

    raw
}

fn make_ua(product: Option<&str>) -> String {
    let base = format!("sisense-rs/{}", env!("CARGO_PKG_VERSION"));
    match product {
        Some(product) => format!("{product} {base}"),
        None => base,
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn read_minimal() {
        let (_dir, path) = write_config("domain: bi.example.com\ntoken: abc123\n");
        let profile = Profile::read(&path).unwrap();

        assert_eq!(profile.domain, "bi.example.com");
        assert_eq!(profile.token, "abc123");
        assert!(profile.is_ssl);
        assert!(profile.verify_tls);
        assert_eq!(profile.timeout, DEFAULT_TIMEOUT);
        assert_eq!(profile.log_file, PathBuf::from("sisense.log"));
        assert_eq!(profile.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(profile.base_url(), "https://bi.example.com");
    }

    #[test]
    fn read_full() {
        let (_dir, path) = write_config(
            "
domain: 10.0.0.5
token: abc123
is_ssl: false
verify_ssl: false
timeout: 1m 30s
log_file: logs/client.log
debug: true
",
        );
        let profile = Profile::read(&path).unwrap();

        assert!(!profile.is_ssl);
        assert!(!profile.verify_tls);
        assert!(profile.debug);
        assert_eq!(profile.timeout, Duration::from_secs(90));
        assert_eq!(profile.log_file, PathBuf::from("logs/client.log"));
        assert_eq!(profile.base_url(), "http://10.0.0.5:30845");
    }

    #[test]
    fn explicit_port() {
        let (_dir, path) = write_config("domain: bi.local\ntoken: t\nport: 8443\ntimeout: 5\n");
        let profile = Profile::read(&path).unwrap();

        assert_eq!(profile.base_url(), "https://bi.local:8443");
        assert_eq!(profile.timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_values() {
        let (_dir, path) = write_config("token: abc\n");
        assert_matches!(Profile::read(&path), Err(Error::NoDomain));

        let (_dir, path) = write_config("domain: bi.example.com\n");
        assert_matches!(Profile::read(&path), Err(Error::NoToken));
    }

    #[test]
    fn invalid_values() {
        let (_dir, path) = write_config("domain: bi.example.com\ntoken: \"tökén\"\n");
        assert_matches!(Profile::read(&path), Err(Error::InvalidToken));

        let (_dir, path) = write_config("domain: bi.example.com\ntoken: t\ntimeout: soon\n");
        assert_matches!(Profile::read(&path), Err(Error::InvalidTimeout(s)) if s == "soon");

        let (_dir, path) = write_config("domain: \"bad host\"\ntoken: t\n");
        assert_matches!(Profile::read(&path), Err(Error::InvalidUri(_)));

        let (_dir, path) = write_config("domain: [1, 2]\n");
        assert_matches!(Profile::read(&path), Err(Error::Invalid(_)));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(Profile::read(dir.path().join("nope.yaml")), Err(Error::Io(_)));
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SISENSE_DOMAIN", "override.example.com"),
            ("SISENSE_TOKEN", "from-env"),
            ("SISENSE_IS_SSL", "False"),
        ]
        .into_iter()
        .collect();

        let raw = ConfigFile {
            domain: Some("bi.example.com".into()),
            token: Some("from-file".into()),
            ..Default::default()
        };

        let raw = apply_overrides(raw, |name| vars.get(name).map(|v| v.to_string()));
        let profile = Profile::from_raw(raw, None).unwrap();

        assert_eq!(profile.domain, "override.example.com");
        assert_eq!(profile.token, "from-env");
        assert_eq!(profile.base_url(), "http://override.example.com:30845");
    }

    #[test]
    fn token_is_masked() {
        let profile = Profile::new("bi.example.com", "super-secret");

        let debug = format!("{profile:?}");
        assert!(!debug.contains("super-secret"));

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["token"], "********");
        assert_eq!(json["timeout"], "30s");
    }

    #[test]
    fn user_agent_product() {
        let profile = Profile::new("bi.example.com", "t");
        assert!(profile.user_agent.starts_with("sisense-rs/"));

        let profile = profile.with_ua_product("sisense-cli");
        assert!(profile.user_agent.starts_with("sisense-cli sisense-rs/"));
    }
}
