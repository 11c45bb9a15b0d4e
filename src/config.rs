/// Configuration of the render service.
///
/// Use [`ServiceConfig::builder()`] to set individual fields, or [`ServiceConfig::from_env()`]
/// to read them from the environment.
///
/// # Configuration Options
///
/// | Parameter | Env variable | Default | Description |
/// |-----------|--------------|---------|-------------|
/// | `host` | `RENDERER_HOST` | `127.0.0.1` | Address the HTTP server binds to |
/// | `port` | `RENDERER_PORT` or `PORT` | `5001` | Port the HTTP server binds to |
/// | `json_limit` | `RENDERER_JSON_LIMIT` | `4194304` | Maximum size of a JSON request body in bytes |
///
/// # Example
///
/// ```
/// use pptx_deck_renderer::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .port(8080)
///     .build();
/// assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 8080));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub json_limit: usize,
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_JSON_LIMIT: usize = 4 * 1024 * 1024;

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable lookup. Values that don't parse are ignored
    /// with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(host) = lookup("RENDERER_HOST").filter(|host| !host.trim().is_empty()) {
            builder = builder.host(host.trim());
        }
        if let Some(port) = parse_var(&lookup, "RENDERER_PORT").or_else(|| parse_var(&lookup, "PORT")) {
            builder = builder.port(port);
        }
        if let Some(limit) = parse_var(&lookup, "RENDERER_JSON_LIMIT") {
            builder = builder.json_limit(limit);
        }

        builder.build()
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}, not a valid value", key, raw);
            None
        },
    }
}

/// Builder for [`ServiceConfig`].
///
/// Allows setting individual configuration fields while falling back to defaults for any unspecified values
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    json_limit: Option<usize>,
}

impl ServiceConfigBuilder {
    pub fn host(mut self, value: impl Into<String>) -> Self {
        self.host = Some(value.into());
        self
    }

    pub fn port(mut self, value: u16) -> Self {
        self.port = Some(value);
        self
    }

    pub fn json_limit(mut self, value: usize) -> Self {
        self.json_limit = Some(value);
        self
    }

    /// Builds the final [`ServiceConfig`] instance, applying default values for any fields that were not set.
    pub fn build(self) -> ServiceConfig {
        ServiceConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            json_limit: self.json_limit.unwrap_or(DEFAULT_JSON_LIMIT),
        }
    }
}
