//! HTTP server configuration object and helpers.

use std::path::{Path, PathBuf};

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_host: String,
    pub(crate) port: u16,
    pub(crate) static_dir: PathBuf,
}

impl ServerConfig {
    /// Listen on `bind_host:port`, serving static files from `./static`.
    #[must_use]
    pub fn new(bind_host: impl Into<String>, port: u16) -> Self {
        Self {
            bind_host: bind_host.into(),
            port,
            static_dir: PathBuf::from("./static"),
        }
    }

    /// Serve `/static/{file}` from `static_dir`.
    #[must_use]
    pub fn with_static_dir(mut self, static_dir: impl Into<PathBuf>) -> Self {
        self.static_dir = static_dir.into();
        self
    }

    /// Host and port the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.bind_host.as_str(), self.port)
    }

    #[must_use]
    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_serve_the_local_static_directory() {
        let config = ServerConfig::new("localhost", 9779);

        assert_eq!(config.bind_addr(), ("localhost", 9779));
        assert_eq!(config.static_dir(), Path::new("./static"));
    }

    #[rstest]
    fn static_dir_can_be_overridden() {
        let config = ServerConfig::new("0.0.0.0", 80).with_static_dir("/srv/static");
        assert_eq!(config.static_dir(), Path::new("/srv/static"));
    }
}
