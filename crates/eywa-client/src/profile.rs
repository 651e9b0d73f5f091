//! Local connection profiles.
//!
//! A profile is a JSON bundle describing one target server:
//! `{"protocol": "https", "host": "...", "port": 9090, "username": "...",
//! "password": "..."}`. Newer tool invocations read it instead of passing
//! every flag; explicit flags still win over profile values.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::client::{ConnectOptions, Scheme};
use crate::error::ProfileError;

#[derive(Debug, Deserialize)]
struct RawProfile {
    #[serde(default = "default_protocol")]
    protocol: String,
    host: String,
    port: u16,
    username: String,
    password: String,
    #[serde(default)]
    insecure: bool,
}

fn default_protocol() -> String {
    "http".to_string()
}

/// A validated connection profile.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Transport scheme.
    pub scheme: Scheme,
    /// Server hostname or address.
    pub host: String,
    /// Admin API port.
    pub port: u16,
    /// Admin username.
    pub username: String,
    /// Admin password.
    pub password: String,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl Profile {
    /// Loads and validates a profile file.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] when the file cannot be read, is not
    /// valid JSON, or names an unsupported protocol.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: display.clone(),
            source,
        })?;
        let raw: RawProfile =
            serde_json::from_str(&text).map_err(|source| ProfileError::Parse {
                path: display.clone(),
                source,
            })?;
        let scheme = raw.protocol.parse().map_err(|_| ProfileError::Protocol {
            path: display,
            value: raw.protocol.clone(),
        })?;
        Ok(Self {
            scheme,
            host: raw.host,
            port: raw.port,
            username: raw.username,
            password: raw.password,
            insecure: raw.insecure,
        })
    }

    /// Converts the profile into connection options with the given default
    /// timeout.
    #[must_use]
    pub fn connect_options(&self, timeout: Duration) -> ConnectOptions {
        ConnectOptions {
            scheme: self.scheme,
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            insecure: self.insecure,
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use anyhow::Result;

    use super::*;

    fn scratch_file(name: &str, contents: &str) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!("eywa-profile-{}-{name}", std::process::id()));
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    #[test]
    fn loads_a_complete_profile() -> Result<()> {
        let path = scratch_file(
            "complete.json",
            r#"{"protocol":"https","host":"eywa.example","port":9443,
                "username":"root","password":"secret","insecure":true}"#,
        )?;
        let profile = Profile::load(&path)?;
        assert_eq!(profile.scheme, Scheme::Https);
        assert_eq!(profile.host, "eywa.example");
        assert_eq!(profile.port, 9443);
        assert!(profile.insecure);

        let options = profile.connect_options(Duration::from_secs(30));
        assert_eq!(options.base_url()?.as_str(), "https://eywa.example:9443/");
        std::fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn protocol_defaults_to_http() -> Result<()> {
        let path = scratch_file(
            "default-protocol.json",
            r#"{"host":"127.0.0.1","port":8080,"username":"u","password":"p"}"#,
        )?;
        let profile = Profile::load(&path)?;
        assert_eq!(profile.scheme, Scheme::Http);
        assert!(!profile.insecure);
        std::fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn unsupported_protocol_is_rejected() -> Result<()> {
        let path = scratch_file(
            "bad-protocol.json",
            r#"{"protocol":"gopher","host":"h","port":1,"username":"u","password":"p"}"#,
        )?;
        let err = Profile::load(&path).unwrap_err();
        assert!(matches!(err, ProfileError::Protocol { value, .. } if value == "gopher"));
        std::fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Profile::load(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(matches!(err, ProfileError::Io { .. }));
    }
}
