use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Client session: which server to talk to and, after login, the bearer
/// credential. Persisted as JSON in the config directory and passed
/// explicitly into each command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub server_url: String,
    pub email: Option<String>,
    pub token: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn anonymous() -> Self {
        let server_url =
            std::env::var("CATALOG_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self {
            server_url,
            email: None,
            token: None,
            logged_in_at: None,
        }
    }

    pub fn authenticated(server_url: String, email: String, token: String) -> Self {
        Self {
            server_url,
            email: Some(email),
            token: Some(token),
            logged_in_at: Some(Utc::now()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CATALOG_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("catalog").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<Session> {
    let config_dir = get_config_dir()?;
    let session_file = config_dir.join("session.json");

    if !session_file.exists() {
        return Ok(Session::anonymous());
    }

    let content = fs::read_to_string(session_file)?;
    let session: Session = serde_json::from_str(&content)?;
    Ok(session)
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;
    let session_file = config_dir.join("session.json");

    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file, content)?;
    Ok(())
}

pub fn clear_session() -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;
    let session_file = config_dir.join("session.json");

    if session_file.exists() {
        fs::remove_file(session_file)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trips_through_config_dir() {
        let dir = std::env::temp_dir().join(format!("catalog-cli-test-{}", std::process::id()));
        std::env::set_var("CATALOG_CLI_CONFIG_DIR", &dir);

        let session = Session::authenticated(
            "http://localhost:9999".to_string(),
            "reader@example.com".to_string(),
            "token-value".to_string(),
        );
        save_session(&session).unwrap();

        let loaded = load_session().unwrap();
        assert_eq!(loaded.server_url, "http://localhost:9999");
        assert_eq!(loaded.email.as_deref(), Some("reader@example.com"));
        assert!(loaded.is_authenticated());

        clear_session().unwrap();
        let cleared = load_session().unwrap();
        assert!(!cleared.is_authenticated());

        std::env::remove_var("CATALOG_CLI_CONFIG_DIR");
        let _ = fs::remove_dir_all(dir);
    }
}
