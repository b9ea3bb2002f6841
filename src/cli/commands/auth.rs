use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::config::{self, Session};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Log in and store the bearer token in the session")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Account password (prompted if omitted)")]
        password: Option<String>,
    },

    #[command(about = "Create an account and store the bearer token")]
    Signup {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Account password (prompted if omitted)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored session")]
    Logout,

    #[command(about = "Show the current session")]
    Whoami,
}

pub async fn handle(
    cmd: AuthCommands,
    session: Session,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = resolve_password(password)?;
            let session = acquire_token(session, "/api/users/login", &email, &password).await?;
            config::save_session(&session)?;
            output_success(
                &output_format,
                &format!("Logged in as {}", email),
                Some(json!({ "server_url": session.server_url })),
            )
        }
        AuthCommands::Signup { email, password } => {
            let password = resolve_password(password)?;
            let session = acquire_token(session, "/api/users/signup", &email, &password).await?;
            config::save_session(&session)?;
            output_success(
                &output_format,
                &format!("Account created for {}", email),
                Some(json!({ "server_url": session.server_url })),
            )
        }
        AuthCommands::Logout => {
            config::clear_session()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Whoami => {
            match (&session.email, session.is_authenticated()) {
                (Some(email), true) => output_success(
                    &output_format,
                    &format!("Logged in as {}", email),
                    Some(json!({
                        "server_url": session.server_url,
                        "logged_in_at": session.logged_in_at,
                    })),
                ),
                _ => output_success(
                    &output_format,
                    &format!("Not logged in (server: {})", session.server_url),
                    None,
                ),
            }
        }
    }
}

/// POST credentials to the given account endpoint and build the
/// authenticated session from the returned token
async fn acquire_token(
    session: Session,
    path: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Session> {
    let client = reqwest::Client::new();
    let url = format!("{}{}", session.server_url, path);

    let response = client
        .post(&url)
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        anyhow::bail!("{} ({})", message, status);
    }

    let token = body
        .get("token")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("response is missing the token field"))?;

    Ok(Session::authenticated(
        session.server_url,
        email.to_string(),
        token.to_string(),
    ))
}

fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    // Plain stdin read; input is echoed
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end().to_string();
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    Ok(password)
}
