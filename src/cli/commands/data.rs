use clap::Subcommand;
use serde_json::Value;
use std::io::Read;

use crate::cli::config::Session;
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;

const RESOURCES: &[&str] = &["books", "jobs", "products"];

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List all records of a resource, newest first")]
    List {
        #[arg(help = "Resource name (books, jobs, products)")]
        resource: String,
    },

    #[command(about = "Get a single record by ID")]
    Get {
        #[arg(help = "Resource name (books, jobs, products)")]
        resource: String,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from a JSON document (--data or stdin)")]
    Create {
        #[arg(help = "Resource name (books, jobs, products)")]
        resource: String,
        #[arg(long, help = "JSON document; read from stdin if omitted")]
        data: Option<String>,
    },

    #[command(about = "Update a record from a partial JSON document (--data or stdin)")]
    Update {
        #[arg(help = "Resource name (books, jobs, products)")]
        resource: String,
        #[arg(help = "Record ID")]
        id: String,
        #[arg(long, help = "JSON document; read from stdin if omitted")]
        data: Option<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Resource name (books, jobs, products)")]
        resource: String,
        #[arg(help = "Record ID")]
        id: String,
    },
}

pub async fn handle(
    cmd: DataCommands,
    session: &Session,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = reqwest::Client::new();

    match cmd {
        DataCommands::List { resource } => {
            let url = resource_url(session, &resource, None)?;
            let body = send(session, client.get(&url)).await?;
            output_value(&output_format, &body)
        }
        DataCommands::Get { resource, id } => {
            let url = resource_url(session, &resource, Some(&id))?;
            let body = send(session, client.get(&url)).await?;
            output_value(&output_format, &body)
        }
        DataCommands::Create { resource, data } => {
            let document = resolve_document(data)?;
            let url = resource_url(session, &resource, None)?;
            let body = send(session, client.post(&url).json(&document)).await?;
            output_value(&output_format, &body)
        }
        DataCommands::Update { resource, id, data } => {
            let document = resolve_document(data)?;
            let url = resource_url(session, &resource, Some(&id))?;
            let body = send(session, client.put(&url).json(&document)).await?;
            output_value(&output_format, &body)
        }
        DataCommands::Delete { resource, id } => {
            let url = resource_url(session, &resource, Some(&id))?;
            send(session, client.delete(&url)).await?;
            output_success(
                &output_format,
                &format!("Deleted {}/{}", resource, id),
                None,
            )
        }
    }
}

/// Build /api/<resource>[/<id>], rejecting unknown resource names before any
/// request goes out
fn resource_url(session: &Session, resource: &str, id: Option<&str>) -> anyhow::Result<String> {
    if !RESOURCES.contains(&resource) {
        anyhow::bail!(
            "unknown resource '{}' (expected one of: {})",
            resource,
            RESOURCES.join(", ")
        );
    }

    Ok(match id {
        Some(id) => format!("{}/api/{}/{}", session.server_url, resource, id),
        None => format!("{}/api/{}", session.server_url, resource),
    })
}

/// Send the request with the session's bearer token (if any) and surface API
/// errors as command errors
async fn send(session: &Session, request: reqwest::RequestBuilder) -> anyhow::Result<Value> {
    let request = match session.bearer_token() {
        Some(token) => request.bearer_auth(token),
        None => request,
    };

    let response = request.send().await?;
    let status = response.status();

    // 204 carries no body
    if status == reqwest::StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }

    let body: Value = response.json().await?;

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        anyhow::bail!("{} ({})", message, status);
    }

    Ok(body)
}

fn resolve_document(data: Option<String>) -> anyhow::Result<Value> {
    let raw = match data {
        Some(raw) => raw,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let document: Value = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("invalid JSON document: {}", e))?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            server_url: "http://localhost:3000".to_string(),
            email: None,
            token: None,
            logged_in_at: None,
        }
    }

    #[test]
    fn builds_resource_urls() {
        assert_eq!(
            resource_url(&session(), "books", None).unwrap(),
            "http://localhost:3000/api/books"
        );
        assert_eq!(
            resource_url(&session(), "jobs", Some("abc")).unwrap(),
            "http://localhost:3000/api/jobs/abc"
        );
    }

    #[test]
    fn rejects_unknown_resources() {
        assert!(resource_url(&session(), "gadgets", None).is_err());
    }

    #[test]
    fn parses_inline_documents() {
        let doc = resolve_document(Some("{\"title\":\"Dune\"}".to_string())).unwrap();
        assert_eq!(doc["title"], "Dune");

        assert!(resolve_document(Some("not json".to_string())).is_err());
    }
}
