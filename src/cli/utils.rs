use crate::cli::OutputFormat;
use serde_json::{json, Value};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(map)) = data {
                response.as_object_mut().unwrap().extend(map);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a response document (or array) in the appropriate format
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => match value {
            Value::Array(items) => {
                if items.is_empty() {
                    println!("(no records)");
                }
                for item in items {
                    println!("{}", summarize(item));
                }
            }
            other => println!("{}", serde_json::to_string_pretty(other)?),
        },
    }
    Ok(())
}

/// One-line preview for list output: id followed by the title field
fn summarize(item: &Value) -> String {
    let id = item.get("id").and_then(Value::as_str).unwrap_or("?");
    let title = item.get("title").and_then(Value::as_str).unwrap_or("");
    format!("{}  {}", id, title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_id_and_title() {
        let item = json!({ "id": "abc", "title": "Dune", "author": "Herbert" });
        assert_eq!(summarize(&item), "abc  Dune");
    }
}
