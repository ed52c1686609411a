// ABOUTME: Static service descriptor handler for agent registries.
// ABOUTME: Lists the gateway's endpoints keyed by name, their parameters, and the auth scheme.

use axum::Json;
use serde_json::{json, Value};

/// Machine-readable descriptor of the gateway's operations.
pub fn service_descriptor() -> Value {
    json!({
        "name": "euraxess",
        "description": "EURAXESS RSS feed connector. list_jobs(limit), get_job(url).",
        "endpoints": {
            "list_jobs": {
                "method": "GET",
                "path": "/list_jobs",
                "params": [{"name": "limit", "type": "int", "required": false}]
            },
            "get_job": {
                "method": "GET",
                "path": "/get_job",
                "params": [{"name": "url", "type": "string", "required": true}]
            },
            "health": {"method": "GET", "path": "/health", "params": []}
        },
        "auth": {"type": "none"}
    })
}

pub async fn meta_handler() -> Json<Value> {
    Json(service_descriptor())
}
