//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Network(_) => format!(
            "{}\nIs the studio server running? Set it with --server or server.base_url.",
            e
        ),
        ApiError::Service {
            status: Some(status),
            message,
        } if !message.starts_with("Server error") => {
            format!("Server error (HTTP {}): {}", status, message)
        }
        ApiError::Service { message, .. } => message.clone(),
        _ => format!("Error: {}", e),
    }
}
