//! HTTP API modules
//!
//! Each module contributes a `routes()` builder that the server merges
//! into the full router. Every response uses the `success` envelope:
//! lists carry `data` + `count`, single items carry `data`, mutations
//! carry `message`, failures carry `error`.

pub mod analyze;
pub mod categories;
pub mod chemicals;
pub mod comments;
pub mod diseases;
pub mod health;
pub mod markets;
pub mod submissions;

use serde::Serialize;

/// Envelope for list responses
#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            success: true,
            data,
            count,
        }
    }
}

/// Envelope for single-item responses
#[derive(Debug, Serialize)]
pub struct ItemEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ItemEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Envelope for create responses: the stored entity plus a message
#[derive(Debug, Serialize)]
pub struct CreatedEnvelope<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> CreatedEnvelope<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// Envelope for update/delete responses
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_counts_its_data() {
        let envelope = ListEnvelope::new(vec![1, 2, 3]);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn message_envelope_shape() {
        let json = serde_json::to_value(MessageEnvelope::new("deleted")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "deleted");
    }
}
