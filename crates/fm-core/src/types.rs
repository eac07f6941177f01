//! Core type definitions for feedback-moderator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a feedback item (comment or trackback)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub Uuid);

impl FeedbackId {
    /// Generate a new FeedbackId
    pub fn new() -> Self {
        FeedbackId(Uuid::new_v4())
    }

    /// Create from UUID string
    pub fn from_string(s: &str) -> crate::Result<Self> {
        Uuid::parse_str(s.trim()).map(FeedbackId).map_err(|e| {
            crate::ModerationError::Validation(format!("Invalid feedback ID '{}': {}", s, e))
        })
    }

    /// Short form used in terminal listings
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content fingerprint for a feedback item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Guid(pub String);

impl Guid {
    /// Derive a guid from the parts that identify a submission
    pub fn derive(parts: &[&str]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(&[0]);
        }
        Guid(hasher.finalize().to_hex()[..32].to_string())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Schema version for stored records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
}

impl ProtocolVersion {
    pub const V1_0: Self = Self { major: 1, minor: 0 };

    /// Check if this version is compatible with another version
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.major == other.major
    }

    /// Parse a "major.minor" string
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::V1_0
    }
}

/// Extensions field for future compatibility
/// Stores arbitrary JSON values for forward compatibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extensions {
    #[serde(flatten)]
    pub data: HashMap<String, serde_json::Value>,
}

impl Extensions {
    /// Create empty extensions
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if extensions is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a typed value by key
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value by key
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.into(), v);
        }
    }

    /// Remove a value by key
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Name of the classifier that last judged the feedback
    pub fn classified_by(&self) -> Option<String> {
        self.get_as("classified_by")
    }

    /// Record the classifier that last judged the feedback
    pub fn set_classified_by(&mut self, name: impl Into<String>) {
        self.set("classified_by", name.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_id_uniqueness() {
        let id1 = FeedbackId::new();
        let id2 = FeedbackId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_feedback_id_parse() {
        let id = FeedbackId::new();
        let parsed = FeedbackId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(FeedbackId::from_string("not-a-uuid").is_err());
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_guid_stability() {
        let a = Guid::derive(&["comment", "Piers", "Body"]);
        let b = Guid::derive(&["comment", "Piers", "Body"]);
        let c = Guid::derive(&["comment", "PiersBody", ""]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.0.len(), 32);
    }

    #[test]
    fn test_protocol_version_compatibility() {
        let v1_0 = ProtocolVersion::V1_0;
        let v1_1 = ProtocolVersion::parse("1.1").unwrap();
        let v2_0 = ProtocolVersion::parse("2.0").unwrap();

        assert!(v1_0.is_compatible(&v1_1));
        assert!(!v1_0.is_compatible(&v2_0));
        assert!(ProtocolVersion::parse("1").is_none());
        assert!(ProtocolVersion::parse("a.b").is_none());
    }

    #[test]
    fn test_extensions() {
        let mut ext = Extensions::new();
        assert!(ext.is_empty());

        ext.set_classified_by("rules");
        assert!(!ext.is_empty());
        assert_eq!(ext.classified_by(), Some("rules".to_string()));

        ext.remove("classified_by");
        assert!(ext.is_empty());
    }
}
