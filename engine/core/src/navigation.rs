//! Navigation requests
//!
//! Screens never switch screens themselves. A confirmed gesture produces a
//! [`NavigationRequest`] which the runtime hands to the host's
//! [`NavigationSink`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request to show another screen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigationRequest {
    /// Destination screen name
    pub destination: String,
    /// Parameters for the destination screen
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl NavigationRequest {
    /// Navigate to `destination` without parameters
    pub fn to(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            params: Map::new(),
        }
    }

    /// Attach a parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// String parameter lookup
    #[must_use]
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Host-side screen switcher
pub trait NavigationSink: Send {
    /// Show the requested screen
    fn navigate(&mut self, request: NavigationRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_serialize_flat() {
        let request = NavigationRequest::to("LessonPlayer")
            .with_param("subTopicId", "m_1")
            .with_param("title", "Fractions");

        assert_eq!(request.param_str("title"), Some("Fractions"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["params"]["subTopicId"], "m_1");
    }

    #[test]
    fn test_empty_params_are_omitted() {
        let json = serde_json::to_string(&NavigationRequest::to("Home")).unwrap();
        assert_eq!(json, r#"{"destination":"Home"}"#);
    }
}
