//! Composite health report.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::health::status::{HealthStatus, Status};

/// One named entry of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    #[serde(flatten)]
    pub health: HealthStatus,
}

/// Overall status plus every component in registration order.
///
/// Serializes as `{"status": "UP", "components": {"product": {"status": "UP"}, ...}}`
/// with components keyed by name in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeHealthReport {
    pub status: Status,
    pub components: Vec<ComponentHealth>,
}

impl CompositeHealthReport {
    pub fn new(components: Vec<ComponentHealth>) -> Self {
        let status = Status::aggregate(components.iter().map(|c| c.health.status));
        Self { status, components }
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&HealthStatus> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.health)
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Serialize for CompositeHealthReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Components<'a>(&'a [ComponentHealth]);

        impl Serialize for Components<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for component in self.0 {
                    map.serialize_entry(&component.name, &component.health)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry("components", &Components(&self.components))?;
        map.end()
    }
}
