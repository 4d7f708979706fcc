//! Device-model addressing: `ComponentType` and `EVSEType`

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CustomData;

/// An EVSE, optionally narrowed to one of its connectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Evse {
    #[validate(range(min = 0))]
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub connector_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl Evse {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            connector_id: None,
            custom_data: None,
        }
    }

    pub fn with_connector(id: i32, connector_id: i32) -> Self {
        Self {
            id,
            connector_id: Some(connector_id),
            custom_data: None,
        }
    }
}

/// A physical or logical component of a charging station.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub evse: Option<Evse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance: None,
            evse: None,
            custom_data: None,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_evse(mut self, evse: Evse) -> Self {
        self.evse = Some(evse);
        self
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(instance) = &self.instance {
            write!(f, "[{}]", instance)?;
        }
        if let Some(evse) = &self.evse {
            write!(f, " @ EVSE {}", evse.id)?;
            if let Some(connector) = evse.connector_id {
                write!(f, "/{}", connector)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_instance_and_evse() {
        let c = Component::new("DisplayMessageCtrlr")
            .with_instance("Front")
            .with_evse(Evse::with_connector(1, 2));
        assert_eq!(c.to_string(), "DisplayMessageCtrlr[Front] @ EVSE 1/2");
    }

    #[test]
    fn negative_evse_id_is_invalid() {
        let c = Component::new("EVSE").with_evse(Evse::new(-1));
        assert!(c.validate().is_err());
    }
}
