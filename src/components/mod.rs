//! Logical components of the device model
//!
//! A logical component (a `*Ctrlr`) groups the configuration variables of
//! one station function. Each component describes its variables with
//! [`VariableConfig`] entries: the variable name and instance, how to read
//! the current value from the component, and the characteristics reported
//! to the CSMS (mutability, data type, unit, allowed values).

pub mod measurand;
pub mod sampled_data_ctrlr;
pub mod tariff_cost_ctrlr;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Component, Evse};

pub use measurand::{Measurand, UnknownMeasurand};
pub use sampled_data_ctrlr::SampledDataCtrlr;
pub use tariff_cost_ctrlr::TariffCostCtrlr;

/// `MutabilityEnumType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutability {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "ReadOnly"),
            Self::WriteOnly => write!(f, "WriteOnly"),
            Self::ReadWrite => write!(f, "ReadWrite"),
        }
    }
}

/// `DataEnumType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "decimal")]
    Decimal,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "dateTime")]
    DateTime,
    #[serde(rename = "boolean")]
    Boolean,
    /// One value out of `values_list`.
    OptionList,
    /// Ordered subset of `values_list`.
    SequenceList,
    /// Unordered subset of `values_list`.
    MemberList,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::DateTime => "dateTime",
            Self::Boolean => "boolean",
            Self::OptionList => "OptionList",
            Self::SequenceList => "SequenceList",
            Self::MemberList => "MemberList",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::OptionList | Self::SequenceList | Self::MemberList)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads a variable's current value from its component.
pub type Getter<C> = fn(&C) -> Option<String>;

/// Metadata of one variable of a logical component `C`.
pub struct VariableConfig<C> {
    pub name: &'static str,
    pub instance: Option<&'static str>,
    pub getter: Getter<C>,
    pub mutability: Mutability,
    pub data_type: DataType,
    pub unit: Option<&'static str>,
    pub values_list: Option<Vec<&'static str>>,
    pub description: &'static str,
}

impl<C> VariableConfig<C> {
    /// A read-write variable without instance, unit or value list.
    pub fn new(name: &'static str, data_type: DataType, getter: Getter<C>) -> Self {
        Self {
            name,
            instance: None,
            getter,
            mutability: Mutability::ReadWrite,
            data_type,
            unit: None,
            values_list: None,
            description: "",
        }
    }

    pub fn instance(mut self, instance: &'static str) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.mutability = Mutability::ReadOnly;
        self
    }

    pub fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn values(mut self, values: impl IntoIterator<Item = &'static str>) -> Self {
        self.values_list = Some(values.into_iter().collect());
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn matches(&self, name: &str, instance: Option<&str>) -> bool {
        self.name == name && self.instance == instance
    }

    /// Current value, never revealed for write-only variables.
    pub fn read(&self, component: &C) -> Option<String> {
        match self.mutability {
            Mutability::WriteOnly => None,
            _ => (self.getter)(component),
        }
    }
}

// Manual impls: the derives would require `C: Clone` / `C: Debug`.
impl<C> Clone for VariableConfig<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            instance: self.instance,
            getter: self.getter,
            mutability: self.mutability,
            data_type: self.data_type,
            unit: self.unit,
            values_list: self.values_list.clone(),
            description: self.description,
        }
    }
}

impl<C> fmt::Debug for VariableConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableConfig")
            .field("name", &self.name)
            .field("instance", &self.instance)
            .field("mutability", &self.mutability)
            .field("data_type", &self.data_type)
            .field("unit", &self.unit)
            .field("values_list", &self.values_list)
            .finish_non_exhaustive()
    }
}

impl<C> fmt::Display for VariableConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        if let Some(instance) = self.instance {
            write!(f, "[{}]", instance)?;
        }
        write!(f, " ({}, {})", self.data_type, self.mutability)
    }
}

/// A single variable report entry, flattened from `ReportDataType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportVariable {
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<i32>,
    pub variable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_instance: Option<String>,
    pub attributes: Vec<VariableAttributeEntry>,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_list: Option<String>,
}

/// A single variable attribute entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableAttributeEntry {
    /// Attribute type: Actual, Target, MinSet, MaxSet.
    #[serde(rename = "type")]
    pub attr_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub mutability: Mutability,
}

/// A logical component exposing its configuration variables.
pub trait LogicalComponent: Sized {
    /// Device-model component name, e.g. `SampledDataCtrlr`.
    const NAME: &'static str;

    fn instance(&self) -> Option<&str> {
        None
    }

    fn evse(&self) -> Option<&Evse> {
        None
    }

    fn variables() -> Vec<VariableConfig<Self>>;

    fn component(&self) -> Component {
        let mut component = Component::new(Self::NAME);
        component.instance = self.instance().map(str::to_string);
        component.evse = self.evse().cloned();
        component
    }

    fn variable(name: &str, instance: Option<&str>) -> Option<VariableConfig<Self>> {
        Self::variables()
            .into_iter()
            .find(|v| v.matches(name, instance))
    }

    /// Current value of a variable, `None` when unknown, unset or
    /// write-only.
    fn get(&self, name: &str, instance: Option<&str>) -> Option<String> {
        Self::variable(name, instance)?.read(self)
    }

    /// `Actual` values of all variables, as reported by NotifyReport.
    fn report(&self) -> Vec<ReportVariable> {
        let evse = self.evse();
        Self::variables()
            .into_iter()
            .map(|variable| ReportVariable {
                component: Self::NAME.to_string(),
                component_instance: self.instance().map(str::to_string),
                evse_id: evse.map(|e| e.id),
                connector_id: evse.and_then(|e| e.connector_id),
                variable: variable.name.to_string(),
                variable_instance: variable.instance.map(str::to_string),
                attributes: vec![VariableAttributeEntry {
                    attr_type: "Actual".to_string(),
                    value: variable.read(self),
                    mutability: variable.mutability,
                }],
                data_type: variable.data_type,
                unit: variable.unit.map(str::to_string),
                values_list: variable.values_list.as_ref().map(|v| v.join(",")),
            })
            .collect()
    }
}

fn bool_value(value: Option<bool>) -> Option<String> {
    value.map(|v| v.to_string())
}
