//! `TariffCostCtrlr`: tariff and running-cost display on the station

use super::{bool_value, DataType, LogicalComponent, VariableConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TariffCostCtrlr {
    pub tariff_enabled: Option<bool>,
    pub cost_enabled: Option<bool>,
    pub tariff_available: Option<bool>,
    pub cost_available: Option<bool>,
    /// Shown when no driver-specific tariff is known.
    pub tariff_fallback_message: Option<String>,
    /// Shown when the total cost cannot be calculated.
    pub total_cost_fallback_message: Option<String>,
    /// ISO 4217 code of the currency used in CostUpdated.
    pub currency: Option<String>,
    /// Seconds between CostUpdated messages while charging.
    pub cost_interval: Option<u32>,
}

impl TariffCostCtrlr {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            tariff_enabled: Some(true),
            cost_enabled: Some(true),
            tariff_available: Some(true),
            cost_available: Some(true),
            currency: Some(currency.into()),
            ..Self::default()
        }
    }
}

impl LogicalComponent for TariffCostCtrlr {
    const NAME: &'static str = "TariffCostCtrlr";

    fn variables() -> Vec<VariableConfig<Self>> {
        vec![
            VariableConfig::new("Enabled", DataType::Boolean, |c: &Self| {
                bool_value(c.tariff_enabled)
            })
            .instance("Tariff")
            .description("Show tariff information."),
            VariableConfig::new("Enabled", DataType::Boolean, |c: &Self| {
                bool_value(c.cost_enabled)
            })
            .instance("Cost")
            .description("Show running and total cost."),
            VariableConfig::new("Available", DataType::Boolean, |c: &Self| {
                bool_value(c.tariff_available)
            })
            .instance("Tariff")
            .read_only()
            .description("Station can show tariff information."),
            VariableConfig::new("Available", DataType::Boolean, |c: &Self| {
                bool_value(c.cost_available)
            })
            .instance("Cost")
            .read_only()
            .description("Station can show cost information."),
            VariableConfig::new("TariffFallbackMessage", DataType::String, |c: &Self| {
                c.tariff_fallback_message.clone()
            })
            .description("Tariff text shown when no driver-specific tariff is available."),
            VariableConfig::new("TotalCostFallbackMessage", DataType::String, |c: &Self| {
                c.total_cost_fallback_message.clone()
            })
            .description("Text shown when the total cost cannot be calculated."),
            VariableConfig::new("Currency", DataType::String, |c: &Self| c.currency.clone())
                .description("Currency of all cost values, ISO 4217."),
            VariableConfig::new("Interval", DataType::Integer, |c: &Self| {
                c.cost_interval.map(|v| v.to_string())
            })
            .instance("Cost")
            .unit("s")
            .description("Interval between CostUpdated messages during a transaction."),
        ]
    }
}
