//! `SampledDataCtrlr`: which meter values a station samples during a
//! transaction and how often

use super::measurand::{self, Measurand};
use super::{bool_value, DataType, LogicalComponent, VariableConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampledDataCtrlr {
    pub enabled: Option<bool>,
    pub available: Option<bool>,
    pub sign_readings: Option<bool>,
    pub tx_ended_measurands: Vec<Measurand>,
    /// Seconds between samples taken for TransactionEvent(Ended).
    pub tx_ended_interval: Option<u32>,
    pub tx_started_measurands: Vec<Measurand>,
    pub tx_updated_measurands: Vec<Measurand>,
    /// Seconds between TransactionEvent(Updated) meter values.
    pub tx_updated_interval: Option<u32>,
    pub register_values_without_phases: Option<bool>,
}

impl SampledDataCtrlr {
    /// Energy register at start and end, energy and power while charging,
    /// sampled every minute.
    pub fn with_defaults() -> Self {
        Self {
            enabled: Some(true),
            available: Some(true),
            sign_readings: Some(false),
            tx_ended_measurands: vec![Measurand::EnergyActiveImportRegister],
            tx_ended_interval: Some(60),
            tx_started_measurands: vec![Measurand::EnergyActiveImportRegister],
            tx_updated_measurands: vec![
                Measurand::EnergyActiveImportRegister,
                Measurand::PowerActiveImport,
            ],
            tx_updated_interval: Some(60),
            register_values_without_phases: Some(false),
        }
    }
}

fn measurand_list(measurands: &[Measurand]) -> Option<String> {
    (!measurands.is_empty()).then(|| measurand::join(measurands))
}

fn all_measurands() -> impl Iterator<Item = &'static str> {
    Measurand::ALL.iter().map(Measurand::as_str)
}

impl LogicalComponent for SampledDataCtrlr {
    const NAME: &'static str = "SampledDataCtrlr";

    fn variables() -> Vec<VariableConfig<Self>> {
        vec![
            VariableConfig::new("Enabled", DataType::Boolean, |c: &Self| bool_value(c.enabled))
                .description("Whether sampled data is enabled."),
            VariableConfig::new("Available", DataType::Boolean, |c: &Self| {
                bool_value(c.available)
            })
            .read_only()
            .description("Whether sampled data is supported."),
            VariableConfig::new("SignReadings", DataType::Boolean, |c: &Self| {
                bool_value(c.sign_readings)
            })
            .description("Sign the sampled meter values."),
            VariableConfig::new("TxEndedMeasurands", DataType::MemberList, |c: &Self| {
                measurand_list(&c.tx_ended_measurands)
            })
            .values(all_measurands())
            .description("Measurands sampled for the TransactionEvent(Ended) message."),
            VariableConfig::new("TxEndedInterval", DataType::Integer, |c: &Self| {
                c.tx_ended_interval.map(|v| v.to_string())
            })
            .unit("s")
            .description("Interval between samples for TransactionEvent(Ended); 0 samples only at start and end."),
            VariableConfig::new("TxStartedMeasurands", DataType::MemberList, |c: &Self| {
                measurand_list(&c.tx_started_measurands)
            })
            .values(all_measurands())
            .description("Measurands sampled for the TransactionEvent(Started) message."),
            VariableConfig::new("TxUpdatedMeasurands", DataType::MemberList, |c: &Self| {
                measurand_list(&c.tx_updated_measurands)
            })
            .values(all_measurands())
            .description("Measurands sampled for TransactionEvent(Updated) messages."),
            VariableConfig::new("TxUpdatedInterval", DataType::Integer, |c: &Self| {
                c.tx_updated_interval.map(|v| v.to_string())
            })
            .unit("s")
            .description("Interval between TransactionEvent(Updated) meter values; 0 disables them."),
            VariableConfig::new("RegisterValuesWithoutPhases", DataType::Boolean, |c: &Self| {
                bool_value(c.register_values_without_phases)
            })
            .description("Report register values only as totals, without per-phase values."),
        ]
    }
}
