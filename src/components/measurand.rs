//! `MeasurandEnumType`: what a sampled meter value measures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown measurand '{0}'")]
pub struct UnknownMeasurand(pub String);

macro_rules! measurands {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Measurand {
            $(
                $(#[$doc])*
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl Measurand {
            pub const ALL: &'static [Measurand] = &[$(Measurand::$variant,)+];

            /// The dotted OCPP name, e.g. `Energy.Active.Import.Register`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Measurand::$variant => $name,)+
                }
            }
        }

        impl FromStr for Measurand {
            type Err = UnknownMeasurand;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Measurand::$variant),)+
                    other => Err(UnknownMeasurand(other.to_string())),
                }
            }
        }
    };
}

measurands! {
    CurrentExport => "Current.Export",
    CurrentExportOffered => "Current.Export.Offered",
    CurrentExportMinimum => "Current.Export.Minimum",
    CurrentImport => "Current.Import",
    CurrentImportOffered => "Current.Import.Offered",
    CurrentImportMinimum => "Current.Import.Minimum",
    CurrentOffered => "Current.Offered",
    DisplayPresentSoc => "Display.PresentSOC",
    DisplayMinimumSoc => "Display.MinimumSOC",
    DisplayTargetSoc => "Display.TargetSOC",
    DisplayMaximumSoc => "Display.MaximumSOC",
    DisplayRemainingTimeToMinimumSoc => "Display.RemainingTimeToMinimumSOC",
    DisplayRemainingTimeToTargetSoc => "Display.RemainingTimeToTargetSOC",
    DisplayRemainingTimeToMaximumSoc => "Display.RemainingTimeToMaximumSOC",
    DisplayChargingComplete => "Display.ChargingComplete",
    DisplayBatteryEnergyCapacity => "Display.BatteryEnergyCapacity",
    DisplayInletHot => "Display.InletHot",
    EnergyActiveExportInterval => "Energy.Active.Export.Interval",
    EnergyActiveExportRegister => "Energy.Active.Export.Register",
    EnergyActiveImportInterval => "Energy.Active.Import.Interval",
    EnergyActiveImportRegister => "Energy.Active.Import.Register",
    EnergyActiveImportCableLoss => "Energy.Active.Import.CableLoss",
    EnergyActiveImportLocalGenerationRegister => "Energy.Active.Import.LocalGeneration.Register",
    EnergyActiveNet => "Energy.Active.Net",
    EnergyActiveSetpointInterval => "Energy.Active.Setpoint.Interval",
    EnergyApparentExport => "Energy.Apparent.Export",
    EnergyApparentImport => "Energy.Apparent.Import",
    EnergyApparentNet => "Energy.Apparent.Net",
    EnergyReactiveExportInterval => "Energy.Reactive.Export.Interval",
    EnergyReactiveExportRegister => "Energy.Reactive.Export.Register",
    EnergyReactiveImportInterval => "Energy.Reactive.Import.Interval",
    EnergyReactiveImportRegister => "Energy.Reactive.Import.Register",
    EnergyReactiveNet => "Energy.Reactive.Net",
    EnergyRequestTarget => "EnergyRequest.Target",
    EnergyRequestMinimum => "EnergyRequest.Minimum",
    EnergyRequestMaximum => "EnergyRequest.Maximum",
    EnergyRequestMinimumV2x => "EnergyRequest.Minimum.V2X",
    EnergyRequestMaximumV2x => "EnergyRequest.Maximum.V2X",
    EnergyRequestBulk => "EnergyRequest.Bulk",
    Frequency => "Frequency",
    PowerActiveExport => "Power.Active.Export",
    PowerActiveImport => "Power.Active.Import",
    PowerActiveSetpoint => "Power.Active.Setpoint",
    PowerActiveResidual => "Power.Active.Residual",
    PowerExportMinimum => "Power.Export.Minimum",
    PowerExportOffered => "Power.Export.Offered",
    PowerFactor => "Power.Factor",
    PowerImportOffered => "Power.Import.Offered",
    PowerImportMinimum => "Power.Import.Minimum",
    PowerOffered => "Power.Offered",
    PowerReactiveExport => "Power.Reactive.Export",
    PowerReactiveImport => "Power.Reactive.Import",
    /// State of charge in percent.
    SoC => "SoC",
    Voltage => "Voltage",
    VoltageMinimum => "Voltage.Minimum",
    VoltageMaximum => "Voltage.Maximum",
}

impl fmt::Display for Measurand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a measurand list as a device-model `MemberList` value.
pub fn join(measurands: &[Measurand]) -> String {
    measurands
        .iter()
        .map(Measurand::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a comma separated `MemberList` value. Blank entries are skipped.
pub fn parse_list(value: &str) -> Result<Vec<Measurand>, UnknownMeasurand> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Measurand::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_dotted_names() {
        let json = serde_json::to_value(Measurand::EnergyActiveImportRegister).unwrap();
        assert_eq!(json, serde_json::json!("Energy.Active.Import.Register"));

        let parsed: Measurand = serde_json::from_value(serde_json::json!("SoC")).unwrap();
        assert_eq!(parsed, Measurand::SoC);
    }

    #[test]
    fn from_str_matches_as_str_for_every_variant() {
        for measurand in Measurand::ALL {
            assert_eq!(measurand.as_str().parse::<Measurand>().unwrap(), *measurand);
        }
    }

    #[test]
    fn member_list_round_trip() {
        let list = vec![Measurand::EnergyActiveImportRegister, Measurand::SoC];
        let joined = join(&list);
        assert_eq!(joined, "Energy.Active.Import.Register,SoC");
        assert_eq!(parse_list(&joined).unwrap(), list);
        assert_eq!(parse_list(" SoC , ").unwrap(), vec![Measurand::SoC]);
    }

    #[test]
    fn unknown_measurand_is_an_error() {
        assert_eq!(
            "Temperature".parse::<Measurand>(),
            Err(UnknownMeasurand("Temperature".into()))
        );
    }
}
