//! Texnouz OCPP 2.1 — message inspection CLI
//!
//! Validates OCPP 2.1 payloads and frames against the typed message layer
//! and prints the device model reports of the built-in logical components.
//!
//! ```sh
//! # Validate a request payload read from stdin
//! echo '{"id": 3}' | ocpp21 parse --action ClearDisplayMessage
//!
//! # Validate a response payload
//! ocpp21 parse --action SetDisplayMessage --response '{"status":"Accepted"}'
//!
//! # Decode a whole OCPP-J frame
//! ocpp21 frame '[2,"m-1","CostUpdated",{"totalCost":4.5,"transactionId":"tx"}]'
//!
//! # Print the TariffCostCtrlr report
//! ocpp21 components tariff --currency EUR
//!
//! # Validate the configuration file and exit
//! ocpp21 --check
//! ```

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{debug, error, info};

use texnouz_ocpp21::components::{LogicalComponent, SampledDataCtrlr, TariffCostCtrlr};
use texnouz_ocpp21::config::AppConfig;
use texnouz_ocpp21::init_tracing;
use texnouz_ocpp21::messages::{self, Inspection, MessageKind};
use texnouz_ocpp21::shared::OcppFrame;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Texnouz OCPP 2.1 — inspect and validate OCPP 2.1 messages.
#[derive(Parser, Debug)]
#[command(
    name = "ocpp21",
    version,
    about = "Inspect and validate OCPP 2.1 messages",
    long_about = "Texnouz OCPP 2.1 message layer tooling: validates payloads and \
                  OCPP-J frames and prints logical component reports.\n\n\
                  Default config: ~/.config/texnouz-ocpp21/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "OCPP21_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported actions and who initiates them.
    Actions,
    /// Validate a single payload. Reads stdin when JSON is omitted.
    Parse {
        /// Action name, e.g. `SetDisplayMessage`.
        #[arg(short, long)]
        action: String,
        /// Treat the payload as a CallResult payload.
        #[arg(long)]
        response: bool,
        json: Option<String>,
    },
    /// Decode an OCPP-J frame and validate its payload when the action is known.
    Frame { text: Option<String> },
    /// Print the device model report of a logical component.
    Components {
        #[arg(value_enum)]
        component: ComponentArg,
        /// Currency for the TariffCostCtrlr.
        #[arg(long, default_value = "EUR")]
        currency: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ComponentArg {
    Sampled,
    Tariff,
}

fn main() -> CliResult {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(texnouz_ocpp21::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);

    if let Some(e) = load_error {
        error!("Failed to load config from {}: {}", config_path.display(), e);
        if cli.check {
            return Err(e.into());
        }
        error!("Using default configuration.");
    } else {
        debug!("Configuration loaded from {}", config_path.display());
    }

    // ── Config validation mode ─────────────────────────────
    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file      : {}", config_path.display());
        println!("   OCPP version     : {}", config.protocol.version);
        println!("   Request timeout  : {}s", config.protocol.request_timeout_secs);
        println!("   Signature policy : {:?}", config.protocol.signature_policy);
        println!("   Log level        : {}", config.logging.level);
        return Ok(());
    }

    match cli.command {
        None | Some(Command::Actions) => list_actions(),
        Some(Command::Parse {
            action,
            response,
            json,
        }) => {
            let kind = if response {
                MessageKind::Response
            } else {
                MessageKind::Request
            };
            let value: Value = serde_json::from_str(&input(json)?)?;
            let inspection = messages::inspect(&action, kind, &value)?;
            print_inspection(&inspection)
        }
        Some(Command::Frame { text }) => inspect_frame(&input(text)?),
        Some(Command::Components {
            component,
            currency,
        }) => {
            let report = match component {
                ComponentArg::Sampled => SampledDataCtrlr::with_defaults().report(),
                ComponentArg::Tariff => TariffCostCtrlr::new(currency).report(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// The positional argument, or all of stdin.
fn input(arg: Option<String>) -> Result<String, std::io::Error> {
    match arg {
        Some(text) => Ok(text),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn list_actions() -> CliResult {
    for (action, direction) in messages::ACTIONS {
        println!("{:<24} {}", action, direction);
    }
    Ok(())
}

fn inspect_frame(text: &str) -> CliResult {
    let frame = OcppFrame::parse(text.trim())?;
    info!(message_id = frame.message_id(), "Frame decoded");

    match frame {
        OcppFrame::Call {
            action, payload, ..
        }
        | OcppFrame::Send {
            action, payload, ..
        } => {
            let inspection = messages::inspect(&action, MessageKind::Request, &payload)?;
            print_inspection(&inspection)
        }
        OcppFrame::CallResult { payload, .. } => {
            // The action of a CallResult is only known to whoever sent the Call.
            println!("CallResult");
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        OcppFrame::CallError {
            error_code,
            error_description,
            ..
        }
        | OcppFrame::CallResultError {
            error_code,
            error_description,
            ..
        } => {
            println!("{}: {}", error_code, error_description);
            Ok(())
        }
    }
}

fn print_inspection(inspection: &Inspection) -> CliResult {
    println!(
        "{} {} ({})",
        inspection.action, inspection.kind, inspection.direction
    );
    println!("  {}", inspection.summary);
    if inspection.signatures > 0 {
        println!("  signed ({} signature(s))", inspection.signatures);
    }
    println!("{}", serde_json::to_string_pretty(&inspection.canonical)?);
    Ok(())
}
