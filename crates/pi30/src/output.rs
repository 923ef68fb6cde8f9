use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pi30_client::{Mode, Settings, Telemetry};
use pi30_transport::PortInfo;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Something a subcommand prints: serialized as-is for JSON, as labelled
/// rows otherwise.
pub trait Report: Serialize {
    fn rows(&self) -> Vec<(&'static str, String)>;
}

pub fn print_report<R: Report>(report: &R, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(report)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (field, value) in report.rows() {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let rows = report.rows();
            let width = rows.iter().map(|(field, _)| field.len()).max().unwrap_or(0);
            for (field, value) in rows {
                println!("{field:<width$}  {value}");
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

#[derive(Serialize)]
pub struct ModeReport {
    pub mode: Mode,
    pub code: char,
}

impl From<Mode> for ModeReport {
    fn from(mode: Mode) -> Self {
        Self {
            mode,
            code: mode.as_char(),
        }
    }
}

impl Report for ModeReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mode", self.mode.description().to_string()),
            ("code", self.code.to_string()),
        ]
    }
}

#[derive(Serialize)]
pub struct SettingsReport(pub Settings);

impl Report for SettingsReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("output_source", self.0.output_source.to_string()),
            ("charge_source", self.0.charge_source.to_string()),
        ]
    }
}

#[derive(Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub telemetry: Telemetry,
    pub pv_power_calculated: f64,
}

impl From<Telemetry> for StatusReport {
    fn from(telemetry: Telemetry) -> Self {
        Self {
            pv_power_calculated: telemetry.pv_power_calculated(),
            telemetry,
        }
    }
}

impl Report for StatusReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows: Vec<(&'static str, String)> = self
            .telemetry
            .numeric_fields()
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();
        rows.push(("pv_power_calculated", format!("{:.1}", self.pv_power_calculated)));
        rows.push(("device_status", self.telemetry.device_status.clone()));
        rows
    }
}

#[derive(Serialize)]
pub struct AckReport {
    pub command: String,
    pub accepted: bool,
}

impl Report for AckReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("command", self.command.clone()),
            ("accepted", self.accepted.to_string()),
        ]
    }
}

#[derive(Serialize)]
pub struct RawReport {
    pub command: String,
    pub reply: String,
}

impl Report for RawReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("command", self.command.clone()),
            ("reply", self.reply.clone()),
        ]
    }
}

/// Offline encode or verify result.
#[derive(Serialize)]
pub struct FrameReport {
    pub frame: String,
    pub length: usize,
    pub checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl Report for FrameReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        if let Some(command) = &self.command {
            rows.push(("command", command.clone()));
        }
        if let Some(payload) = &self.payload {
            rows.push(("payload", payload.clone()));
        }
        rows.push(("checksum", self.checksum.clone()));
        rows.push(("frame", self.frame.clone()));
        rows.push(("length", self.length.to_string()));
        rows
    }
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    vid: Option<String>,
    pid: Option<String>,
    product: Option<&'a str>,
}

impl<'a> From<&'a PortInfo> for PortOutput<'a> {
    fn from(port: &'a PortInfo) -> Self {
        Self {
            name: &port.name,
            vid: port.vid.map(|v| format!("{v:04x}")),
            pid: port.pid.map(|p| format!("{p:04x}")),
            product: port.product.as_deref(),
        }
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    let rows: Vec<PortOutput<'_>> = ports.iter().map(PortOutput::from).collect();
    match format {
        OutputFormat::Json => println!("{}", to_json(&rows)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PORT", "VID", "PID", "PRODUCT"]);
            for row in rows {
                table.add_row(vec![
                    row.name.to_string(),
                    row.vid.unwrap_or_default(),
                    row.pid.unwrap_or_default(),
                    row.product.unwrap_or_default().to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if rows.is_empty() {
                println!("no serial ports found");
            }
            for row in rows {
                match (row.vid, row.pid) {
                    (Some(vid), Some(pid)) => println!(
                        "{} (usb {vid}:{pid}) {}",
                        row.name,
                        row.product.unwrap_or_default()
                    ),
                    _ => println!("{}", row.name),
                }
            }
        }
    }
}

#[derive(Serialize)]
struct SampleOutput<'a> {
    sample: u64,
    timestamp: String,
    #[serde(flatten)]
    status: &'a StatusReport,
}

/// One `monitor` line. JSON emits one object per line; the other formats a
/// single-line summary.
pub fn print_sample(sample: u64, status: &StatusReport, format: OutputFormat) {
    let timestamp = now_unix_seconds();
    match format {
        OutputFormat::Json => println!(
            "{}",
            to_json(&SampleOutput {
                sample,
                timestamp,
                status,
            })
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            let t = &status.telemetry;
            println!(
                "#{sample} t={timestamp} battery={:.2}V {:.0}% load={:.0}% pv={:.0}W (calc {:.0}W) status={}",
                t.battery_voltage,
                t.battery_capacity,
                t.output_load_percent,
                t.pv_input_power,
                status.pv_power_calculated,
                t.device_status
            );
        }
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_report_serializes_name_and_letter() {
        let json = serde_json::to_string(&ModeReport::from(Mode::Battery)).unwrap();
        assert_eq!(json, r#"{"mode":"battery","code":"B"}"#);
    }

    #[test]
    fn status_report_flattens_telemetry() {
        let telemetry: Telemetry =
            "230.0 49.9 230.0 49.9 0276 0200 005 380 52.40 010 085 0540 0010.5 050.2 000.0 00000 00010110"
                .parse()
                .unwrap();
        let report = StatusReport::from(telemetry);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["battery_voltage"], 52.4);
        assert_eq!(value["device_status"], "00010110");
        assert!(value.get("telemetry").is_none());

        let rows = report.rows();
        assert_eq!(rows.len(), 18);
        assert_eq!(rows[16], ("pv_power_calculated", "527.1".to_string()));
    }

    #[test]
    fn frame_report_omits_absent_fields() {
        let report = FrameReport {
            frame: "51 4D 4F 44 49 C1 0D".into(),
            length: 7,
            checksum: "49 C1".into(),
            command: Some("QMOD".into()),
            payload: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""command":"QMOD""#));
        assert!(!json.contains("payload"));
    }
}
