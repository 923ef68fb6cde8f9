//! Typed views over validated reply payloads.
//!
//! Replies are single-space separated fields. A decoder either yields a
//! complete record or a [`DecodeError`]; a field that fails to parse rejects
//! the whole reply.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::command::SOURCE_LIMIT;

/// A validated frame whose content does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected mode reply {0:?}")]
    UnexpectedMode(String),

    #[error("expected at least {expected} fields, got {actual}")]
    MissingFields { expected: usize, actual: usize },

    #[error("field {index} ({name}) is not a number: {value:?}")]
    InvalidNumber {
        index: usize,
        name: &'static str,
        value: String,
    },

    #[error("field {index} ({name}) out of range: {value}")]
    OutOfRange {
        index: usize,
        name: &'static str,
        value: i64,
    },

    #[error("expected ACK or NAK, got {0:?}")]
    UnexpectedAck(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

fn fields(payload: &str) -> Vec<&str> {
    payload.split(' ').collect()
}

fn require(fields: &[&str], expected: usize) -> Result<()> {
    if fields.len() < expected {
        return Err(DecodeError::MissingFields {
            expected,
            actual: fields.len(),
        });
    }
    Ok(())
}

/// Operating mode reported by `QMOD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    PowerOn,
    Standby,
    Line,
    Battery,
    Fault,
    PowerSaving,
}

impl Mode {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(Mode::PowerOn),
            'S' => Some(Mode::Standby),
            'L' => Some(Mode::Line),
            'B' => Some(Mode::Battery),
            'F' => Some(Mode::Fault),
            'D' => Some(Mode::PowerSaving),
            _ => None,
        }
    }

    /// The letter the inverter uses on the wire.
    pub fn as_char(self) -> char {
        match self {
            Mode::PowerOn => 'P',
            Mode::Standby => 'S',
            Mode::Line => 'L',
            Mode::Battery => 'B',
            Mode::Fault => 'F',
            Mode::PowerSaving => 'D',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::PowerOn => "power on",
            Mode::Standby => "standby",
            Mode::Line => "line",
            Mode::Battery => "battery",
            Mode::Fault => "fault",
            Mode::PowerSaving => "power saving",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for Mode {
    type Err = DecodeError;

    fn from_str(payload: &str) -> Result<Self> {
        let mut chars = payload.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Mode::from_char(c).ok_or_else(|| DecodeError::UnexpectedMode(payload.to_string()))
            }
            _ => Err(DecodeError::UnexpectedMode(payload.to_string())),
        }
    }
}

const OUTPUT_SOURCE_FIELD: usize = 16;
const CHARGE_SOURCE_FIELD: usize = 17;

/// Source priorities extracted from the `QPIRI` rating reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub output_source: u8,
    pub charge_source: u8,
}

fn source_field(fields: &[&str], index: usize, name: &'static str) -> Result<u8> {
    let raw = fields[index];
    let value: i64 = raw.parse().map_err(|_| DecodeError::InvalidNumber {
        index,
        name,
        value: raw.to_string(),
    })?;
    match u8::try_from(value) {
        Ok(v) if v < SOURCE_LIMIT => Ok(v),
        _ => Err(DecodeError::OutOfRange { index, name, value }),
    }
}

impl FromStr for Settings {
    type Err = DecodeError;

    fn from_str(payload: &str) -> Result<Self> {
        let fields = fields(payload);
        require(&fields, CHARGE_SOURCE_FIELD + 1)?;
        Ok(Settings {
            output_source: source_field(&fields, OUTPUT_SOURCE_FIELD, "output_source")?,
            charge_source: source_field(&fields, CHARGE_SOURCE_FIELD, "charge_source")?,
        })
    }
}

const TELEMETRY_FIELDS: [&str; 16] = [
    "grid_voltage",
    "grid_frequency",
    "ac_output_voltage",
    "ac_output_frequency",
    "ac_output_apparent_power",
    "ac_output_active_power",
    "output_load_percent",
    "bus_voltage",
    "battery_voltage",
    "battery_charging_current",
    "battery_capacity",
    "pv_input_power",
    "pv_input_current",
    "pv_input_voltage_1",
    "pv_input_voltage_2",
    "battery_discharge_current",
];

const STATUS_FIELD: usize = TELEMETRY_FIELDS.len();

/// General status record from `QPIGS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub grid_voltage: f64,
    pub grid_frequency: f64,
    pub ac_output_voltage: f64,
    pub ac_output_frequency: f64,
    pub ac_output_apparent_power: f64,
    pub ac_output_active_power: f64,
    pub output_load_percent: f64,
    pub bus_voltage: f64,
    pub battery_voltage: f64,
    pub battery_charging_current: f64,
    pub battery_capacity: f64,
    pub pv_input_power: f64,
    pub pv_input_current: f64,
    pub pv_input_voltage_1: f64,
    pub pv_input_voltage_2: f64,
    pub battery_discharge_current: f64,
    /// Opaque status bit string.
    pub device_status: String,
}

impl Telemetry {
    /// PV power derived from current and the first string voltage.
    ///
    /// Some firmware reports `pv_input_power` as zero or stale; this is the
    /// figure to cross-check it against.
    pub fn pv_power_calculated(&self) -> f64 {
        self.pv_input_current * self.pv_input_voltage_1
    }

    /// Field names and values in wire order, numeric fields only.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 16] {
        let values = [
            self.grid_voltage,
            self.grid_frequency,
            self.ac_output_voltage,
            self.ac_output_frequency,
            self.ac_output_apparent_power,
            self.ac_output_active_power,
            self.output_load_percent,
            self.bus_voltage,
            self.battery_voltage,
            self.battery_charging_current,
            self.battery_capacity,
            self.pv_input_power,
            self.pv_input_current,
            self.pv_input_voltage_1,
            self.pv_input_voltage_2,
            self.battery_discharge_current,
        ];
        std::array::from_fn(|i| (TELEMETRY_FIELDS[i], values[i]))
    }
}

fn number(fields: &[&str], index: usize) -> Result<f64> {
    let raw = fields[index];
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DecodeError::InvalidNumber {
            index,
            name: TELEMETRY_FIELDS[index],
            value: raw.to_string(),
        }),
    }
}

impl FromStr for Telemetry {
    type Err = DecodeError;

    fn from_str(payload: &str) -> Result<Self> {
        let f = fields(payload);
        require(&f, STATUS_FIELD + 1)?;
        Ok(Telemetry {
            grid_voltage: number(&f, 0)?,
            grid_frequency: number(&f, 1)?,
            ac_output_voltage: number(&f, 2)?,
            ac_output_frequency: number(&f, 3)?,
            ac_output_apparent_power: number(&f, 4)?,
            ac_output_active_power: number(&f, 5)?,
            output_load_percent: number(&f, 6)?,
            bus_voltage: number(&f, 7)?,
            battery_voltage: number(&f, 8)?,
            battery_charging_current: number(&f, 9)?,
            battery_capacity: number(&f, 10)?,
            pv_input_power: number(&f, 11)?,
            pv_input_current: number(&f, 12)?,
            pv_input_voltage_1: number(&f, 13)?,
            pv_input_voltage_2: number(&f, 14)?,
            battery_discharge_current: number(&f, 15)?,
            device_status: f[STATUS_FIELD].to_string(),
        })
    }
}

/// Reply to a setter command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ack {
    Accepted,
    Rejected,
}

impl FromStr for Ack {
    type Err = DecodeError;

    fn from_str(payload: &str) -> Result<Self> {
        if payload.starts_with("ACK") {
            Ok(Ack::Accepted)
        } else if payload.starts_with("NAK") {
            Ok(Ack::Rejected)
        } else {
            Err(DecodeError::UnexpectedAck(payload.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QPIGS_REPLY: &str = "230.0 49.9 230.0 49.9 0276 0200 005 380 52.40 010 085 0540 0010.5 050.2 000.0 00000 00010110";

    fn rating_reply(output: &str, charge: &str) -> String {
        format!(
            "230.0 21.7 230.0 50.0 21.7 5000 4000 48.0 46.0 42.0 56.4 54.0 2 30 060 0 {output} {charge} 1 01 0 0 54.0 0 1"
        )
    }

    #[test]
    fn mode_letters() {
        assert_eq!("P".parse::<Mode>().unwrap(), Mode::PowerOn);
        assert_eq!("L".parse::<Mode>().unwrap(), Mode::Line);
        assert_eq!("D".parse::<Mode>().unwrap(), Mode::PowerSaving);
        for m in [Mode::PowerOn, Mode::Standby, Mode::Line, Mode::Battery, Mode::Fault, Mode::PowerSaving] {
            assert_eq!(Mode::from_char(m.as_char()), Some(m));
        }
    }

    #[test]
    fn mode_rejects_unknown_empty_and_long() {
        assert!(matches!("X".parse::<Mode>(), Err(DecodeError::UnexpectedMode(_))));
        assert!("".parse::<Mode>().is_err());
        assert!("PL".parse::<Mode>().is_err());
        assert!("p".parse::<Mode>().is_err());
    }

    #[test]
    fn mode_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Mode::PowerSaving).unwrap(), "\"power_saving\"");
    }

    #[test]
    fn settings_from_rating_reply() {
        let s: Settings = rating_reply("2", "3").parse().unwrap();
        assert_eq!(s, Settings { output_source: 2, charge_source: 3 });
    }

    #[test]
    fn settings_out_of_range() {
        let err = rating_reply("7", "3").parse::<Settings>().unwrap_err();
        assert_eq!(
            err,
            DecodeError::OutOfRange { index: 16, name: "output_source", value: 7 }
        );
        assert!(rating_reply("1", "-1").parse::<Settings>().is_err());
    }

    #[test]
    fn settings_non_numeric_and_short() {
        assert!(matches!(
            rating_reply("2", "x").parse::<Settings>(),
            Err(DecodeError::InvalidNumber { index: 17, .. })
        ));
        let short = "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 2";
        assert_eq!(
            short.parse::<Settings>().unwrap_err(),
            DecodeError::MissingFields { expected: 18, actual: 17 }
        );
    }

    #[test]
    fn telemetry_full_record() {
        let t: Telemetry = QPIGS_REPLY.parse().unwrap();
        assert_eq!(t.grid_voltage, 230.0);
        assert_eq!(t.ac_output_active_power, 200.0);
        assert_eq!(t.battery_voltage, 52.4);
        assert_eq!(t.battery_capacity, 85.0);
        assert_eq!(t.pv_input_current, 10.5);
        assert_eq!(t.pv_input_voltage_1, 50.2);
        assert_eq!(t.battery_discharge_current, 0.0);
        assert_eq!(t.device_status, "00010110");
        assert!((t.pv_power_calculated() - 527.1).abs() < 1e-9);
        assert_eq!(t.numeric_fields()[8], ("battery_voltage", 52.4));
    }

    #[test]
    fn telemetry_rejects_whole_record_on_bad_number() {
        let bad = QPIGS_REPLY.replacen("52.40", "52.x0", 1);
        assert_eq!(
            bad.parse::<Telemetry>().unwrap_err(),
            DecodeError::InvalidNumber { index: 8, name: "battery_voltage", value: "52.x0".into() }
        );
    }

    #[test]
    fn telemetry_rejects_non_finite_and_missing_status() {
        let nan = QPIGS_REPLY.replacen("230.0", "NaN", 1);
        assert!(matches!(nan.parse::<Telemetry>(), Err(DecodeError::InvalidNumber { index: 0, .. })));
        let inf = QPIGS_REPLY.replacen("49.9", "inf", 1);
        assert!(inf.parse::<Telemetry>().is_err());

        let no_status = QPIGS_REPLY.rsplit_once(' ').unwrap().0;
        assert!(matches!(
            no_status.parse::<Telemetry>(),
            Err(DecodeError::MissingFields { expected: 17, actual: 16 })
        ));
    }

    #[test]
    fn double_space_is_an_empty_field() {
        let doubled = QPIGS_REPLY.replacen(' ', "  ", 1);
        assert!(doubled.parse::<Telemetry>().is_err());
    }

    #[test]
    fn ack_and_nak() {
        assert_eq!("ACK".parse::<Ack>().unwrap(), Ack::Accepted);
        assert_eq!("NAK".parse::<Ack>().unwrap(), Ack::Rejected);
        assert!(matches!("B".parse::<Ack>(), Err(DecodeError::UnexpectedAck(_))));
        assert!("".parse::<Ack>().is_err());
    }
}
