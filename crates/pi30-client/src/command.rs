//! PI30 command vocabulary.

use pi30_frame::Command;

use crate::error::{ClientError, Result};

/// Device mode inquiry.
pub const QMOD: Command = Command::from_static("QMOD");

/// Device rating information inquiry; carries the source priority settings.
pub const QPIRI: Command = Command::from_static("QPIRI");

/// Device general status inquiry.
pub const QPIGS: Command = Command::from_static("QPIGS");

/// Output and charger source priorities are reported and set as `0..SOURCE_LIMIT`.
pub const SOURCE_LIMIT: u8 = 5;

/// `POPnn`: set output source priority.
pub fn set_output_source(value: u8) -> Result<Command> {
    source_command("POP", "output source", value)
}

/// `PCPnn`: set charger source priority.
pub fn set_charge_source(value: u8) -> Result<Command> {
    source_command("PCP", "charge source", value)
}

fn source_command(prefix: &str, name: &'static str, value: u8) -> Result<Command> {
    if value >= SOURCE_LIMIT {
        return Err(ClientError::InvalidArgument {
            name,
            value,
            limit: SOURCE_LIMIT,
        });
    }
    Ok(Command::new(&format!("{prefix}{value:02}"))?)
}
