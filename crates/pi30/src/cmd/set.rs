use pi30_client::Result as ClientResult;
use pi30_frame::Command;

use crate::cmd::{block_on, ConnectionArgs, SetArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, AckReport, OutputFormat};

pub fn output(args: SetArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let command = checked(pi30_client::set_output_source(args.value))?;
    apply(&command, "set output source failed", conn, format)
}

pub fn charge(args: SetArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let command = checked(pi30_client::set_charge_source(args.value))?;
    apply(&command, "set charge source failed", conn, format)
}

/// Reject out-of-range values before touching the port.
fn checked(command: ClientResult<Command>) -> CliResult<Command> {
    command.map_err(|err| client_error("invalid value", err))
}

fn apply(
    command: &Command,
    context: &str,
    conn: &ConnectionArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    block_on(async {
        let mut client = conn.connect()?;
        client
            .apply(command)
            .await
            .map_err(|err| client_error(context, err))?;
        print_report(
            &AckReport {
                command: command.to_string(),
                accepted: true,
            },
            format,
        );
        Ok(SUCCESS)
    })
}
