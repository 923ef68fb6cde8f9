use pi30_frame::Command;

use crate::cmd::{block_on, ConnectionArgs, RawArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, OutputFormat, RawReport};

pub fn run(args: RawArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let command = Command::new(&args.command)
        .map_err(|err| CliError::new(USAGE, format!("invalid command: {err}")))?;

    block_on(async {
        let mut client = conn.connect()?;
        let reply = client
            .query(&command)
            .await
            .map_err(|err| client_error("raw query failed", err))?;
        print_report(
            &RawReport {
                command: command.to_string(),
                reply: reply.to_text(),
            },
            format,
        );
        Ok(SUCCESS)
    })
}
