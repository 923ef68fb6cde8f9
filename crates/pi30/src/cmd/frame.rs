use pi30_frame::{checksum, frame_bytes, Command, Hex};

use crate::cmd::FrameArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, FrameReport, OutputFormat};

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let command = Command::new(&args.command)
        .map_err(|err| CliError::new(USAGE, format!("invalid command: {err}")))?;
    let frame = frame_bytes(&command);

    print_report(
        &FrameReport {
            frame: Hex(&frame).to_string(),
            length: frame.len(),
            checksum: Hex(&checksum(command.as_bytes())).to_string(),
            command: Some(command.to_string()),
            payload: None,
        },
        format,
    );
    Ok(SUCCESS)
}
