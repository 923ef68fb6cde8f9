use pi30_frame::{decode_frame, Hex, CHECKSUM_LEN};

use crate::cmd::VerifyArgs;
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, FrameReport, OutputFormat};

pub fn run(args: VerifyArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = parse_hex(&args.hex)?;
    let reply = decode_frame(&raw).map_err(|err| frame_error("invalid frame", err))?;

    let tail = raw.len() - CHECKSUM_LEN - 1;
    print_report(
        &FrameReport {
            frame: Hex(&raw).to_string(),
            length: raw.len(),
            checksum: Hex(&raw[tail..tail + CHECKSUM_LEN]).to_string(),
            command: None,
            payload: Some(reply.to_text()),
        },
        format,
    );
    Ok(SUCCESS)
}

/// Accepts `28 42 E7 C9 0D`, `2842e7c90d` or either with `0x` prefixes.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .split_whitespace()
        .map(|chunk| chunk.trim_start_matches("0x").trim_start_matches("0X"))
        .collect();

    if digits.is_empty() || !digits.is_ascii() || digits.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            format!("expected pairs of hex digits: {input:?}"),
        ));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex byte: {:?}", &digits[i..i + 2])))
        })
        .collect()
}
