use pi30_client::ClientError;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::cmd::{block_on, ConnectionArgs, MonitorArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_sample, OutputFormat, StatusReport};

pub fn run(args: MonitorArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    block_on(async {
        let mut client = conn.connect()?;
        let mut ticker = interval(args.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let interrupted = tokio::signal::ctrl_c();
        tokio::pin!(interrupted);

        let mut taken = 0u64;
        loop {
            let sample = async {
                ticker.tick().await;
                client.query_status().await
            };
            let result = tokio::select! {
                _ = &mut interrupted => {
                    info!(samples = taken, "interrupted");
                    break;
                }
                result = sample => result,
            };

            match result {
                Ok(telemetry) => print_sample(taken, &StatusReport::from(telemetry), format),
                Err(err) if is_fatal(&err) => return Err(client_error("monitor stopped", err)),
                Err(err) => warn!(sample = taken, error = %err, "sample failed"),
            }

            taken += 1;
            if args.count.is_some_and(|count| taken >= count) {
                break;
            }
        }
        Ok(SUCCESS)
    })
}

/// A single bad sample is skipped; a lost port ends the run.
fn is_fatal(err: &ClientError) -> bool {
    matches!(err, ClientError::Disconnected | ClientError::Transport(_))
        || matches!(err, ClientError::Frame(pi30_frame::FrameError::Io(_)))
}
