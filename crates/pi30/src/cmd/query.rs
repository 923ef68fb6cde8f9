use crate::cmd::{block_on, ConnectionArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, ModeReport, OutputFormat, SettingsReport, StatusReport};

pub fn mode(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    block_on(async {
        let mut client = conn.connect()?;
        let mode = client
            .query_mode()
            .await
            .map_err(|err| client_error("mode query failed", err))?;
        print_report(&ModeReport::from(mode), format);
        Ok(SUCCESS)
    })
}

pub fn settings(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    block_on(async {
        let mut client = conn.connect()?;
        let settings = client
            .query_settings()
            .await
            .map_err(|err| client_error("settings query failed", err))?;
        print_report(&SettingsReport(settings), format);
        Ok(SUCCESS)
    })
}

pub fn status(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    block_on(async {
        let mut client = conn.connect()?;
        let telemetry = client
            .query_status()
            .await
            .map_err(|err| client_error("status query failed", err))?;
        print_report(&StatusReport::from(telemetry), format);
        Ok(SUCCESS)
    })
}
