// SPDX-License-Identifier: MPL-2.0
use std::process::ExitCode;
use std::time::Duration;

use zenconvert::app::{self, paths, Flags};

const HELP: &str = "\
zenconvert-host: privileged side of the ZenConvert bridge

Speaks newline-delimited JSON on stdin/stdout. Logs go to stderr.

USAGE:
  zenconvert-host [OPTIONS]

OPTIONS:
  -h, --help                 Print this help
      --data-dir PATH        Directory for persisted session state
      --config-dir PATH      Directory containing settings.toml
      --log-level FILTER     Log filter (overrides RUST_LOG), e.g. debug
      --diagnostics-out PATH Write the diagnostics event log here on exit

ENVIRONMENT:
  ZENCONVERT_DATA_DIR        Same as --data-dir
  ZENCONVERT_CONFIG_DIR      Same as --config-dir
";

fn parse_args() -> Result<Option<Flags>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }
    let flags = Flags {
        data_dir: args.opt_value_from_str("--data-dir")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        log_level: args.opt_value_from_str("--log-level")?,
        diagnostics_out: args.opt_value_from_str("--diagnostics-out")?,
    };
    let rest = args.finish();
    if !rest.is_empty() {
        eprintln!("warning: ignoring unexpected arguments: {rest:?}");
    }
    Ok(Some(flags))
}

fn main() -> ExitCode {
    let flags = match parse_args() {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = app::logging::init(flags.log_level.as_deref()) {
        eprintln!("warning: logger already installed: {err}");
    }

    if let Err(err) = paths::init_cli_overrides(flags.data_dir.clone(), flags.config_dir.clone()) {
        log::error!("startup: {err}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("startup: cannot start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(app::run(flags));
    // Blocking stdin reads would otherwise keep the runtime alive.
    runtime.shutdown_timeout(Duration::from_millis(500));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("startup: {err}");
            ExitCode::FAILURE
        }
    }
}
