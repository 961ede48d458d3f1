pub mod cli;
pub mod errors;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use tracing::info;
use zedit_config::AppConfig;

pub use cli::{CliSession, ConsolePrinter, LineInput, SessionReport, describe_entity};
pub use errors::FrontendError;

/// 启动命令行前端。给出脚本时逐行回放脚本，否则读取标准输入。
pub fn run_cli(config: &AppConfig, script: Option<&Path>) -> Result<SessionReport, FrontendError> {
    let mut session = CliSession::new(config);
    let report = match script {
        Some(path) => {
            let file = File::open(path).map_err(|source| FrontendError::Script {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "回放命令脚本");
            let mut input = LineInput::new(BufReader::new(file));
            if config.command_line.echo_input {
                input = input.with_echo(Box::new(io::stdout()));
            }
            session.run_with(input, io::stdout())?
        }
        None => session.run(io::stdin().lock(), io::stdout())?,
    };
    info!(
        executed = report.executed,
        cancelled = report.cancelled,
        failed = report.failed,
        unknown = report.unknown,
        "命令行会话结束"
    );
    Ok(report)
}
