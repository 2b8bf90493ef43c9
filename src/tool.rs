use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Result, ScanError};

#[derive(Debug)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external tool to completion, killing it once `timeout` elapses.
pub async fn run(program: &str, args: &[String], timeout: Duration) -> Result<ToolOutput> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|source| ScanError::ToolSpawn {
        tool: program.to_string(),
        source,
    })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ScanError::ToolSpawn {
            tool: program.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(ScanError::ToolTimeout {
                tool: program.to_string(),
                timeout,
            })
        }
    };

    Ok(ToolOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
