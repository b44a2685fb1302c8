//! Shell filters through `sh -c`.

use std::io::Write;
use std::process::{Command, Stdio};

use super::ProcessError;

/// Run `command` with `input` on stdin and return its stdout.
///
/// A process killed by a signal counts as interrupted.
pub fn run_shell(command: &str, input: &str) -> Result<String, ProcessError> {
    tracing::debug!(command, input_len = input.len(), "spawning filter");
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // stdin is written from its own thread while stdout drains.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_owned();
        std::thread::spawn(move || stdin.write_all(input.as_bytes()))
    });
    let output = child.wait_with_output()?;
    if let Some(writer) = writer {
        // A broken pipe only means the filter ignored part of its input.
        let _ = writer.join();
    }

    match output.status.code() {
        Some(0) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
        Some(status) => Err(ProcessError::Failed {
            status,
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
        }),
        None => Err(ProcessError::Interrupted),
    }
}
