//! Script executor.
//!
//! Launches a script as a child process, mirrors every line it prints to a
//! [`LogSink`] and optionally captures the combined output for display.
//!
//! Output ordering is fixed: all stdout lines come first, then all stderr
//! lines, no matter how the script interleaved them in time. stderr is
//! drained concurrently so a chatty script can't block on a full pipe, but
//! its lines are only mirrored and captured once stdout has closed.

mod log_sink;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::scripts::absolute_path;

pub use log_sink::{FileLogSink, LogEntry, LogSink, MemoryLogSink, OutputStream};

// =============================================================================
// Run Options & Result
// =============================================================================

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Buffer output for display. Lines are logged either way.
    pub capture: bool,

    /// Working directory override. Used only if it is an existing directory.
    pub working_dir: Option<PathBuf>,
}

impl RunOptions {
    pub fn capture(capture: bool) -> Self {
        Self {
            capture,
            working_dir: None,
        }
    }
}

/// Outcome of one script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Captured output, one `\n`-terminated line per script line.
    pub text: String,

    /// Number of captured lines.
    pub line_count: usize,

    /// False only when the script couldn't be launched or read.
    /// The exit code is not consulted.
    pub success: bool,

    /// Failure detail, present only when `success` is false.
    pub error_message: Option<String>,

    /// Exit code as reported by the OS, for diagnostics.
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    fn failure(message: String) -> Self {
        Self {
            text: String::new(),
            line_count: 0,
            success: false,
            error_message: Some(message),
            exit_code: None,
        }
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Accumulates captured output.
struct Capture {
    enabled: bool,
    text: String,
    line_count: usize,
}

impl Capture {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            text: String::new(),
            line_count: 0,
        }
    }

    fn push(&mut self, line: &str) {
        if self.enabled {
            self.text.push_str(line);
            self.text.push('\n');
            self.line_count += 1;
        }
    }

    fn finish(self, exit_code: Option<i32>) -> ExecutionResult {
        ExecutionResult {
            text: self.text,
            line_count: self.line_count,
            success: true,
            error_message: None,
            exit_code,
        }
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Runs scripts and mirrors their output to a log sink.
#[derive(Clone)]
pub struct ScriptExecutor {
    sink: Arc<dyn LogSink>,
}

impl ScriptExecutor {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Run `script` to completion.
    ///
    /// Never returns an error: launch and read failures come back as a
    /// result with `success == false` and the captured text discarded.
    pub async fn run(&self, script: &Path, options: &RunOptions) -> ExecutionResult {
        let script = absolute_path(script);
        info!(script = %script.display(), capture = options.capture, "Running script");
        self.sink
            .note(&format!("Running script {}...", script.display()));

        match self.execute(&script, options).await {
            Ok(result) => {
                debug!(
                    lines = result.line_count,
                    exit_code = ?result.exit_code,
                    "Script finished"
                );
                self.sink.note("Done.");
                result
            }
            Err(e) => {
                error!(error = %e, "Script run failed");
                self.sink.note(&format!("Exit with error: {}", e));
                ExecutionResult::failure(e.to_string())
            }
        }
    }

    async fn execute(&self, script: &Path, options: &RunOptions) -> Result<ExecutionResult> {
        let mut cmd = Command::new(script);
        if let Some(dir) = working_dir_for(script, options.working_dir.as_deref()) {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| launch_error(script, e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let mut capture = Capture::new(options.capture);

        let stdout_pass = async {
            if let Some(stdout) = stdout {
                let mut reader = BufReader::new(stdout);
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    if reader.read_until(b'\n', &mut buf).await? == 0 {
                        break;
                    }
                    let line = decode_line(&buf);
                    self.sink.line(OutputStream::Stdout, &line);
                    capture.push(&line);
                }
            }
            Ok::<_, std::io::Error>(())
        };

        let (stdout_result, stderr_result) = tokio::join!(stdout_pass, collect_lines(stderr));
        stdout_result.map_err(|e| read_error(script, e))?;
        let stderr_lines = stderr_result.map_err(|e| read_error(script, e))?;

        for line in &stderr_lines {
            self.sink.line(OutputStream::Stderr, line);
            capture.push(line);
        }

        let status = child.wait().await.map_err(|e| read_error(script, e))?;
        Ok(capture.finish(status.code()))
    }
}

/// Pick the working directory for a run.
///
/// The override wins when it is a directory, then the script's parent
/// folder. `None` means the child inherits ours.
pub fn working_dir_for(script: &Path, override_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| d.is_dir()) {
        return Some(dir.to_path_buf());
    }
    script
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && p.is_dir())
        .map(Path::to_path_buf)
}

async fn collect_lines<R>(stream: Option<R>) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    let Some(stream) = stream else {
        return Ok(lines);
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        lines.push(decode_line(&buf));
    }
    Ok(lines)
}

/// Lossy-decode a raw line and drop trailing whitespace and line endings.
fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim_end().to_string()
}

fn launch_error(script: &Path, e: std::io::Error) -> Error {
    Error::Launch {
        path: script.to_path_buf(),
        message: e.to_string(),
    }
}

fn read_error(script: &Path, e: std::io::Error) -> Error {
    Error::Launch {
        path: script.to_path_buf(),
        message: format!("reading output failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line_trims_trailing_only() {
        assert_eq!(decode_line(b"  indented \t\r\n"), "  indented");
        assert_eq!(decode_line(b"plain\n"), "plain");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"bad \xff byte\n"), "bad \u{fffd} byte");
    }

    #[test]
    fn test_working_dir_prefers_existing_override() {
        let temp = tempfile::TempDir::new().unwrap();
        let script = temp.path().join("run.sh");
        let other = tempfile::TempDir::new().unwrap();

        assert_eq!(
            working_dir_for(&script, Some(other.path())),
            Some(other.path().to_path_buf())
        );
        assert_eq!(
            working_dir_for(&script, Some(&temp.path().join("missing"))),
            Some(temp.path().to_path_buf())
        );
        assert_eq!(working_dir_for(&script, None), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_working_dir_inherits_when_parent_missing() {
        assert_eq!(working_dir_for(Path::new("run.sh"), None), None);
        assert_eq!(
            working_dir_for(Path::new("/definitely/not/here/run.sh"), None),
            None
        );
    }

    #[tokio::test]
    async fn test_missing_script_is_failure_with_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let script = temp.path().join("deleted.sh");
        let sink = Arc::new(MemoryLogSink::new());
        let executor = ScriptExecutor::new(sink.clone());

        let result = executor.run(&script, &RunOptions::capture(true)).await;

        assert!(!result.success);
        assert!(result.text.is_empty());
        assert_eq!(result.line_count, 0);
        let message = result.error_message.unwrap();
        assert!(message.contains("deleted.sh"), "{message}");
        assert!(sink.notes().iter().any(|n| n.starts_with("Exit with error")));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::sync::Arc;
        use tempfile::TempDir;

        use crate::test_support::write_script;

        fn executor() -> (Arc<MemoryLogSink>, ScriptExecutor) {
            let sink = Arc::new(MemoryLogSink::new());
            (sink.clone(), ScriptExecutor::new(sink))
        }

        #[tokio::test]
        async fn test_stdout_lines_come_before_stderr() {
            let temp = TempDir::new().unwrap();
            let script = write_script(
                temp.path(),
                "mixed.sh",
                "echo err1 >&2\necho out1\nsleep 0.1\necho err2 >&2\necho out2",
            );
            let (sink, executor) = executor();

            let result = executor.run(&script, &RunOptions::capture(true)).await;

            assert!(result.success, "{:?}", result.error_message);
            assert_eq!(result.text, "out1\nout2\nerr1\nerr2\n");
            assert_eq!(result.line_count, 4);
            assert_eq!(sink.lines(), vec!["out1", "out2", "err1", "err2"]);
        }

        #[tokio::test]
        async fn test_capture_disabled_still_logs_every_line() {
            let temp = TempDir::new().unwrap();
            let script = write_script(temp.path(), "quiet.sh", "echo a\necho b\necho c >&2");
            let (sink, executor) = executor();

            let result = executor.run(&script, &RunOptions::capture(false)).await;

            assert!(result.success);
            assert!(result.text.is_empty());
            assert_eq!(result.line_count, 0);
            assert_eq!(sink.lines(), vec!["a", "b", "c"]);
        }

        #[tokio::test]
        async fn test_notes_frame_the_run() {
            let temp = TempDir::new().unwrap();
            let script = write_script(temp.path(), "hello.sh", "echo hi");
            let (sink, executor) = executor();

            executor.run(&script, &RunOptions::capture(true)).await;

            let notes = sink.notes();
            assert_eq!(notes.last().map(String::as_str), Some("Done."));
            assert!(notes[0].starts_with("Running script "));
            assert!(notes[0].contains("hello.sh"));
        }

        #[tokio::test]
        async fn test_trailing_whitespace_is_trimmed() {
            let temp = TempDir::new().unwrap();
            let script = write_script(
                temp.path(),
                "ws.sh",
                "printf 'a  \\r\\n'\nprintf '   b\\t\\n'\nprintf 'last'",
            );
            let (_sink, executor) = executor();

            let result = executor.run(&script, &RunOptions::capture(true)).await;

            assert_eq!(result.text, "a\n   b\nlast\n");
            assert_eq!(result.line_count, 3);
        }

        #[tokio::test]
        async fn test_nonzero_exit_without_output_is_success() {
            let temp = TempDir::new().unwrap();
            let script = write_script(temp.path(), "fail.sh", "exit 1");
            let (_sink, executor) = executor();

            let result = executor.run(&script, &RunOptions::capture(true)).await;

            assert!(result.success);
            assert_eq!(result.text, "");
            assert_eq!(result.line_count, 0);
            assert_eq!(result.exit_code, Some(1));
            assert!(result.error_message.is_none());
        }

        #[tokio::test]
        async fn test_non_executable_file_is_launch_failure() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("plain.sh");
            fs::write(&path, "echo never").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
            let (_sink, executor) = executor();

            let result = executor.run(&path, &RunOptions::capture(true)).await;

            assert!(!result.success);
            assert!(result.error_message.unwrap().contains("plain.sh"));
        }

        #[tokio::test]
        async fn test_runs_in_script_folder() {
            let temp = TempDir::new().unwrap();
            fs::write(temp.path().join("marker.txt"), "").unwrap();
            let script = write_script(temp.path(), "where.sh", "ls marker.txt");
            let (_sink, executor) = executor();

            let result = executor.run(&script, &RunOptions::capture(true)).await;

            assert_eq!(result.text, "marker.txt\n");
        }

        #[tokio::test]
        async fn test_working_dir_override() {
            let temp = TempDir::new().unwrap();
            let other = TempDir::new().unwrap();
            fs::write(other.path().join("elsewhere.txt"), "").unwrap();
            let script = write_script(temp.path(), "where.sh", "ls");
            let (_sink, executor) = executor();

            let options = RunOptions {
                capture: true,
                working_dir: Some(other.path().to_path_buf()),
            };
            let result = executor.run(&script, &options).await;

            assert_eq!(result.text, "elsewhere.txt\n");
        }

        #[tokio::test]
        async fn test_large_stderr_does_not_block() {
            let temp = TempDir::new().unwrap();
            let script = write_script(
                temp.path(),
                "noisy.sh",
                "i=0\nwhile [ $i -lt 5000 ]; do echo \"error line $i\" >&2; i=$((i+1)); done\necho finished",
            );
            let (sink, executor) = executor();

            let result = tokio::time::timeout(
                std::time::Duration::from_secs(30),
                executor.run(&script, &RunOptions::capture(true)),
            )
            .await
            .expect("script run should not dead-lock");

            assert!(result.success);
            assert_eq!(result.line_count, 5001);
            assert!(result.text.starts_with("finished\nerror line 0\n"));
            assert_eq!(sink.lines().len(), 5001);
        }
    }
}
