//! External process invocation and output capture.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{Result, TidyscanError};

/// Identifying text expected in `clang-tidy --version` output.
pub const PROBE_MARKER: &str = "LLVM";

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One scheduled process-invocation request. Immutable once enqueued.
#[derive(Debug, Clone)]
pub struct Task {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl Task {
    #[must_use]
    pub fn new(executable: PathBuf, args: Vec<String>) -> Self {
        Self {
            executable,
            args,
            working_dir: None,
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Captured outcome of one task execution.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    /// Process exit code (-1 if unavailable: start failure, signal, timeout).
    exit_code: i32,
    /// Standard output.
    stdout: String,
    /// Standard error.
    stderr: String,
    /// Execution time in milliseconds.
    duration_ms: u64,
}

impl TaskResult {
    #[must_use]
    pub fn new(exit_code: i32, stdout: String, stderr: String, duration_ms: u64) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration_ms,
        }
    }

    /// Synthetic result for a task whose process never ran. The error text
    /// lands in stderr so it flows through the normal aggregation path.
    #[must_use]
    pub fn start_failure(detail: String, duration_ms: u64) -> Self {
        Self::new(-1, String::new(), detail, duration_ms)
    }

    /// Whether the process exited with code 0.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// A batch produced usable tool output when stdout is non-blank,
    /// independent of exit code: clang-tidy exits non-zero on findings.
    #[must_use]
    pub fn has_output(&self) -> bool {
        !self.stdout.trim().is_empty()
    }
}

enum Wait {
    Exited(ExitStatus),
    TimedOut,
    Lost(std::io::Error),
}

/// Runs tasks to completion, with an optional per-process deadline.
///
/// No retry lives at this layer; the caller owns concurrency policy.
#[derive(Debug, Clone, Default)]
pub struct Invoker {
    timeout: Option<Duration>,
}

impl Invoker {
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Spawns the task's process and captures both channels to completion.
    ///
    /// A process that cannot be started yields a synthetic failed result;
    /// a non-zero exit is a normal outcome, reported as-is. When a deadline
    /// is configured, an overrunning process is killed and reported failed.
    #[must_use]
    pub fn run(&self, task: &Task) -> TaskResult {
        let start = Instant::now();

        let mut cmd = Command::new(&task.executable);
        cmd.args(&task.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &task.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &task.env {
            cmd.env(key, value);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return TaskResult::start_failure(
                    format!("Failed to execute {}: {e}", task.executable.display()),
                    elapsed_ms(start),
                );
            }
        };

        // Both channels are drained on reader threads so a chatty process
        // cannot deadlock against a full pipe while we wait on it.
        let stdout_reader = read_async(child.stdout.take());
        let stderr_reader = read_async(child.stderr.take());

        let outcome = match self.timeout {
            Some(limit) => wait_with_deadline(&mut child, start, limit),
            None => match child.wait() {
                Ok(status) => Wait::Exited(status),
                Err(e) => Wait::Lost(e),
            },
        };

        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);
        let duration_ms = elapsed_ms(start);

        match outcome {
            Wait::Exited(status) => {
                TaskResult::new(status.code().unwrap_or(-1), stdout, stderr, duration_ms)
            }
            Wait::TimedOut => {
                let limit = self.timeout.unwrap_or_default();
                let mut detail = format!(
                    "process timed out after {:.1}s and was killed",
                    limit.as_secs_f64()
                );
                if !stderr.is_empty() {
                    detail.push('\n');
                    detail.push_str(&stderr);
                }
                TaskResult::new(-1, stdout, detail, duration_ms)
            }
            Wait::Lost(e) => TaskResult::new(
                -1,
                stdout,
                format!("failed waiting on process: {e}\n{stderr}"),
                duration_ms,
            ),
        }
    }
}

fn wait_with_deadline(child: &mut Child, start: Instant, limit: Duration) -> Wait {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Wait::Exited(status),
            Ok(None) => {}
            Err(e) => return Wait::Lost(e),
        }
        if start.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            return Wait::TimedOut;
        }
        thread::sleep(WAIT_POLL_INTERVAL);
    }
}

fn read_async<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// One-shot availability probe: `<executable> --version` must exit 0 and
/// identify itself as an LLVM tool. Returns the version line on success.
///
/// # Errors
/// Returns `ToolNotFound` when the executable is missing, exits non-zero,
/// or does not produce the expected identifying text.
pub fn probe(executable: &Path) -> Result<String> {
    let task = Task::new(executable.to_path_buf(), vec!["--version".into()]);
    let result = Invoker::new(Some(Duration::from_secs(10))).run(&task);

    if !result.passed() {
        let detail = if result.stderr().is_empty() {
            format!("exit code {}", result.exit_code())
        } else {
            result.stderr().trim().to_string()
        };
        return Err(TidyscanError::ToolNotFound {
            path: executable.to_path_buf(),
            detail,
        });
    }

    if !result.stdout().contains(PROBE_MARKER) {
        return Err(TidyscanError::ToolNotFound {
            path: executable.to_path_buf(),
            detail: "--version output does not identify clang-tidy".to_string(),
        });
    }

    let version = result
        .stdout()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();
    Ok(version)
}
