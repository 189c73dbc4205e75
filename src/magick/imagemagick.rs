//! ImageMagick command-line backend.
//!
//! Shells out to `convert` for rendering and `identify` for inspection. Every
//! invocation has its stdout and stderr drained on background threads and is
//! killed if it outlives the configured timeout.
//!
//! The option catalog is read from `convert -help` on first use and cached
//! on the backend instance.

use super::backend::{ImageInfo, Inspection, RasterTool, ToolError, ToolOutput, checksum_file};
use super::catalog::{CatalogError, OptionCatalog};
use crate::config::ToolsConfig;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const IDENTIFY_FORMAT: &str = "%m %w %h\n";

#[derive(Debug)]
pub struct ImageMagick {
    convert: String,
    identify: String,
    timeout: Duration,
    quiet_warnings: bool,
    catalog: OnceLock<OptionCatalog>,
}

impl Default for ImageMagick {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}

impl ImageMagick {
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            convert: config.convert.clone(),
            identify: config.identify.clone(),
            timeout: config.timeout(),
            quiet_warnings: config.quiet_warnings,
            catalog: OnceLock::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Options recognized by `convert`, fetched once per backend.
    pub fn option_catalog(&self) -> Result<&OptionCatalog, CatalogError> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog);
        }
        // `convert -help` exits non-zero on some versions; only the text matters
        let output = self.run(&self.convert, &[OsString::from("-help")])?;
        let catalog = OptionCatalog::from_help_text(&output.stdout)?;
        debug!(options = catalog.len(), "loaded convert option catalog");
        Ok(self.catalog.get_or_init(|| catalog))
    }

    /// Run `program` with `args`, capturing its output.
    #[tracing::instrument(skip(self, args))]
    pub fn run(&self, program: &str, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        debug!(?args, "running");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdout_drain = drain(child.stdout.take());
        let stderr_drain = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                // Already-exited races are fine; the kill result is irrelevant
                let _ = child.kill();
                child.wait()?;
                return Err(ToolError::Timeout {
                    program: program.to_string(),
                    after: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = join_drain(stdout_drain)?;
        let stderr = join_drain(stderr_drain)?;

        Ok(ToolOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    fn identify(&self, path: &Path) -> Result<ImageInfo, String> {
        let mut args: Vec<OsString> = Vec::new();
        if self.quiet_warnings {
            args.push("-quiet".into());
        }
        args.push("-format".into());
        args.push(IDENTIFY_FORMAT.into());
        // First frame only, so multi-page files report once
        let mut first_frame = path.as_os_str().to_os_string();
        first_frame.push("[0]");
        args.push(first_frame);

        let output = self
            .run(&self.identify, &args)
            .map_err(|e| e.to_string())?;
        if !output.success() {
            return Err(identify_failure(&output.stderr));
        }

        let (format, width, height) =
            parse_identify_output(&self.identify, &output.stdout).map_err(|e| e.to_string())?;
        let metadata = std::fs::metadata(path).map_err(|e| e.to_string())?;
        let checksum = checksum_file(path).map_err(|e| e.to_string())?;

        Ok(ImageInfo {
            format,
            width,
            height,
            size: metadata.len(),
            mtime: metadata.modified().ok(),
            checksum,
        })
    }
}

impl RasterTool for ImageMagick {
    fn convert(&self, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        self.run(&self.convert, args)
    }

    fn inspect(&self, path: &Path) -> Inspection {
        if !path.is_file() {
            return Inspection::unreadable(path, format!("not found at '{}'", path.display()));
        }
        match self.identify(path) {
            Ok(info) => Inspection::readable(path, info),
            Err(message) => Inspection::unreadable(path, message),
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut bytes)?;
        }
        Ok(bytes)
    })
}

fn join_drain(handle: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| io::Error::other("output drain thread panicked"))?
}

/// Parse one `%m %w %h` line from `identify`.
pub fn parse_identify_output(program: &str, stdout: &str) -> Result<(String, u32, u32), ToolError> {
    let unexpected = || ToolError::UnexpectedOutput {
        program: program.to_string(),
        output: stdout.trim().to_string(),
    };

    let line = stdout.lines().find(|l| !l.trim().is_empty()).ok_or_else(unexpected)?;
    let mut fields = line.split_whitespace();
    let (Some(format), Some(width), Some(height)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(unexpected());
    };
    let width = width.parse().map_err(|_| unexpected())?;
    let height = height.parse().map_err(|_| unexpected())?;
    Ok((format.to_string(), width, height))
}

/// First meaningful line of `identify` stderr, with truncation reported as corruption.
fn identify_failure(stderr: &str) -> String {
    let lowered = stderr.to_ascii_lowercase();
    if lowered.contains("premature end") || lowered.contains("corrupt") {
        return "corrupt image".to_string();
    }
    stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unreadable image")
        .to_string()
}
