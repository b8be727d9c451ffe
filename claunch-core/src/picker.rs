use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

pub const PICKER_TIMEOUT: Duration = Duration::from_secs(120);
const READ_GRACE: Duration = Duration::from_millis(100);

pub trait Picker {
    fn choose(&self, prompt: &str, options: &[String]) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct OsascriptPicker {
    bin: String,
    timeout: Duration,
}

// Prompt and options arrive as script arguments, never spliced into the source.
const CHOOSE_SCRIPT: &str = r#"on run argv
  set promptText to item 1 of argv
  set pathList to rest of argv
  set chosen to choose from list pathList with title "Claunch" with prompt promptText default items {item 1 of pathList}
  if chosen is false then return ""
  return item 1 of chosen
end run"#;

impl OsascriptPicker {
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            timeout: PICKER_TIMEOUT,
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("CLAUNCH_OSASCRIPT_BIN").unwrap_or_else(|_| "osascript".to_string()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Picker for OsascriptPicker {
    fn choose(&self, prompt: &str, options: &[String]) -> Option<String> {
        if options.is_empty() {
            return None;
        }

        let mut child = Command::new(&self.bin)
            .arg("-e")
            .arg(CHOOSE_SCRIPT)
            .arg("--")
            .arg(prompt)
            .args(options)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .inspect_err(|err| debug!(bin = %self.bin, "picker failed to start: {err}"))
            .ok()?;

        let mut stdout = child.stdout.take()?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut content = String::new();
            let _ = stdout.read_to_string(&mut content);
            let _ = tx.send(content);
        });

        let deadline = Instant::now() + self.timeout;
        let status = wait_until(&mut child, deadline);
        // A forked grandchild can hold stdout open past the deadline.
        let output = match status {
            Some(_) => rx
                .recv_timeout(
                    deadline
                        .saturating_duration_since(Instant::now())
                        .max(READ_GRACE),
                )
                .unwrap_or_default(),
            None => String::new(),
        };
        match status {
            Some(status) if status.success() => {
                let chosen = output.trim();
                if chosen.is_empty() {
                    debug!("picker dismissed");
                    None
                } else {
                    Some(chosen.to_string())
                }
            }
            Some(status) => {
                debug!(code = ?status.code(), "picker exited unsuccessfully");
                None
            }
            None => {
                debug!(timeout = ?self.timeout, "picker timed out");
                None
            }
        }
    }
}

fn wait_until(child: &mut Child, deadline: Instant) -> Option<ExitStatus> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(50)),
            Ok(None) | Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}
