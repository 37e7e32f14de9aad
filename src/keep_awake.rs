use std::process::Child;
#[cfg(target_os = "linux")]
use std::{
    io::Read,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};

#[cfg(target_os = "linux")]
const STARTUP_GRACE: Duration = Duration::from_millis(200);
#[cfg(target_os = "linux")]
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Keeps the machine from suspending while held.
///
/// On Linux this holds a `systemd-inhibit` lock; the inhibited command waits
/// on our pid, so the lock also goes away if the process dies without
/// dropping the guard. Elsewhere it does nothing. Failures are only logged.
#[derive(Debug)]
pub struct KeepAwake {
    inhibitor: Option<Child>,
}

impl KeepAwake {
    pub fn acquire() -> Self {
        Self {
            inhibitor: spawn_inhibitor(),
        }
    }

    pub fn disabled() -> Self {
        Self { inhibitor: None }
    }

    pub fn is_active(&self) -> bool {
        self.inhibitor.is_some()
    }
}

#[cfg(target_os = "linux")]
fn spawn_inhibitor() -> Option<Child> {
    let pid = std::process::id().to_string();

    let mut command = Command::new("systemd-inhibit");
    command.args([
        "--what=sleep:idle",
        "--who=commitlens",
        "--why=Fetching commit history",
        "--mode=block",
        "tail",
        "--pid",
        pid.as_str(),
        "-f",
        "/dev/null",
    ]);

    start_inhibitor(command, STARTUP_GRACE)
}

/// Starts `command` and watches it for `grace`. An inhibitor that exits that
/// early never took the lock (denied by polkit, no logind session, ...).
#[cfg(target_os = "linux")]
fn start_inhibitor(mut command: Command, grace: Duration) -> Option<Child> {
    let result = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match result {
        Ok(child) => child,
        Err(e) => {
            warn!("Failed to inhibit system sleep: {e}");
            return None;
        }
    };

    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                warn!(
                    "Failed to inhibit system sleep ({status}): {}",
                    failure_reason(&mut child)
                );
                return None;
            }
            Ok(None) if Instant::now() >= deadline => break,
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                warn!("Failed to check sleep inhibitor: {e}");
                release(child);
                return None;
            }
        }
    }

    debug!("System sleep inhibited (pid {})", child.id());
    Some(child)
}

#[cfg(target_os = "linux")]
fn failure_reason(child: &mut Child) -> String {
    let mut reason = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        if let Err(e) = stderr.read_to_string(&mut reason) {
            return format!("unreadable stderr ({e})");
        }
    }

    match reason.trim() {
        "" => "no output".to_string(),
        reason => reason.to_string(),
    }
}

#[cfg(not(target_os = "linux"))]
fn spawn_inhibitor() -> Option<Child> {
    debug!("System sleep inhibition is not supported on this platform");
    None
}

impl Drop for KeepAwake {
    fn drop(&mut self) {
        if let Some(child) = self.inhibitor.take() {
            release(child);
        }
    }
}

fn release(mut child: Child) {
    if let Err(e) = child.kill() {
        warn!("Failed to allow system sleep: {e}");
    }
    if let Err(e) = child.wait() {
        warn!("Failed to reap sleep inhibitor: {e}");
    } else {
        debug!("System sleep allowed again");
    }
}
