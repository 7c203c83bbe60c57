//! Component and alarm uid synthesis.
//!
//! Uids have the form `<local YYYYMMDDTHHMMSS>-<pid>-<gid>-<ppid>-<serial>@<host>`.
//! Stored data already carries uids in this shape, so the layout is fixed.

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local, Utc};
use tessen_core::config::Settings;
use tessen_core::constants::FALLBACK_HOSTNAME;
use tessen_rfc::rfc::ical::time::format_iso8601;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Serial shared by every generator built for this process.
static PROCESS_SERIAL: LazyLock<Arc<AtomicU64>> = LazyLock::new(|| Arc::new(AtomicU64::new(0)));

/// Process and host identity embedded in every uid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub hostname: String,
    pub pid: u32,
    pub gid: u32,
    pub ppid: u32,
}

impl HostIdentity {
    /// Detects the identity of the running process.
    ///
    /// The hostname comes from `hostname_override`, then `$HOSTNAME`, then
    /// the kernel, then `localhost`.
    #[must_use]
    pub fn detect(hostname_override: Option<&str>) -> Self {
        let hostname = hostname_override
            .map(str::to_string)
            .or_else(|| std::env::var("HOSTNAME").ok())
            .or_else(|| {
                std::fs::read_to_string("/proc/sys/kernel/hostname")
                    .ok()
                    .map(|s| s.trim().to_string())
            })
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| {
                tracing::debug!("Hostname unavailable, using fallback");
                FALLBACK_HOSTNAME.to_string()
            });

        Self {
            hostname,
            pid: std::process::id(),
            gid: current_gid(),
            ppid: parent_pid(),
        }
    }
}

#[cfg(unix)]
fn current_gid() -> u32 {
    use std::os::unix::fs::MetadataExt;

    std::fs::metadata("/proc/self").map_or(0, |m| m.gid())
}

#[cfg(not(unix))]
fn current_gid() -> u32 {
    0
}

#[cfg(unix)]
fn parent_pid() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(not(unix))]
fn parent_pid() -> u32 {
    0
}

/// Generates uids and creation timestamps.
///
/// Generators share the process-wide serial counter unless detached with
/// [`UidGenerator::with_serial`], so uids minted in the same second differ.
#[derive(Clone)]
pub struct UidGenerator {
    identity: Arc<HostIdentity>,
    serial: Arc<AtomicU64>,
    clock: Clock,
}

impl UidGenerator {
    /// Creates a generator reading the system clock and the process serial.
    #[must_use]
    pub fn new(identity: HostIdentity) -> Self {
        Self {
            identity: Arc::new(identity),
            serial: Arc::clone(&PROCESS_SERIAL),
            clock: Arc::new(Utc::now),
        }
    }

    /// Creates a generator for the running process, honoring `identity.hostname`.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(HostIdentity::detect(settings.identity.hostname.as_deref()))
    }

    /// Replaces the clock used for uids and DTSTAMP values.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Restarts the serial counter at `serial`, detaching it from any clones.
    #[must_use]
    pub fn with_serial(mut self, serial: u64) -> Self {
        self.serial = Arc::new(AtomicU64::new(serial));
        self
    }

    #[must_use]
    pub fn identity(&self) -> &HostIdentity {
        &self.identity
    }

    /// Current time according to this generator's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Produces the next uid.
    #[must_use]
    pub fn next_uid(&self) -> String {
        let serial = self.serial.fetch_add(1, Ordering::Relaxed);
        let local = self.now().with_timezone(&Local).naive_local();
        let id = &self.identity;
        format!(
            "{}-{}-{}-{}-{serial}@{}",
            format_iso8601(local),
            id.pid,
            id.gid,
            id.ppid,
            id.hostname
        )
    }
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl fmt::Debug for UidGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UidGenerator")
            .field("identity", &self.identity)
            .field("serial", &self.serial.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tessen_rfc::rfc::ical::time::parse_iso8601;

    use super::*;

    fn fixed() -> UidGenerator {
        UidGenerator::new(HostIdentity {
            hostname: "cal.example.com".to_string(),
            pid: 4242,
            gid: 100,
            ppid: 1,
        })
        .with_clock(|| Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
        .with_serial(0)
    }

    #[test_log::test]
    fn uid_layout() {
        let uid = fixed().next_uid();
        let (stamp, rest) = uid.split_once('-').unwrap();
        assert_eq!(rest, "4242-100-1-0@cal.example.com");
        assert_eq!(stamp.len(), 15);
        assert!(parse_iso8601(stamp).is_ok());
    }

    #[test_log::test]
    fn clones_share_serial() {
        let generator = fixed();
        let clone = generator.clone();
        let a = generator.next_uid();
        let b = clone.next_uid();
        assert_ne!(a, b);
        assert!(a.ends_with("-0@cal.example.com"));
        assert!(b.ends_with("-1@cal.example.com"));
    }

    #[test]
    fn with_serial_restarts_counter() {
        let generator = fixed().with_serial(7);
        assert!(generator.next_uid().ends_with("-7@cal.example.com"));
    }

    #[test_log::test]
    fn independent_generators_share_process_serial() {
        let a = UidGenerator::default().next_uid();
        let b = UidGenerator::default().next_uid();
        assert_ne!(a, b);
        assert!(Arc::ptr_eq(
            &UidGenerator::default().serial,
            &UidGenerator::default().serial
        ));
        assert!(!Arc::ptr_eq(&fixed().serial, &UidGenerator::default().serial));
    }

    #[test]
    fn hostname_override_wins() {
        let identity = HostIdentity::detect(Some("override.example"));
        assert_eq!(identity.hostname, "override.example");
        assert_eq!(identity.pid, std::process::id());
    }
}
