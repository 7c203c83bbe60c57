/// Extension property carrying the per-component alarm identifier.
///
/// Not part of RFC 2445; consumers that do not know it must preserve it.
pub const ALARM_UID_PROPERTY: &str = "X-TESSEN-ALARM-UID";

/// Product identifier used when wrapping components in a fresh VCALENDAR.
pub const PRODUCT_ID: &str = "-//Tessen//Tessen Calendar Core//EN";

/// Description given to alarms that need one but whose owner has no summary.
pub const DEFAULT_UNTITLED_DESCRIPTION: &str = "Untitled appointment";

/// Host part used in generated uids when no hostname can be determined.
pub const FALLBACK_HOSTNAME: &str = "localhost";

/// Default per-rule iteration cap for recurrence generation.
pub const DEFAULT_MAX_ITERATIONS: u64 = 100_000;
