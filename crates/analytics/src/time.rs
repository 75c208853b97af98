//! The host framework stamps its event payloads with millisecond unix
//! timestamps; all record fields use the same representation.

/// Current wall clock in unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
