//! Scalar printers: each extracts one field and converts it.
//!
//! Timestamps and durations are formatted here. Fractions, strong aliases
//! and optionals are pass-through: their summary is the wrapped value itself,
//! which the host formats with whatever printer applies to it.

use chrono::DateTime;

use super::{field_path, Inspected, Summary, ValuePrinter};
use crate::error::{LoupeError, LoupeResult};
use crate::inspector::Inspector;

const SECONDS_PER_DAY: u64 = 86_400;
const TIMESTAMP_FORMAT: &str = "%d.%m.%Y - %H:%M:%S";

/// Format seconds since the Unix epoch as `DD.MM.YYYY - HH:MM:SS` in UTC.
///
/// ```rust
/// use loupe_core::printers::scalar::format_timestamp;
///
/// assert_eq!(format_timestamp(0).unwrap(), "01.01.1970 - 00:00:00");
/// ```
///
/// ## Errors
///
/// `InvalidTimestamp` when the value is outside the representable calendar range.
pub fn format_timestamp(seconds: i128) -> LoupeResult<String>
{
    let datetime = i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(LoupeError::InvalidTimestamp(seconds))?;
    Ok(datetime.format(TIMESTAMP_FORMAT).to_string())
}

/// Format elapsed seconds as `[D day(s), ]H:MM:SS`.
///
/// ```rust
/// use loupe_core::printers::scalar::format_duration;
///
/// assert_eq!(format_duration(3661), "1:01:01");
/// assert_eq!(format_duration(90_000), "1 day, 1:00:00");
/// ```
pub fn format_duration(seconds: u64) -> String
{
    let days = seconds / SECONDS_PER_DAY;
    let rest = seconds % SECONDS_PER_DAY;
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

/// Seconds since the epoch.
pub struct EpochTimestampPrinter<V>
{
    seconds: V,
}

impl<I: Inspector> ValuePrinter<I> for EpochTimestampPrinter<I::Value>
{
    fn summary(&self, inspector: &I) -> LoupeResult<Option<Summary<I::Value>>>
    {
        let seconds = inspector.to_integer(&self.seconds)?;
        format_timestamp(seconds).map(|text| Some(Summary::Text(text)))
    }
}

/// Elapsed seconds.
pub struct DurationPrinter<V>
{
    seconds: V,
}

impl<I: Inspector> ValuePrinter<I> for DurationPrinter<I::Value>
{
    fn summary(&self, inspector: &I) -> LoupeResult<Option<Summary<I::Value>>>
    {
        let raw = inspector.to_integer(&self.seconds)?;
        let seconds =
            u64::try_from(raw).map_err(|_| LoupeError::InvalidArgument(format!("negative duration: {raw}")))?;
        Ok(Some(Summary::Text(format_duration(seconds))))
    }
}

/// Shows the wrapped value as the wrapper's own summary.
pub struct PassThroughPrinter<V>
{
    inner: V,
}

impl<I: Inspector> ValuePrinter<I> for PassThroughPrinter<I::Value>
{
    fn summary(&self, _inspector: &I) -> LoupeResult<Option<Summary<I::Value>>>
    {
        Ok(Some(Summary::Value(self.inner.clone())))
    }
}

/// `soro::unixtime` / `rapid::unixtime`: seconds in `t_`.
pub fn unixtime<I: Inspector>(inspector: &I, inspected: Inspected<I::Value>) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    let seconds = field_path(inspector, &inspected.value, &["t_"])?;
    Ok(Box::new(EpochTimestampPrinter { seconds }))
}

/// `std::chrono::time_point` over the system clock: seconds in `__d.__r`.
pub fn sys_seconds<I: Inspector>(inspector: &I, inspected: Inspected<I::Value>) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    let seconds = field_path(inspector, &inspected.value, &["__d", "__r"])?;
    Ok(Box::new(EpochTimestampPrinter { seconds }))
}

/// `std::chrono::duration` in seconds: count in `__r`.
pub fn seconds<I: Inspector>(inspector: &I, inspected: Inspected<I::Value>) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    let seconds = field_path(inspector, &inspected.value, &["__r"])?;
    Ok(Box::new(DurationPrinter { seconds }))
}

/// `soro::utls::fraction`: no unit conversion, `val_` as is.
pub fn fraction<I: Inspector>(inspector: &I, inspected: Inspected<I::Value>) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    pass_through(inspector, &inspected, "val_")
}

/// `cista::strong`: the wrapped `v_`.
pub fn strong<I: Inspector>(inspector: &I, inspected: Inspected<I::Value>) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    pass_through(inspector, &inspected, "v_")
}

/// `soro::utls::optional`: the payload `val_`. An empty optional holds its
/// type's invalid sentinel, which is shown like any other payload.
pub fn optional<I: Inspector>(inspector: &I, inspected: Inspected<I::Value>) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    pass_through(inspector, &inspected, "val_")
}

fn pass_through<I: Inspector>(
    inspector: &I,
    inspected: &Inspected<I::Value>,
    field: &str,
) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    let inner = field_path(inspector, &inspected.value, &[field])?;
    Ok(Box::new(PassThroughPrinter { inner }))
}
