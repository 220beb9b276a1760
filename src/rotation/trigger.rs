//! Rotation triggers
//!
//! A trigger only answers "when is the next firing after this instant". Cron
//! expressions are handled by the `cron` crate.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use cron::Schedule;

use crate::config::Zone;
use crate::error::{LogError, Result};

/// Source of rotation times
pub trait Trigger: Send + Sync {
    /// Next firing strictly after `after`, or `None` when exhausted
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

impl<F> Trigger for F
where
    F: Fn(DateTime<Utc>) -> Option<DateTime<Utc>> + Send + Sync,
{
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self(after)
    }
}

/// Expand `@` descriptors and 5-field expressions to the 6/7-field format
/// expected by the `cron` crate
fn expand_expression(expression: &str) -> String {
    let expression = expression.trim();
    match expression {
        "@midnight" | "@daily" => return "0 0 0 * * *".to_string(),
        "@hourly" => return "0 0 * * * *".to_string(),
        "@weekly" => return "0 0 0 * * Sun".to_string(),
        "@monthly" => return "0 0 0 1 * *".to_string(),
        "@yearly" | "@annually" => return "0 0 0 1 1 *".to_string(),
        _ => {}
    }
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if let [minute, hour, day, month, weekday] = fields[..] {
        format!(
            "0 {} {} {} {} {} *",
            minute,
            hour,
            day,
            month,
            unix_weekdays(weekday)
        )
    } else {
        expression.to_string()
    }
}

/// Renumber a Unix day-of-week field (0 or 7 = Sunday) to the `cron` crate's
/// (1 = Sunday, 7 = Saturday). Names and `*` pass through.
fn unix_weekdays(field: &str) -> String {
    let shift = |n: u8| if n == 0 || n == 7 { 1 } else { n + 1 };
    field
        .split(',')
        .map(|item| {
            let (base, step) = match item.split_once('/') {
                Some((base, step)) => (base, Some(step)),
                None => (item, None),
            };
            let base = match base.split_once('-') {
                Some((start, end)) => match (start.parse::<u8>(), end.parse::<u8>()) {
                    // Ranges ending on Sunday wrap around to the front
                    (Ok(0), Ok(7)) => "1-7".to_string(),
                    (Ok(start), Ok(7)) if step.is_none() && start <= 6 => {
                        return format!("{}-7,1", shift(start));
                    }
                    (Ok(start), Ok(end)) if end <= 7 => format!("{}-{}", shift(start), shift(end)),
                    _ => base.to_string(),
                },
                None => match base.parse::<u8>() {
                    Ok(n) if n <= 7 => shift(n).to_string(),
                    _ => base.to_string(),
                },
            };
            match step {
                Some(step) => format!("{}/{}", base, step),
                None => base,
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Cron schedule evaluated in a timezone
#[derive(Debug, Clone)]
pub struct CronTrigger {
    schedule: Schedule,
    zone: Zone,
}

impl CronTrigger {
    pub fn parse(expression: &str, zone: Zone) -> Result<Self> {
        let schedule = Schedule::from_str(&expand_expression(expression))
            .map_err(|e| LogError::InvalidSchedule(format!("{}: {}", expression, e)))?;
        Ok(Self { schedule, zone })
    }
}

impl Trigger for CronTrigger {
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.zone {
            Zone::Utc => self.schedule.after(&after).next(),
            Zone::Local => self
                .schedule
                .after(&after.with_timezone(&Local))
                .next()
                .map(|t| t.with_timezone(&Utc)),
            Zone::Named(tz) => self
                .schedule
                .after(&after.with_timezone(&tz))
                .next()
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Fires at a fixed interval
#[derive(Debug, Clone, Copy)]
pub struct IntervalTrigger(pub Duration);

impl Trigger for IntervalTrigger {
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.0.is_zero() {
            return None;
        }
        let step = chrono::Duration::from_std(self.0).ok()?;
        after.checked_add_signed(step)
    }
}
