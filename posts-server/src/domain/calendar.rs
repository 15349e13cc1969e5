use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Inclusive `[start, end]` range of instants covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DayWindow {
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
}

impl DayWindow {
    #[cfg(test)]
    pub(crate) fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Start and end of `date` in `offset`, expressed in UTC.
/// `end` is one microsecond before the next local midnight, the finest
/// precision Postgres keeps for `timestamptz`.
pub(crate) fn day_window(date: NaiveDate, offset: FixedOffset) -> DayWindow {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let utc_midnight = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
    let start = Utc.from_utc_datetime(&utc_midnight);
    let end = start + Duration::days(1) - Duration::microseconds(1);

    DayWindow { start, end }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Calendar {
    offset: FixedOffset,
    clock: fn() -> DateTime<Utc>,
}

impl Calendar {
    pub(crate) fn new(offset: FixedOffset) -> Self {
        Self::with_clock(offset, Utc::now)
    }

    pub(crate) fn with_clock(offset: FixedOffset, clock: fn() -> DateTime<Utc>) -> Self {
        Self { offset, clock }
    }

    pub(crate) fn today(&self) -> DayWindow {
        self.days_ago(0)
    }

    pub(crate) fn yesterday(&self) -> DayWindow {
        self.days_ago(1)
    }

    fn days_ago(&self, days: i64) -> DayWindow {
        let local_today = (self.clock)().with_timezone(&self.offset).date_naive();
        day_window(local_today - Duration::days(days), self.offset)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}
