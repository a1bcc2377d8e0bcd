use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How often an installment falls due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,
    // The twice-a-month pay cycle (quincena): 24 periods a year, 15 days apart.
    Biweekly,
    Monthly,
    Bimonthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Frequency {
    /// The number of periods in a calendar year. Per-period interest rates
    /// are the annual rate divided by this.
    pub fn periods_per_year(&self) -> u32 {
        match *self {
            Frequency::Weekly => 52,
            Frequency::Biweekly => 24,
            Frequency::Monthly => 12,
            Frequency::Bimonthly => 6,
            Frequency::Quarterly => 4,
            Frequency::Semiannual => 2,
            Frequency::Annual => 1,
        }
    }

    /// Returns the due date of period `index` (1-based).
    ///
    /// Every date is stepped from `first` rather than from the previous
    /// period's date. Month arithmetic clamps to the end of shorter months
    /// (Jan 31 + 1 month = Feb 28/29), and anchoring on `first` means the
    /// schedule returns to the 31st in longer months instead of drifting to
    /// the clamped day for good.
    ///
    /// `None` for index 0 or when the date leaves the supported calendar
    /// range.
    pub fn due_date(&self, first: NaiveDate, index: u32) -> Option<NaiveDate> {
        let steps = index.checked_sub(1)?;
        let month_steps = |span: u32| {
            span.checked_mul(steps)
                .and_then(|months| first.checked_add_months(Months::new(months)))
        };

        match *self {
            Frequency::Weekly => first.checked_add_days(Days::new(7 * u64::from(steps))),
            Frequency::Biweekly => first.checked_add_days(Days::new(15 * u64::from(steps))),
            Frequency::Monthly => month_steps(1),
            Frequency::Bimonthly => month_steps(2),
            Frequency::Quarterly => month_steps(3),
            Frequency::Semiannual => month_steps(6),
            Frequency::Annual => month_steps(12),
        }
    }
}
