use {
    super::{
        BiddingSession,
        SessionPhase,
        SessionStatus,
    },
    std::str::FromStr,
    time::{
        Date,
        Duration,
        Month,
        OffsetDateTime,
        PrimitiveDateTime,
        Time,
        UtcOffset,
    },
};

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarvestPeriodError {
    #[error("unrecognized harvest period {0:?}, expected YYYY-MM or <Month> YYYY")]
    Unrecognized(String),
    #[error("harvest period {0:?} is out of range")]
    OutOfRange(String),
}

/// The calendar month in which a lot is harvested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestPeriod {
    pub year:  i32,
    pub month: Month,
}

fn parse_year(value: &str) -> Option<i32> {
    if value.len() != 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn parse_month_name(value: &str) -> Option<Month> {
    let value = value.to_lowercase();
    MONTHS.into_iter().find(|month| {
        let name = month.to_string().to_lowercase();
        name == value || (value.len() == 3 && name.starts_with(&value))
    })
}

impl FromStr for HarvestPeriod {
    type Err = HarvestPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let unrecognized = || HarvestPeriodError::Unrecognized(s.to_string());

        if let Some((year, month)) = input.split_once('-') {
            let year = parse_year(year).ok_or_else(unrecognized)?;
            if month.is_empty() || month.len() > 2 || !month.chars().all(|c| c.is_ascii_digit())
            {
                return Err(unrecognized());
            }
            let month: u8 = month.parse().map_err(|_| unrecognized())?;
            let month = Month::try_from(month)
                .map_err(|_| HarvestPeriodError::OutOfRange(s.to_string()))?;
            return Ok(Self { year, month });
        }

        let mut parts = input.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(month), Some(year), None) => Ok(Self {
                year:  parse_year(year).ok_or_else(unrecognized)?,
                month: parse_month_name(month).ok_or_else(unrecognized)?,
            }),
            _ => Err(unrecognized()),
        }
    }
}

impl HarvestPeriod {
    /// Last representable instant of the month in the given offset, returned in UTC.
    ///
    /// Precision is microseconds so the value survives a round trip through Postgres.
    pub fn end_time(&self, offset: UtcOffset) -> Result<OffsetDateTime, HarvestPeriodError> {
        let out_of_range =
            |_| HarvestPeriodError::OutOfRange(format!("{} {}", self.month, self.year));
        let last_day = self.month.length(self.year);
        let date = Date::from_calendar_date(self.year, self.month, last_day).map_err(out_of_range)?;
        let time = Time::from_hms_micro(23, 59, 59, 999_999).map_err(out_of_range)?;
        Ok(PrimitiveDateTime::new(date, time)
            .assume_offset(offset)
            .to_offset(UtcOffset::UTC))
    }
}

impl BiddingSession {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.end_time
    }

    /// Bids are accepted up to and including the end instant.
    pub fn is_accepting_bids_at(&self, now: OffsetDateTime) -> bool {
        self.status == SessionStatus::Ongoing && !self.is_expired_at(now)
    }

    /// Whether the session shows up among the active listings.
    pub fn is_listed_at(&self, now: OffsetDateTime) -> bool {
        self.status == SessionStatus::Ongoing && self.end_time > now
    }

    pub fn remaining_time(&self, now: OffsetDateTime) -> Duration {
        (self.end_time - now).max(Duration::ZERO)
    }

    pub fn phase_at(&self, now: OffsetDateTime) -> SessionPhase {
        match self.status {
            SessionStatus::Stopped => SessionPhase::Stopped,
            SessionStatus::Ongoing if self.is_expired_at(now) => SessionPhase::Ended,
            SessionStatus::Ongoing => SessionPhase::Ongoing,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        time::macros::{
            datetime,
            offset,
        },
    };

    #[test]
    fn test_parse_numeric_period() {
        assert_eq!(
            "2025-03".parse::<HarvestPeriod>(),
            Ok(HarvestPeriod {
                year:  2025,
                month: Month::March,
            })
        );
        assert_eq!(
            " 2024-12 ".parse::<HarvestPeriod>().map(|p| p.month),
            Ok(Month::December)
        );
    }

    #[test]
    fn test_parse_named_period() {
        assert_eq!(
            "March 2025".parse::<HarvestPeriod>(),
            Ok(HarvestPeriod {
                year:  2025,
                month: Month::March,
            })
        );
        assert_eq!(
            "sep 2026".parse::<HarvestPeriod>().map(|p| p.month),
            Ok(Month::September)
        );
        assert_eq!(
            "FEBRUARY 2028".parse::<HarvestPeriod>().map(|p| p.month),
            Ok(Month::February)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "2025", "2025-13", "2025-00", "25-03", "Marc 2025", "March", "March 2025 x"] {
            assert!(input.parse::<HarvestPeriod>().is_err(), "{input} parsed");
        }
        assert_eq!(
            "2025-13".parse::<HarvestPeriod>(),
            Err(HarvestPeriodError::OutOfRange("2025-13".to_string()))
        );
    }

    #[test]
    fn test_end_time_is_last_instant_of_month() {
        let period: HarvestPeriod = "2025-03".parse().unwrap();
        assert_eq!(
            period.end_time(offset!(+5:30)).unwrap(),
            datetime!(2025-03-31 18:29:59.999999 UTC)
        );
        assert_eq!(
            period.end_time(UtcOffset::UTC).unwrap(),
            datetime!(2025-03-31 23:59:59.999999 UTC)
        );
    }

    #[test]
    fn test_end_time_handles_leap_february() {
        let period: HarvestPeriod = "February 2024".parse().unwrap();
        assert_eq!(
            period.end_time(UtcOffset::UTC).unwrap(),
            datetime!(2024-02-29 23:59:59.999999 UTC)
        );
    }

    #[test]
    fn test_phase_is_derived_from_time() {
        let end_time = datetime!(2025-03-31 18:29:59.999999 UTC);
        let mut session = BiddingSession::new(
            "lot-1".to_string(),
            100,
            datetime!(2025-03-01 00:00 UTC),
            end_time,
        );

        assert_eq!(session.phase_at(end_time), SessionPhase::Ongoing);
        assert!(session.is_accepting_bids_at(end_time));
        assert!(!session.is_listed_at(end_time));

        let later = end_time + Duration::microseconds(1);
        assert_eq!(session.phase_at(later), SessionPhase::Ended);
        assert!(!session.is_accepting_bids_at(later));
        assert_eq!(session.remaining_time(later), Duration::ZERO);

        session.stop(datetime!(2025-03-10 00:00 UTC));
        assert_eq!(session.phase_at(datetime!(2025-03-11 00:00 UTC)), SessionPhase::Stopped);
    }
}
