use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::time::{to_zone, tz_serde};

/// Operating hours of the organization, read on the wall clock of a fixed
/// reference zone no matter where the person booking sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    #[serde(with = "tz_serde")]
    zone: Tz,
    opens: NaiveTime,
    closes: NaiveTime,
}

impl BusinessHours {
    pub fn new(zone: Tz, opens: NaiveTime, closes: NaiveTime) -> Result<Self, DomainError> {
        if opens >= closes {
            return Err(DomainError::InvalidBusinessHours);
        }
        Ok(Self {
            zone,
            opens,
            closes,
        })
    }

    /// 08:00 to 22:00, US Eastern.
    pub fn eastern() -> Self {
        Self {
            zone: chrono_tz::America::New_York,
            opens: NaiveTime::from_hms_opt(8, 0, 0).expect("08:00 is a valid time"),
            closes: NaiveTime::from_hms_opt(22, 0, 0).expect("22:00 is a valid time"),
        }
    }

    /// Both boundaries are inclusive. Start and end are checked on their own
    /// against the same daily window; an interval crossing midnight is not
    /// treated specially.
    pub fn is_within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let (_, start_local) = to_zone(start, self.zone);
        let (_, end_local) = to_zone(end, self.zone);
        start_local >= self.opens && end_local <= self.closes
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn opens(&self) -> NaiveTime {
        self.opens
    }

    pub fn closes(&self) -> NaiveTime {
        self.closes
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self::eastern()
    }
}
