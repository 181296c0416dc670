use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;

use agenda_core::policy::{BusinessHours, MinimumDuration};
use agenda_core::time::{parse_time_of_day, parse_zone};
use agenda_core::upcoming::UpcomingAppointmentFinder;
use agenda_core::validation::ScheduleValidator;

/// Longest minimum duration or lookahead accepted from the environment (one day).
const MAX_WINDOW_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,

    // Zone the caller reads and enters wall-clock times in
    pub user_zone: Tz,

    // Business hours are always judged in this zone, whatever the caller uses
    pub business_zone: Tz,
    pub business_open: NaiveTime,
    pub business_close: NaiveTime,

    pub min_duration_minutes: i64,
    pub lookahead_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env if present, ignore if missing
        Self::from_getter(|key| env::var(key).ok())
    }

    /// Parse config from a custom getter function (for testing)
    pub fn from_getter<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            database_url: get("AGENDA_DATABASE_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "sqlite://agenda.db?mode=rwc".to_string()),

            user_zone: parse_zone(&get("AGENDA_USER_TZ").unwrap_or_else(|| "UTC".to_string()))
                .context("AGENDA_USER_TZ must be an IANA zone name")?,

            business_zone: parse_zone(
                &get("AGENDA_BUSINESS_TZ").unwrap_or_else(|| "America/New_York".to_string()),
            )
            .context("AGENDA_BUSINESS_TZ must be an IANA zone name")?,
            business_open: parse_time_of_day(
                &get("AGENDA_BUSINESS_OPEN").unwrap_or_else(|| "08:00".to_string()),
            )
            .context("AGENDA_BUSINESS_OPEN must be HH:MM")?,
            business_close: parse_time_of_day(
                &get("AGENDA_BUSINESS_CLOSE").unwrap_or_else(|| "22:00".to_string()),
            )
            .context("AGENDA_BUSINESS_CLOSE must be HH:MM")?,

            min_duration_minutes: get("AGENDA_MIN_DURATION_MINUTES")
                .unwrap_or_else(|| "15".to_string())
                .parse()
                .context("AGENDA_MIN_DURATION_MINUTES must be a whole number of minutes")?,
            lookahead_minutes: get("AGENDA_LOOKAHEAD_MINUTES")
                .unwrap_or_else(|| "15".to_string())
                .parse()
                .context("AGENDA_LOOKAHEAD_MINUTES must be a whole number of minutes")?,
        })
    }

    /// Validate configuration values at startup.
    /// Returns Ok(()) if all validations pass, or Err listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.business_open >= self.business_close {
            errors.push(format!(
                "AGENDA_BUSINESS_OPEN ({}) must be earlier than AGENDA_BUSINESS_CLOSE ({}).",
                self.business_open.format("%H:%M"),
                self.business_close.format("%H:%M")
            ));
        }

        for (key, minutes) in [
            ("AGENDA_MIN_DURATION_MINUTES", self.min_duration_minutes),
            ("AGENDA_LOOKAHEAD_MINUTES", self.lookahead_minutes),
        ] {
            if minutes <= 0 {
                errors.push(format!("{key} must be greater than 0."));
            } else if minutes > MAX_WINDOW_MINUTES {
                errors.push(format!(
                    "{key}={minutes} is too long (max: {MAX_WINDOW_MINUTES})."
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )
        }
    }

    pub fn validator(&self) -> Result<ScheduleValidator> {
        let hours = BusinessHours::new(self.business_zone, self.business_open, self.business_close)
            .context("invalid business hours")?;
        let min = MinimumDuration::minutes(self.min_duration_minutes)
            .context("invalid minimum duration")?;
        Ok(ScheduleValidator::new(hours, min))
    }

    pub fn finder(&self) -> Result<UpcomingAppointmentFinder> {
        UpcomingAppointmentFinder::minutes(self.lookahead_minutes).context("invalid lookahead")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;

    fn from_map(map: &HashMap<&str, &str>) -> Result<Config> {
        Config::from_getter(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_match_reference_rules() {
        let config = from_map(&HashMap::new()).expect("defaults should parse");

        assert_eq!(config.database_url, "sqlite://agenda.db?mode=rwc");
        assert_eq!(config.user_zone, Tz::UTC);
        assert_eq!(config.business_zone, chrono_tz::America::New_York);
        assert_eq!(config.business_open, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(config.business_close, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(config.min_duration_minutes, 15);
        assert_eq!(config.lookahead_minutes, 15);
        assert!(config.validate().is_ok());

        let validator = config.validator().unwrap();
        assert_eq!(validator.business_hours(), &BusinessHours::eastern());
        assert_eq!(validator.min_duration().duration(), Duration::minutes(15));
        assert_eq!(config.finder().unwrap().lookahead(), Duration::minutes(15));
    }

    #[test]
    fn custom_values_are_read() {
        let mut env = HashMap::new();
        env.insert("AGENDA_DATABASE_URL", "sqlite::memory:");
        env.insert("AGENDA_USER_TZ", "Europe/London");
        env.insert("AGENDA_BUSINESS_OPEN", "09:30");
        env.insert("AGENDA_LOOKAHEAD_MINUTES", "30");
        let config = from_map(&env).expect("should parse");

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.user_zone, chrono_tz::Europe::London);
        assert_eq!(config.business_open, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(config.lookahead_minutes, 30);
    }

    #[test]
    fn empty_database_url_uses_default() {
        let mut env = HashMap::new();
        env.insert("AGENDA_DATABASE_URL", "");
        let config = from_map(&env).expect("should parse");
        assert_eq!(config.database_url, "sqlite://agenda.db?mode=rwc");
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let mut env = HashMap::new();
        env.insert("AGENDA_USER_TZ", "Mars/Olympus_Mons");
        let err = from_map(&env).unwrap_err().to_string();
        assert!(err.contains("AGENDA_USER_TZ"), "error should mention AGENDA_USER_TZ: {}", err);
    }

    #[test]
    fn malformed_time_is_rejected() {
        let mut env = HashMap::new();
        env.insert("AGENDA_BUSINESS_CLOSE", "10pm");
        let err = from_map(&env).unwrap_err().to_string();
        assert!(err.contains("AGENDA_BUSINESS_CLOSE"), "{}", err);
    }

    #[test]
    fn non_numeric_duration_is_rejected() {
        let mut env = HashMap::new();
        env.insert("AGENDA_MIN_DURATION_MINUTES", "quarter");
        let err = from_map(&env).unwrap_err().to_string();
        assert!(err.contains("AGENDA_MIN_DURATION_MINUTES"), "{}", err);
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut env = HashMap::new();
        env.insert("AGENDA_BUSINESS_OPEN", "22:00");
        env.insert("AGENDA_BUSINESS_CLOSE", "08:00");
        env.insert("AGENDA_MIN_DURATION_MINUTES", "0");
        env.insert("AGENDA_LOOKAHEAD_MINUTES", "-5");
        let config = from_map(&env).expect("values parse even when invalid");

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("AGENDA_BUSINESS_OPEN"), "{}", err);
        assert!(err.contains("AGENDA_MIN_DURATION_MINUTES"), "{}", err);
        assert!(err.contains("AGENDA_LOOKAHEAD_MINUTES"), "{}", err);
        assert!(config.validator().is_err());
        assert!(config.finder().is_err());
    }

    #[test]
    fn oversized_minutes_fail_validation_without_panicking() {
        let mut env = HashMap::new();
        env.insert("AGENDA_MIN_DURATION_MINUTES", "9223372036854775807");
        env.insert("AGENDA_LOOKAHEAD_MINUTES", "100000000000000");
        let config = from_map(&env).expect("values parse even when invalid");

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("AGENDA_MIN_DURATION_MINUTES=9223372036854775807"), "{}", err);
        assert!(err.contains("AGENDA_LOOKAHEAD_MINUTES=100000000000000"), "{}", err);
        assert!(config.validator().is_err());

        // Representable but huge: the finder builds and its window saturates.
        let finder = config.finder().unwrap();
        let now = chrono::Utc::now();
        assert_eq!(finder.window(now).0, now);
    }

    #[test]
    fn one_day_is_the_longest_accepted_window() {
        let mut env = HashMap::new();
        env.insert("AGENDA_MIN_DURATION_MINUTES", "1440");
        env.insert("AGENDA_LOOKAHEAD_MINUTES", "1441");
        let config = from_map(&env).expect("should parse");

        let err = config.validate().unwrap_err().to_string();
        assert!(!err.contains("AGENDA_MIN_DURATION_MINUTES"), "{}", err);
        assert!(err.contains("AGENDA_LOOKAHEAD_MINUTES=1441"), "{}", err);
    }
}
