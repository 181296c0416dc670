pub mod appointment;
pub mod calendar;
pub mod error;
pub mod events;
pub mod ids;
pub mod overlap;
pub mod policy;
pub mod report;
pub mod time;
pub mod upcoming;
pub mod validation;
