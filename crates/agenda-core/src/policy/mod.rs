pub mod business_hours;
pub mod duration;

pub use business_hours::BusinessHours;
pub use duration::MinimumDuration;
