pub mod appointment_service;
pub mod error;

pub use appointment_service::AppointmentService;
pub use error::AppError;
