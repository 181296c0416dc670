use agenda_core::error::DomainError;
use agenda_ports::error::{FormError, PortError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("port error: {0}")]
    Port(#[from] PortError),
    #[error("form error: {0}")]
    Form(#[from] FormError),
}
