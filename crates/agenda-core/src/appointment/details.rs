use serde::{Deserialize, Serialize};

use crate::ids::{ContactId, UserId};

/// Descriptive payload carried alongside an appointment. The scheduling rules
/// never look inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub title: String,
    pub description: String,
    pub location: String,
    pub kind: String,
    pub contact_id: Option<ContactId>,
    pub user_id: Option<UserId>,
}
