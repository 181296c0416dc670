use std::collections::BTreeMap;

use crate::appointment::Appointment;
use crate::calendar::ViewRange;

/// Number of appointments per type among those starting inside `range`.
pub fn count_by_kind(appointments: &[Appointment], range: &ViewRange) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for appt in appointments.iter().filter(|a| range.contains(a.start())) {
        *counts.entry(appt.details().kind.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn count_starting_in(appointments: &[Appointment], range: &ViewRange) -> usize {
    appointments
        .iter()
        .filter(|a| range.contains(a.start()))
        .count()
}
