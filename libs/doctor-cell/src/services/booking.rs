use std::collections::HashSet;

use crate::models::BookingState;

/// Per-card "Book Appointment now" toggles.
///
/// Purely a display affordance: pressing the button marks the card as
/// pending and nothing is sent or stored elsewhere.
#[derive(Debug, Default, Clone)]
pub struct BookingToggles {
    pending: HashSet<u32>,
}

impl BookingToggles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the card pending. Pressing it again keeps it pending.
    pub fn press(&mut self, doctor_id: u32) -> BookingState {
        self.pending.insert(doctor_id);
        BookingState::Pending
    }

    pub fn state(&self, doctor_id: u32) -> BookingState {
        if self.pending.contains(&doctor_id) {
            BookingState::Pending
        } else {
            BookingState::Idle
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_marks_pending() {
        let mut toggles = BookingToggles::new();
        assert_eq!(toggles.state(1), BookingState::Idle);
        assert_eq!(toggles.state(1).label(), "Book Appointment now");

        assert_eq!(toggles.press(1), BookingState::Pending);
        assert_eq!(toggles.state(1).label(), "Pending");
        assert_eq!(toggles.state(2), BookingState::Idle);

        toggles.press(1);
        assert_eq!(toggles.pending_count(), 1);
    }
}
