use chrono::NaiveDate;
use tracing::debug;

use crate::models::{DoctorError, DoctorRecord};

/// Returns the doctors whose name or specialty contains `query`,
/// ignoring case. An empty query keeps the whole list. Order is preserved.
pub fn filter_doctors(doctors: &[DoctorRecord], query: &str) -> Vec<DoctorRecord> {
    if query.is_empty() {
        return doctors.to_vec();
    }

    let needle = query.to_lowercase();
    doctors
        .iter()
        .filter(|doctor| doctor.matches(&needle))
        .cloned()
        .collect()
}

/// Read-only doctor listing backing the booking page.
#[derive(Debug, Clone)]
pub struct DoctorDirectory {
    doctors: Vec<DoctorRecord>,
}

impl DoctorDirectory {
    pub fn new(doctors: Vec<DoctorRecord>) -> Self {
        Self { doctors }
    }

    /// Built-in sample listing used until real doctor data is wired in.
    pub fn sample() -> Self {
        Self::new(vec![
            DoctorRecord::new(1, "Dr. Sarah Johnson", "Cardiologist", date(2021, 5, 15), 150),
            DoctorRecord::new(2, "Dr. Mark Lee", "Dermatologist", date(2020, 8, 10), 85),
            DoctorRecord::new(3, "Dr. Emma Brown", "Pediatrician", date(2019, 3, 21), 120),
            DoctorRecord::new(4, "Dr. Jane Doe", "Neurosurgeon", date(2020, 3, 23), 100),
        ])
    }

    pub fn all(&self) -> &[DoctorRecord] {
        &self.doctors
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }

    pub fn get(&self, doctor_id: u32) -> Result<&DoctorRecord, DoctorError> {
        self.doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    pub fn search(&self, query: &str) -> Vec<DoctorRecord> {
        let results = filter_doctors(&self.doctors, query);
        debug!("Doctor search '{}' matched {} of {}", query, results.len(), self.doctors.len());
        results
    }
}

impl Default for DoctorDirectory {
    fn default() -> Self {
        Self::sample()
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    // Sample dates are compile-time constants and always valid.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_directory() {
        let directory = DoctorDirectory::sample();
        assert_eq!(directory.len(), 4);
        assert_eq!(directory.all()[0].name, "Dr. Sarah Johnson");
        assert_eq!(directory.get(4).unwrap().specialty, "Neurosurgeon");
        assert_eq!(directory.get(9), Err(DoctorError::NotFound(9)));
    }

    #[test]
    fn test_join_date_display() {
        let directory = DoctorDirectory::sample();
        assert_eq!(directory.get(1).unwrap().join_date_display(), "May 15, 2021");
        assert_eq!(directory.get(3).unwrap().join_date_display(), "March 21, 2019");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let directory = DoctorDirectory::sample();
        let results = directory.search("DERMA");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 2);
    }
}
