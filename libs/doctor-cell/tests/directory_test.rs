use chrono::NaiveDate;

use doctor_cell::models::DoctorRecord;
use doctor_cell::services::{filter_doctors, DoctorDirectory};

fn doctor(id: u32, name: &str, specialty: &str) -> DoctorRecord {
    DoctorRecord::new(id, name, specialty, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 0)
}

fn expected_matches(doctors: &[DoctorRecord], query: &str) -> Vec<u32> {
    let q = query.to_lowercase();
    doctors
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&q) || d.specialty.to_lowercase().contains(&q))
        .map(|d| d.id)
        .collect()
}

#[test]
fn test_empty_query_returns_everything_in_order() {
    let directory = DoctorDirectory::sample();
    let results = filter_doctors(directory.all(), "");

    assert_eq!(results, directory.all().to_vec());
}

#[test]
fn test_matches_name_or_specialty_case_insensitively() {
    let directory = DoctorDirectory::sample();

    let by_name: Vec<u32> = filter_doctors(directory.all(), "emma").iter().map(|d| d.id).collect();
    assert_eq!(by_name, vec![3]);

    let by_specialty: Vec<u32> = filter_doctors(directory.all(), "cardio").iter().map(|d| d.id).collect();
    assert_eq!(by_specialty, vec![1]);

    let shared_fragment: Vec<u32> = filter_doctors(directory.all(), "DR.").iter().map(|d| d.id).collect();
    assert_eq!(shared_fragment, vec![1, 2, 3, 4]);
}

#[test]
fn test_substring_not_fuzzy() {
    let directory = DoctorDirectory::sample();

    // Tokens out of order or misspelled do not match.
    assert!(filter_doctors(directory.all(), "Johnson Sarah").is_empty());
    assert!(filter_doctors(directory.all(), "Cardiolgist").is_empty());
    assert!(filter_doctors(directory.all(), "xyz").is_empty());
}

#[test]
fn test_filter_matches_reference_for_many_queries() {
    let doctors = vec![
        doctor(1, "Dr. Ana Ortiz", "Oncologist"),
        doctor(2, "Dr. Lee Park", "Dermatologist"),
        doctor(3, "Dr. Olu Adeyemi", "Orthopedist"),
        doctor(4, "Dr. Mia Logan", "Neurologist"),
        doctor(5, "Dr. Ravi Shah", "Ophthalmologist"),
    ];
    let queries = [
        "", "o", "O", "logist", "LOGIST", "dr", "Dr. L", "park", "ortho", "ist", " ", "z", "Mia Logan",
    ];

    for query in queries {
        let got: Vec<u32> = filter_doctors(&doctors, query).iter().map(|d| d.id).collect();
        assert_eq!(got, expected_matches(&doctors, query), "query: {:?}", query);
    }
}

#[test]
fn test_filter_is_idempotent() {
    let directory = DoctorDirectory::sample();

    for query in ["", "dr", "ologist", "Lee", "nothing"] {
        let once = filter_doctors(directory.all(), query);
        let twice = filter_doctors(&once, query);
        assert_eq!(once, twice, "query: {:?}", query);
    }
}

#[test]
fn test_filter_on_empty_list() {
    assert!(filter_doctors(&[], "").is_empty());
    assert!(filter_doctors(&[], "dr").is_empty());
}
