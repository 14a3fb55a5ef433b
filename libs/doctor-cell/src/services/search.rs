use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{
    BookingState, DoctorCard, DoctorError, DoctorRecord, RecommendationError,
    RecommendationOutcome,
};
use crate::services::booking::BookingToggles;
use crate::services::directory::DoctorDirectory;
use crate::services::recommendation::RecommendationClient;

/// State behind the appointment booking page: the active search query,
/// the doctor listing it filters, and the booking toggles.
pub struct SearchSession {
    directory: DoctorDirectory,
    recommender: RecommendationClient,
    query: RwLock<String>,
    bookings: RwLock<BookingToggles>,
    open: AtomicBool,
}

impl SearchSession {
    pub fn new(config: &AppConfig) -> Result<Self, RecommendationError> {
        Self::with_directory(config, DoctorDirectory::sample())
    }

    pub fn with_directory(
        config: &AppConfig,
        directory: DoctorDirectory,
    ) -> Result<Self, RecommendationError> {
        Ok(Self {
            directory,
            recommender: RecommendationClient::new(config)?,
            query: RwLock::new(String::new()),
            bookings: RwLock::new(BookingToggles::new()),
            open: AtomicBool::new(true),
        })
    }

    pub fn directory(&self) -> &DoctorDirectory {
        &self.directory
    }

    pub async fn query(&self) -> String {
        self.query.read().await.clone()
    }

    pub async fn set_query(&self, query: &str) {
        let mut current = self.query.write().await;
        *current = query.to_string();
    }

    /// Doctors matching the active query. Recomputed on every call.
    pub async fn results(&self) -> Vec<DoctorRecord> {
        let query = self.query().await;
        self.directory.search(&query)
    }

    /// Card views for `query`, or for the active query when `None`.
    pub async fn cards(&self, query: Option<&str>) -> Vec<DoctorCard> {
        let doctors = match query {
            Some(q) => self.directory.search(q),
            None => self.results().await,
        };
        let bookings = self.bookings.read().await;
        doctors
            .iter()
            .map(|d| DoctorCard::from_record(d, bookings.state(d.id)))
            .collect()
    }

    /// Runs the recommendation round trip and retargets the query.
    ///
    /// Failures are logged and leave the query as it was. A result that
    /// arrives after [`close`](Self::close) is dropped.
    pub async fn ask_recommendation(&self, problem: &str) -> RecommendationOutcome {
        let result = self.recommender.recommend(problem).await;

        if !self.is_open() {
            debug!("Search session closed, discarding recommendation result");
            return RecommendationOutcome::Discarded;
        }

        match result {
            Ok(RecommendationOutcome::Suggested(specialty)) => {
                info!("Recommendation set search query to {}", specialty);
                self.set_query(&specialty).await;
                RecommendationOutcome::Suggested(specialty)
            }
            Ok(RecommendationOutcome::Fallback(specialty)) => {
                warn!(
                    "Recommendation service returned no suggestion, using fallback {}",
                    specialty
                );
                self.set_query(&specialty).await;
                RecommendationOutcome::Fallback(specialty)
            }
            Ok(other) => other,
            Err(e) => {
                warn!("Failed to fetch doctor recommendation: {}", e);
                RecommendationOutcome::Unchanged
            }
        }
    }

    pub async fn book(&self, doctor_id: u32) -> Result<BookingState, DoctorError> {
        self.directory.get(doctor_id)?;
        let state = self.bookings.write().await.press(doctor_id);
        debug!("Booking toggle for doctor {} is now {:?}", doctor_id, state);
        Ok(state)
    }

    pub async fn booking_state(&self, doctor_id: u32) -> BookingState {
        self.bookings.read().await.state(doctor_id)
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
