pub mod booking;
pub mod directory;
pub mod recommendation;
pub mod search;

pub use booking::BookingToggles;
pub use directory::{filter_doctors, DoctorDirectory};
pub use recommendation::RecommendationClient;
pub use search::SearchSession;
