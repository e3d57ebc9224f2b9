pub mod allergy;
pub mod catalog;
pub mod countdown;
pub mod error;
pub mod meal;
pub mod normalize;
pub mod school;

pub use catalog::{RegionCode, SchoolLevel};
pub use countdown::{LunchCountdown, LunchWindow, lunch_countdown};
pub use error::QueryError;
pub use meal::{MealRecord, NormalizedMenuLine};
pub use normalize::{normalize, normalize_dish};
pub use school::{SchoolCandidate, SchoolQuery};
