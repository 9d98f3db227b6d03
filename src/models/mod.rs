pub mod activity;
pub mod raw;
pub mod week;

pub use activity::{Activity, WorkoutKind};
pub use raw::{AthleteRef, RawActivity};
pub use week::WeekBucket;
