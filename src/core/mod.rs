pub mod area;
pub mod calculator;
pub mod export;
pub mod poll;
pub mod session;
pub mod store;

pub use crate::domain::model::{AreaUnit, BoundaryPath, Coordinate, FarmProfile, ProfileId};
pub use crate::domain::ports::{PredictionApi, Storage};
pub use crate::utils::error::Result;
