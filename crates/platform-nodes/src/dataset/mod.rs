//! Dataset adapter nodes

mod submit_data;

pub use submit_data::{SubmitDataConfig, SubmitDataError, SubmitDataTask};
