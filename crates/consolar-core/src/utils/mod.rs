pub mod validation;

pub use validation::{validate_file_exists, validate_not_empty, validate_positive_int};
