
pub mod registry_tests;
pub mod reload_tests;
pub mod traits_tests;
