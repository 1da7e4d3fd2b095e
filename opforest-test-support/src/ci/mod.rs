//! Test-run configuration read from the environment.

pub mod property_test_profile;
