pub mod config;
pub mod country;
pub mod results;
