pub mod debt;
pub mod user;
