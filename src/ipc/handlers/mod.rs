pub mod auth;
pub mod classes;
pub mod core;
pub mod evaluations;
pub mod students;
