pub mod actions;
pub mod domain;
