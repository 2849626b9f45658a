pub mod core;
pub mod engine;
pub mod solvers;
pub mod worker;
