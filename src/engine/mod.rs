pub mod evaluator;
pub mod heuristic;
pub mod sim;
