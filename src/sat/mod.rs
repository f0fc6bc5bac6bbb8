#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod clause;
pub mod cnf;
pub mod dimacs;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod literal;
pub mod observer;
pub mod parallel;
pub mod restarter;
pub mod solver;
pub mod variable_selection;
