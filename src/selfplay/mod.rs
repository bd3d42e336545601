pub mod example;
pub mod generator;
