pub mod export;
pub mod mapping;
pub mod resolver;
pub mod tasks;
pub mod worker;
