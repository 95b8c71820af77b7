pub mod assembler;
pub mod config;
pub mod power;
pub mod repositories;
