pub mod cli;
pub mod commands;
pub mod strtyper;
pub mod utils;
