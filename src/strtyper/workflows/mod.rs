mod tr;

pub use tr::{analyze, Params};
