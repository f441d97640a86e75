mod io_utils;
mod math;
mod readers;
mod util;

pub use io_utils::create_writer;
pub use math::median;
pub use readers::open_table_reader;
pub use util::{handle_error_and_exit, Result};
