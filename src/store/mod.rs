//! Stack file persistence and error reporting

pub mod diagnostics;
pub mod json;
pub mod rows;

pub use diagnostics::{JsonSyntaxError, StackFileError};
pub use json::{create_stack, load_stack, parse_stack, save_stack, to_json};
pub use rows::{export_rows, import_rows, read_rows, write_rows};
