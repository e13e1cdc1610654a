//! Result stream: console lines, progress and result files

mod console;
mod event;
mod file;
mod progress;
mod report;

pub use console::*;
pub use event::*;
pub use file::*;
pub use progress::*;
pub use report::*;
