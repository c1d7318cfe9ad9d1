//! Library side of the `wincache` command line tool.

pub mod logging;
pub mod script;
pub mod session;
pub mod summary;
