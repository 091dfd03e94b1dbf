/// DirSleuth command-line frontend.
///
/// Turns flags into a `FilterCriteria`, runs the core scanner and renders
/// the result. The binary only sets up logging and calls [`run`].
pub mod app;
pub mod args;
pub mod render;

pub use app::run;
pub use args::Cli;
