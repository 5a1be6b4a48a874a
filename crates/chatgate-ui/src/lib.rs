pub mod progress;
pub mod prompt;
pub mod summary;

pub use progress::spinner;
