pub mod window;

pub use window::{resolve_window, DateWindow};
