pub mod controller;
pub mod countdown;

pub use controller::BreakController;
