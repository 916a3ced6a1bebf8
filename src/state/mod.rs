//! State module - filter selection and derived views

mod dashboard;
mod filter;

pub use dashboard::Dashboard;
