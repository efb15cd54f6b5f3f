// src/lib.rs
pub mod activity;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod gesture;
pub mod landmarks;
pub mod mode;
pub mod plugins;
pub mod recorder;
pub mod session;
pub mod source;
pub mod tilt;

pub use config::Config;
pub use controller::{Controller, GestureEvent, Outcome, TickReport};
pub use error::{GestureError, Result};
pub use landmarks::{HandFrame, HandPresence, HandsSample, Side};
pub use source::{open_source, LandmarkSource};
