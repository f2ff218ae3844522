//! Transformations applied to a channel's history before modelling.
//!
//! # Example
//!
//! ```
//! use contact_forecast::transform::Winsorizer;
//!
//! let volumes = vec![10.0, 11.0, 9.0, 12.0, 10.0, 250.0, 11.0, 10.0];
//! let clipped = Winsorizer::default().apply_values(&volumes);
//! assert!(clipped[5] < 250.0);
//! ```

pub mod window;
pub mod winsorize;

pub use window::centered_moving_average;
pub use winsorize::{IqrFences, Winsorizer};
