//! Core library for packing rectangles into a fixed-size container.
//!
//! - Placement: greedy contact-score heuristic over a maintained set of free
//!   rectangles, with per-box rotation
//! - Classification: every queued box ends up placed, unplaced (no room) or
//!   rejected (can never fit); no engine operation fails
//! - Metric: `fullness` penalizes free space sealed off from the container
//!   boundary and ignores free space still reachable from it
//! - Data model is serde-serializable; report output lives in the CLI crate.
//!
//! Quick example:
//! ```
//! use boxpack_core::Packer;
//!
//! let mut packer = Packer::new(100.0, 100.0);
//! packer.add_box(50.0, 100.0, "left");
//! packer.add_box(50.0, 100.0, "right");
//!
//! assert_eq!(packer.pack().len(), 2);
//! assert_eq!(packer.fullness(), 1.0);
//! ```

mod fullness;
pub mod model;
pub mod packer;

pub use model::*;
pub use packer::*;

/// Convenience prelude for common types.
/// Importing `boxpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::model::{BoxSpec, PackStats, Placement, Rect};
    pub use crate::packer::Packer;
}
