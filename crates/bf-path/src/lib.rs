//! bf-path: scan paths and the beam state machine.
//!
//! A scan path is a time-ordered list of beam commands (line scans and point
//! dwells). [`Path`] parses and time-indexes the commands; [`Beam`] answers
//! position/power queries against a caller-owned [`BeamState`] cursor.

pub mod beam;
pub mod error;
pub mod hatch;
pub mod path;
pub mod segment;

pub use beam::{Beam, BeamSettings, BeamState};
pub use error::{PathError, PathResult};
pub use hatch::{HatchPattern, SCAN_PATH_HEADER, format_scan_path, write_scan_path};
pub use path::Path;
pub use segment::{Segment, SegmentMode};
