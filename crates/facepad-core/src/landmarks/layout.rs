//! Index layout of the 68-point iBUG landmark scheme
//!
//! - 0-16: jaw outline
//! - 17-21: right eyebrow
//! - 22-26: left eyebrow
//! - 27-35: nose
//! - 36-41: right eye
//! - 42-47: left eye
//! - 48-59: outer lip
//! - 60-67: inner lip

use std::ops::Range;

pub const POINT_COUNT: usize = 68;

pub const RIGHT_BROW: Range<usize> = 17..22;
pub const LEFT_BROW: Range<usize> = 22..27;
pub const RIGHT_EYE: Range<usize> = 36..42;
pub const LEFT_EYE: Range<usize> = 42..48;
pub const MOUTH: Range<usize> = 48..68;

pub const BROW_LEN: usize = 5;
pub const EYE_LEN: usize = 6;
pub const MOUTH_LEN: usize = 20;

// Offsets inside the mouth region (absolute index minus 48)
pub const MOUTH_LEFT_CORNER: usize = 0;
pub const MOUTH_RIGHT_CORNER: usize = 6;
pub const INNER_LIP_TOP: usize = 14;
pub const INNER_LIP_BOTTOM: usize = 18;
