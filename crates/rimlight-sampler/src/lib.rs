//! rimlight-sampler — reduce one RGB24 frame to an ordered ring of border colors.
//!
//! The sampler traces the frame border clockwise starting at the bottom-right
//! corner, averaging a `depth`×`depth` pixel box at each step:
//!
//! ```text
//!        phase 3: left → right
//!       ┌──────────────────────┐
//!       │ ▲                  │ │
//!  ph 2 │ │                  │ │ phase 4
//!       │ │                  ▼ │
//!       └──────────────────────┘
//!        phase 1: right → left   ◄── start (bottom-right)
//! ```
//!
//! Output order is the physical order of LEDs on a strip wrapped around the
//! screen, so the [`SampleSequence`] can be streamed to hardware as-is.
//!
//! The computation is pure and synchronous: no allocation after construction
//! (when [`PerimeterSampler::sample_into`] is used), no IO, and the frame
//! buffer is only borrowed for the duration of one call.

mod average;
mod perimeter;
mod sequence;

pub use average::box_average;
pub use perimeter::PerimeterSampler;
pub use sequence::SampleSequence;
