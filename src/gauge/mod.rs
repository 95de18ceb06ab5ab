//! Interactive measurement gauge
//!
//! A rotatable rectangle whose two long edges carry a sinusoidal ridge
//! pattern. The user lines the rectangle up with the thread flanks and the
//! sinusoid up with the thread crests; the rectangle height then spans the
//! major diameter and the width spans `ridge_count` pitches.
//!
//! Rendering is done elsewhere: this module only holds the state, applies
//! input events to it, and exposes the geometry a renderer needs.

pub mod interaction;
pub mod state;

pub use interaction::{Edge, Gauge, Interaction, KeyAction, KeyCommand, PointerEvent};
pub use state::{GaugeMetrics, GaugeState, RidgeBoundary};
