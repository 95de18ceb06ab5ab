//! Pointer and keyboard handling for the gauge
//!
//! The pointer drives an explicit state machine:
//!
//! ```text
//! Idle --down inside rect--> Moving --move--> Moving
//! Idle --down near edge----> Resizing(edge) --move--> Resizing(edge)
//! any  --up----------------> Idle
//! ```
//!
//! Every other (state, event) pair is a no-op. Key commands adjust rotation
//! and the ridge pattern without touching the pointer state.

use crate::config::GaugeConfig;
use crate::gauge::state::GaugeState;
use serde::{Deserialize, Serialize};

/// Rectangle edge owned by a resize drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// Hit-test order; near a corner the first edge in this list wins
    pub const HIT_ORDER: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];
}

/// Pointer state of the gauge
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Dragging the whole rectangle; offset is pointer minus `(x1, y1)` at grab time
    Moving { offset_x: f64, offset_y: f64 },
    Resizing(Edge),
}

/// Pointer input in working-frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
}

/// Discrete adjustment of rotation or the ridge pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCommand {
    Rotate,
    FewerRidges,
    MoreRidges,
    LowerAmplitude,
    RaiseAmplitude,
    PhaseBackward,
    PhaseForward,
}

/// What a key press means to the surrounding measurement loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Adjust(KeyCommand),
    /// Accept the gauge as positioned
    Validate,
    /// Abandon the measurement
    Cancel,
}

impl KeyAction {
    /// Default keyboard layout
    pub fn from_key(key: char) -> Option<Self> {
        let action = match key {
            'r' => Self::Adjust(KeyCommand::Rotate),
            'j' => Self::Adjust(KeyCommand::FewerRidges),
            'l' => Self::Adjust(KeyCommand::MoreRidges),
            'k' => Self::Adjust(KeyCommand::LowerAmplitude),
            'i' => Self::Adjust(KeyCommand::RaiseAmplitude),
            'u' => Self::Adjust(KeyCommand::PhaseBackward),
            'o' => Self::Adjust(KeyCommand::PhaseForward),
            'v' => Self::Validate,
            '\u{1b}' => Self::Cancel,
            _ => return None,
        };
        Some(action)
    }
}

/// Gauge overlay with its pointer state machine
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    state: GaugeState,
    interaction: Interaction,
    edge_hit_threshold: f64,
    adjust_step: f64,
    rotation_step_deg: f64,
    frame_width: u32,
    frame_height: u32,
}

impl Gauge {
    /// Create a gauge over a `frame_width x frame_height` working buffer
    pub fn new(config: &GaugeConfig, frame_width: u32, frame_height: u32) -> Self {
        Self::with_state(GaugeState::from_config(config), config, frame_width, frame_height)
    }

    /// Resume from an existing state; only the thresholds and steps of `config` are used
    pub fn with_state(
        state: GaugeState,
        config: &GaugeConfig,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            state,
            interaction: Interaction::Idle,
            edge_hit_threshold: config.edge_hit_threshold,
            adjust_step: config.adjust_step,
            rotation_step_deg: config.rotation_step_deg,
            frame_width,
            frame_height,
        }
    }

    pub fn state(&self) -> &GaugeState {
        &self.state
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Size of the working buffer the gauge is drawn on
    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Resolve what a press at `(x, y)` grabs: an edge first, then the interior
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Interaction> {
        let s = &self.state;
        let edge = Edge::HIT_ORDER.into_iter().find(|edge| {
            let distance = match edge {
                Edge::Left => (x - s.x1()).abs(),
                Edge::Right => (x - s.x2()).abs(),
                Edge::Top => (y - s.y1()).abs(),
                Edge::Bottom => (y - s.y2()).abs(),
            };
            distance < self.edge_hit_threshold
        });

        if let Some(edge) = edge {
            return Some(Interaction::Resizing(edge));
        }
        if s.contains(x, y) {
            return Some(Interaction::Moving {
                offset_x: x - s.x1(),
                offset_y: y - s.y1(),
            });
        }
        None
    }

    /// Apply one pointer event
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match (self.interaction, event) {
            (Interaction::Idle, PointerEvent::Down { x, y }) => {
                if let Some(next) = self.hit_test(x, y) {
                    tracing::trace!(?next, x, y, "gauge grabbed");
                    self.interaction = next;
                }
            }
            (Interaction::Moving { offset_x, offset_y }, PointerEvent::Move { x, y }) => {
                let dx = x - (self.state.x1() + offset_x);
                let dy = y - (self.state.y1() + offset_y);
                self.state.translate(dx, dy);
            }
            (Interaction::Resizing(edge), PointerEvent::Move { x, y }) => match edge {
                Edge::Left => self.state.set_x1(x),
                Edge::Right => self.state.set_x2(x),
                Edge::Top => self.state.set_y1(y),
                Edge::Bottom => self.state.set_y2(y),
            },
            (_, PointerEvent::Up { .. }) => {
                self.interaction = Interaction::Idle;
            }
            _ => {}
        }
    }

    /// Apply one key command; pointer state is left as is
    pub fn handle_key(&mut self, command: KeyCommand) {
        let step = self.adjust_step;
        match command {
            KeyCommand::Rotate => self.state.rotate(self.rotation_step_deg),
            KeyCommand::FewerRidges => self.state.adjust_ridge_count(-step),
            KeyCommand::MoreRidges => self.state.adjust_ridge_count(step),
            KeyCommand::LowerAmplitude => self.state.adjust_amplitude(-step),
            KeyCommand::RaiseAmplitude => self.state.adjust_amplitude(step),
            KeyCommand::PhaseBackward => self.state.adjust_phase(-step),
            KeyCommand::PhaseForward => self.state.adjust_phase(step),
        }
    }

    /// Overlay caption shown while adjusting
    pub fn status_line(&self) -> String {
        format!(
            "Ridges: {:.1} | Amp: {:.1} | Angle: {}",
            self.state.ridge_count(),
            self.state.amplitude(),
            self.state.angle_deg()
        )
    }
}
