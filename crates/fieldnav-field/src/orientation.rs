use fieldnav_core::normalize_angle_deg;
use serde::{Deserialize, Serialize};

use crate::FieldFrame;

/// Turns compass azimuth readings into field headings.
///
/// `field heading = normalize(field_bearing - azimuth)`. The bearing starts
/// as the surveyed direction of +X and is re-anchored whenever a trusted
/// heading is known, which also absorbs compass bias.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldOrientation {
    field_bearing_deg: f64,
    azimuth_deg: f64,
}

impl FieldOrientation {
    pub fn new(field_bearing_deg: f64) -> Self {
        Self {
            field_bearing_deg,
            azimuth_deg: 0.0,
        }
    }

    pub fn from_frame(frame: &FieldFrame) -> Self {
        Self::new(frame.field_bearing_deg())
    }

    pub fn field_bearing_deg(&self) -> f64 {
        self.field_bearing_deg
    }

    pub fn set_field_bearing(&mut self, bearing_deg: f64) {
        self.field_bearing_deg = bearing_deg;
    }

    /// Record a new azimuth reading and return the field heading.
    pub fn update_azimuth(&mut self, azimuth_deg: f64) -> f64 {
        self.azimuth_deg = azimuth_deg;
        self.field_heading_deg()
    }

    pub fn field_heading_deg(&self) -> f64 {
        normalize_angle_deg(self.field_bearing_deg - self.azimuth_deg)
    }

    /// Declare the current field heading, shifting the bearing so the last
    /// azimuth reading maps onto it.
    pub fn set_current_field_heading(&mut self, heading_deg: f64) {
        self.field_bearing_deg = self.azimuth_deg + heading_deg;
    }
}
