//! Keyboard-driven parameter panel.
//!
//! Every control is bound to one [`ParameterSet`] field with a range and a
//! step. Adjusting a control updates the parameter at once so per-frame
//! code sees it; regeneration only runs when the edit is finished.

use crate::params::{
    Color, ParameterSet, BRANCHES_RANGE, COUNT_RANGE, GRAVITY_RANGE, RADIUS_RANGE,
    RANDOMNESS_RANGE, SIZE_RANGE, SPIN_RANGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Count,
    Size,
    Radius,
    Branches,
    Spin,
    Randomness,
    Gravity,
    InsideColor(Channel),
    OutsideColor(Channel),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    pub name: &'static str,
    pub field: Field,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Control {
    const fn new(name: &'static str, field: Field, min: f64, max: f64, step: f64) -> Self {
        Self { name, field, min, max, step }
    }

    pub fn get(&self, params: &ParameterSet) -> f64 {
        match self.field {
            Field::Count => params.count as f64,
            Field::Size => params.size as f64,
            Field::Radius => params.radius as f64,
            Field::Branches => params.branches as f64,
            Field::Spin => params.spin as f64,
            Field::Randomness => params.randomness as f64,
            Field::Gravity => params.gravity as f64,
            Field::InsideColor(channel) => channel_byte(params.inside_color, channel) as f64,
            Field::OutsideColor(channel) => channel_byte(params.outside_color, channel) as f64,
        }
    }

    /// Snaps `value` to the step grid anchored at `min` and clamps it.
    pub fn constrain(&self, value: f64) -> f64 {
        let steps = ((value - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    pub fn set(&self, params: &mut ParameterSet, value: f64) {
        let value = self.constrain(value);
        match self.field {
            Field::Count => params.count = value.round() as u32,
            Field::Size => params.size = value as f32,
            Field::Radius => params.radius = value as f32,
            Field::Branches => params.branches = value.round() as u32,
            Field::Spin => params.spin = value as f32,
            Field::Randomness => params.randomness = value as f32,
            Field::Gravity => params.gravity = value as f32,
            Field::InsideColor(channel) => {
                params.inside_color = with_channel(params.inside_color, channel, value.round() as u8)
            }
            Field::OutsideColor(channel) => {
                params.outside_color = with_channel(params.outside_color, channel, value.round() as u8)
            }
        }
    }

    pub fn format(&self, params: &ParameterSet) -> String {
        let value = self.get(params);
        match self.field {
            Field::InsideColor(_) => format!("{}: {} ({})", self.name, value, params.inside_color),
            Field::OutsideColor(_) => format!("{}: {} ({})", self.name, value, params.outside_color),
            _ => {
                let decimals = decimals_for(self.step);
                format!("{}: {:.*}", self.name, decimals, value)
            }
        }
    }
}

const COLOR_STEP: f64 = 5.0;

pub const CONTROLS: [Control; 13] = [
    Control::new("count", Field::Count, COUNT_RANGE.0 as f64, COUNT_RANGE.1 as f64, 100.0),
    Control::new("size", Field::Size, SIZE_RANGE.0 as f64, SIZE_RANGE.1 as f64, 0.001),
    Control::new("radius", Field::Radius, RADIUS_RANGE.0 as f64, RADIUS_RANGE.1 as f64, 0.01),
    Control::new("branches", Field::Branches, BRANCHES_RANGE.0 as f64, BRANCHES_RANGE.1 as f64, 1.0),
    Control::new("spin", Field::Spin, SPIN_RANGE.0 as f64, SPIN_RANGE.1 as f64, 0.1),
    Control::new(
        "randomness",
        Field::Randomness,
        RANDOMNESS_RANGE.0 as f64,
        RANDOMNESS_RANGE.1 as f64,
        0.1,
    ),
    Control::new("gravity", Field::Gravity, GRAVITY_RANGE.0 as f64, GRAVITY_RANGE.1 as f64, 1.0),
    Control::new("insideColor.r", Field::InsideColor(Channel::Red), 0.0, 255.0, COLOR_STEP),
    Control::new("insideColor.g", Field::InsideColor(Channel::Green), 0.0, 255.0, COLOR_STEP),
    Control::new("insideColor.b", Field::InsideColor(Channel::Blue), 0.0, 255.0, COLOR_STEP),
    Control::new("outsideColor.r", Field::OutsideColor(Channel::Red), 0.0, 255.0, COLOR_STEP),
    Control::new("outsideColor.g", Field::OutsideColor(Channel::Green), 0.0, 255.0, COLOR_STEP),
    Control::new("outsideColor.b", Field::OutsideColor(Channel::Blue), 0.0, 255.0, COLOR_STEP),
];

pub struct ParameterPanel {
    controls: Vec<Control>,
    selected: usize,
    pending: bool,
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self {
            controls: CONTROLS.to_vec(),
            selected: 0,
            pending: false,
        }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn selected(&self) -> &Control {
        &self.controls[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.controls.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + self.controls.len() - 1) % self.controls.len();
    }

    /// Moves the selected control by `steps` increments. Returns whether
    /// the parameter changed.
    pub fn adjust(&mut self, params: &mut ParameterSet, steps: i32) -> bool {
        let control = self.controls[self.selected];
        let before = control.get(params);
        control.set(params, before + steps as f64 * control.step);

        let changed = control.get(params) != before;
        self.pending |= changed;
        changed
    }

    pub fn has_pending_change(&self) -> bool {
        self.pending
    }

    /// Commits the current edit. `on_finish` runs once if anything changed
    /// since the last commit.
    pub fn finish_change<F: FnOnce()>(&mut self, on_finish: F) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        on_finish();
        true
    }

    pub fn status(&self, params: &ParameterSet) -> String {
        format!(
            "[{}/{}] {}",
            self.selected + 1,
            self.controls.len(),
            self.selected().format(params)
        )
    }
}

fn channel_byte(color: Color, channel: Channel) -> u8 {
    let [r, g, b] = color.to_bytes();
    match channel {
        Channel::Red => r,
        Channel::Green => g,
        Channel::Blue => b,
    }
}

fn with_channel(color: Color, channel: Channel, value: u8) -> Color {
    let mut bytes = color.to_bytes();
    match channel {
        Channel::Red => bytes[0] = value,
        Channel::Green => bytes[1] = value,
        Channel::Blue => bytes[2] = value,
    }
    Color::from_bytes(bytes)
}

fn decimals_for(step: f64) -> usize {
    let mut decimals = 0;
    let mut scaled = step;
    while decimals < 6 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}
