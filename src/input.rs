use glam::Vec2;
use hydro_core::config::{animations, AnimateAction, ClickAction, EffectConfig};
use hydro_core::PointerKind;

/// DOM pointer event type -> gesture event kind.
#[inline]
pub fn pointer_kind(event_type: &str) -> Option<PointerKind> {
    match event_type {
        "pointerdown" => Some(PointerKind::Down),
        "pointermove" => Some(PointerKind::Move),
        "pointerup" => Some(PointerKind::Up),
        "pointercancel" | "lostpointercapture" => Some(PointerKind::Cancel),
        _ => None,
    }
}

/// Follows the first pointer that went down; other pointers are dropped
/// until it lifts or is cancelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActivePointer {
    id: Option<i32>,
}

impl ActivePointer {
    /// Whether an event from `pointer_id` should reach the gesture tracker.
    pub fn accept(&mut self, kind: PointerKind, pointer_id: i32) -> bool {
        match (kind, self.id) {
            (PointerKind::Down, None) => {
                self.id = Some(pointer_id);
                true
            }
            (PointerKind::Down, Some(_)) => false,
            (PointerKind::Move, active) => active == Some(pointer_id),
            (PointerKind::Up | PointerKind::Cancel, active) if active == Some(pointer_id) => {
                self.id = None;
                true
            }
            _ => false,
        }
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }
}

/// Client (CSS px) position -> canvas backing-store px.
#[inline]
pub fn client_to_canvas_px(client: Vec2, rect_min: Vec2, rect_size: Vec2, backing: Vec2) -> Vec2 {
    if rect_size.x <= 0.0 || rect_size.y <= 0.0 {
        return Vec2::ZERO;
    }
    (client - rect_min) / rect_size * backing
}

/// Backing-store size for a canvas laid out at `css` px.
#[inline]
pub fn backing_size(css: Vec2, device_pixel_ratio: f64) -> (u32, u32) {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let w = (css.x as f64 * dpr) as u32;
    let h = (css.y as f64 * dpr) as u32;
    (w.max(1), h.max(1))
}

/// `Event.timeStamp` (ms, fractional) -> gesture timestamp.
#[inline]
pub fn event_time_ms(time_stamp: f64) -> u64 {
    if time_stamp.is_finite() && time_stamp > 0.0 {
        time_stamp as u64
    } else {
        0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Click(ClickAction),
    ToggleMorph,
    Shockwave,
}

#[inline]
pub fn key_action(key: &str) -> Option<KeyAction> {
    match key {
        "1" => Some(KeyAction::Click(ClickAction::Fluid)),
        "2" => Some(KeyAction::Click(ClickAction::Expand)),
        "3" => Some(KeyAction::Click(ClickAction::None)),
        "m" | "M" => Some(KeyAction::ToggleMorph),
        " " | "s" | "S" => Some(KeyAction::Shockwave),
        _ => None,
    }
}

/// Keyboard-selectable effect modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WebControls {
    pub click: ClickAction,
    pub morph: bool,
}

impl Default for WebControls {
    fn default() -> Self {
        Self {
            click: ClickAction::Fluid,
            morph: false,
        }
    }
}

impl WebControls {
    /// Returns true when the action changed the effect configuration.
    pub fn apply(&mut self, action: KeyAction) -> bool {
        match action {
            KeyAction::Click(click) if click != self.click => {
                self.click = click;
                true
            }
            KeyAction::ToggleMorph => {
                self.morph = !self.morph;
                true
            }
            _ => false,
        }
    }

    pub fn config(&self, density: f32) -> EffectConfig {
        let animate = if self.morph {
            AnimateAction::Morph
        } else {
            AnimateAction::None
        };
        EffectConfig::default()
            .with_animations(animations(self.click, animate))
            .with_density(density)
    }
}
