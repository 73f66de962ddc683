use serde::Serialize;

use crate::units::points_to_emu;

/// Current placement of a page element, in EMU.
///
/// `width_emu`/`height_emu` are the rendered size, already multiplied by the
/// current scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementGeometry {
    pub scale_x: f64,
    pub scale_y: f64,
    pub shear_x: f64,
    pub shear_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub width_emu: f64,
    pub height_emu: f64,
}

impl ElementGeometry {
    /// Unit-scale geometry of the given rendered size at the origin
    pub fn unit_scale(width_emu: f64, height_emu: f64) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
            width_emu,
            height_emu,
        }
    }
}

/// Target position in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Requested geometry change; every field is optional
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryEdit {
    pub position: Option<Position>,
    /// Target width in points
    pub width: Option<f64>,
    /// Target height in points
    pub height: Option<f64>,
    /// Rotation in degrees
    pub rotation: Option<f64>,
    pub scale_proportionally: bool,
}

impl GeometryEdit {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.rotation.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyMode {
    Absolute,
}

/// Resulting transform in EMU, applied as a replacement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub apply_mode: ApplyMode,
    pub unit: crate::units::Unit,
    pub scale_x: f64,
    pub scale_y: f64,
    pub shear_x: f64,
    pub shear_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl AffineTransform {
    fn absolute(scale_x: f64, scale_y: f64, shear_x: f64, shear_y: f64, tx: f64, ty: f64) -> Self {
        Self {
            apply_mode: ApplyMode::Absolute,
            unit: crate::units::Unit::Emu,
            scale_x,
            scale_y,
            shear_x,
            shear_y,
            translate_x: tx,
            translate_y: ty,
        }
    }
}

/// Compose the new transform for `current` after applying `edit`.
///
/// Input is expected to be validated by the caller; the function is total.
pub fn compose(current: &ElementGeometry, edit: &GeometryEdit) -> AffineTransform {
    let (translate_x, translate_y) = match edit.position {
        Some(Position { x, y }) => (points_to_emu(x), points_to_emu(y)),
        None => (current.translate_x, current.translate_y),
    };

    let (scale_x, scale_y) = resize_scales(current, edit);

    match edit.rotation {
        Some(degrees) => {
            let radians = degrees.to_radians();
            let (s, c) = radians.sin_cos();
            AffineTransform::absolute(
                scale_x * c,
                scale_y * c,
                -scale_y * s,
                scale_x * s,
                translate_x,
                translate_y,
            )
        }
        None => AffineTransform::absolute(
            scale_x,
            scale_y,
            current.shear_x,
            current.shear_y,
            translate_x,
            translate_y,
        ),
    }
}

/// Axis scale factors after a resize; axes without a positive target keep their scale
fn resize_scales(current: &ElementGeometry, edit: &GeometryEdit) -> (f64, f64) {
    let target_x = edit.width.filter(|w| *w > 0.0);
    let target_y = edit.height.filter(|h| *h > 0.0);

    let new_x = target_x.map(|w| axis_scale(w, current.width_emu, current.scale_x));
    let new_y = target_y.map(|h| axis_scale(h, current.height_emu, current.scale_y));

    match (new_x, new_y) {
        (Some(x), Some(y)) => (x, y),
        (Some(x), None) if edit.scale_proportionally => (x, x),
        (None, Some(y)) if edit.scale_proportionally => (y, y),
        (x, y) => (x.unwrap_or(current.scale_x), y.unwrap_or(current.scale_y)),
    }
}

fn axis_scale(target_points: f64, rendered_emu: f64, current_scale: f64) -> f64 {
    let divisor = if current_scale == 0.0 {
        log::warn!("Degenerate transform with zero scale; treating current scale as 1");
        1.0
    } else {
        current_scale
    };
    let unscaled = rendered_emu / divisor;
    points_to_emu(target_points) / unscaled
}
