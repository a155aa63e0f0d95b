//! Geometry extraction from ShapeSheet cells.

use stencil_core::Geometry;

/// Builds a [`Geometry`] from `(name, value)` cell pairs.
///
/// Recognized names are `PinX`, `PinY`, `Width` and `Height`; all others are
/// ignored. A value that does not parse to a finite number leaves the
/// component at its current value, so missing or broken cells fall back to
/// [`Geometry::default`]. When a name repeats the last parseable value wins.
///
/// # Examples
///
/// ```
/// use stencil_parser::geometry_from_cells;
///
/// let geometry = geometry_from_cells([("PinX", "4.25"), ("Width", "oops")]);
/// assert_eq!(geometry.x(), 4.25);
/// assert_eq!(geometry.width(), 100.0);
/// ```
pub fn geometry_from_cells<'a>(cells: impl IntoIterator<Item = (&'a str, &'a str)>) -> Geometry {
    cells
        .into_iter()
        .fold(Geometry::default(), |geometry, (name, value)| {
            let Some(value) = parse_finite(value) else {
                return geometry;
            };

            match name {
                "PinX" => geometry.with_x(value),
                "PinY" => geometry.with_y(value),
                "Width" => geometry.with_width(value),
                "Height" => geometry.with_height(value),
                _ => geometry,
            }
        })
}

fn parse_finite(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
