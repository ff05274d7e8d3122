//! Fixed flight-category colours shared by tiles and grid cells.

use wx_common::FlightCategory;

use crate::png::Rgba;

/// Opacity of every painted pixel.
pub const OVERLAY_ALPHA: u8 = 140;

/// Fully transparent; unpainted pixels.
pub const TRANSPARENT: Rgba = (0, 0, 0, 0);

/// RGB for a category; `None` for `Unknown`, which is never painted.
pub fn category_rgb(category: FlightCategory) -> Option<(u8, u8, u8)> {
    match category {
        FlightCategory::Lifr => Some((255, 0, 255)),
        FlightCategory::Ifr => Some((255, 0, 0)),
        FlightCategory::Mvfr => Some((85, 153, 255)),
        FlightCategory::Vfr => Some((0, 255, 0)),
        FlightCategory::Unknown => None,
    }
}

/// Overlay RGBA for a category.
pub fn category_rgba(category: FlightCategory) -> Option<Rgba> {
    category_rgb(category).map(|(r, g, b)| (r, g, b, OVERLAY_ALPHA))
}

/// `#rrggbb` for vector output.
pub fn category_hex(category: FlightCategory) -> Option<String> {
    category_rgb(category).map(|(r, g, b)| format!("#{:02x}{:02x}{:02x}", r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories_are_distinct() {
        let colors: Vec<Rgba> = FlightCategory::KNOWN
            .iter()
            .filter_map(|&c| category_rgba(c))
            .collect();
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            assert_eq!(a.3, OVERLAY_ALPHA);
            assert!(colors[i + 1..].iter().all(|b| b != a));
        }
    }

    #[test]
    fn test_unknown_unpainted() {
        assert!(category_rgba(FlightCategory::Unknown).is_none());
        assert!(category_hex(FlightCategory::Unknown).is_none());
    }

    #[test]
    fn test_hex() {
        assert_eq!(category_hex(FlightCategory::Mvfr).as_deref(), Some("#5599ff"));
        assert_eq!(category_hex(FlightCategory::Lifr).as_deref(), Some("#ff00ff"));
    }
}
