//! Selection rectangle geometry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SelectionError;

/// A rectangular region in viewport pixel coordinates.
///
/// Produced once per successful selection by normalizing the two drag
/// endpoints; immutable after creation. A rectangle with `width == 0 &&
/// height == 0` signals that no drag occurred; whether that is a usable
/// selection is the caller's policy, not this type's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl SelectionRect {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds the normalized rectangle spanned by two drag endpoints.
    ///
    /// `left`/`top` take the minimum of each coordinate pair and
    /// `width`/`height` the absolute difference, so dragging in any direction
    /// yields the same rectangle.
    pub fn from_drag(anchor: (i32, i32), current: (i32, i32)) -> Self {
        Self {
            left: anchor.0.min(current.0),
            top: anchor.1.min(current.1),
            width: anchor.0.abs_diff(current.0),
            height: anchor.1.abs_diff(current.1),
        }
    }

    /// `true` if the rectangle encloses no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for SelectionRect {
    /// Formats as `"x,y WxH"`, the geometry syntax shared with `slurp` and
    /// `grim`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{} {}x{}",
            self.left, self.top, self.width, self.height
        )
    }
}

impl FromStr for SelectionRect {
    type Err = SelectionError;

    /// Parses `"x,y WxH"` geometry strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SelectionError::InvalidGeometry(s.to_string());

        let (position, size) = s.trim().split_once(char::is_whitespace).ok_or_else(invalid)?;
        let (x, y) = position.split_once(',').ok_or_else(invalid)?;
        let (w, h) = size.trim().split_once('x').ok_or_else(invalid)?;

        Ok(Self {
            left: x.trim().parse().map_err(|_| invalid())?,
            top: y.trim().parse().map_err(|_| invalid())?,
            width: w.trim().parse().map_err(|_| invalid())?,
            height: h.trim().parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_down_right_is_normalized() {
        let rect = SelectionRect::from_drag((10, 10), (110, 60));
        assert_eq!(rect, SelectionRect::new(10, 10, 100, 50));
    }

    #[test]
    fn drag_up_left_is_normalized() {
        let rect = SelectionRect::from_drag((110, 60), (10, 10));
        assert_eq!(rect, SelectionRect::new(10, 10, 100, 50));
    }

    #[test]
    fn mixed_direction_drags_agree() {
        let corners = [(5, 80), (40, 12)];
        let forward = SelectionRect::from_drag(corners[0], corners[1]);
        let backward = SelectionRect::from_drag(corners[1], corners[0]);
        assert_eq!(forward, backward);
        assert_eq!(forward, SelectionRect::new(5, 12, 35, 68));
    }

    #[test]
    fn zero_distance_drag_is_empty() {
        let rect = SelectionRect::from_drag((42, 17), (42, 17));
        assert_eq!((rect.width, rect.height), (0, 0));
        assert!(rect.is_empty());
    }

    #[test]
    fn parses_slurp_geometry() {
        let rect: SelectionRect = "10,20 300x200".parse().unwrap();
        assert_eq!(rect, SelectionRect::new(10, 20, 300, 200));
        assert_eq!(rect.to_string(), "10,20 300x200");
    }

    #[test]
    fn rejects_malformed_geometry() {
        for s in ["", "10,20", "10;20 300x200", "10,20 300by200"] {
            assert!(s.parse::<SelectionRect>().is_err(), "accepted {s:?}");
        }
    }
}
