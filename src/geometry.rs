use serde::{Deserialize, Serialize};

/// Screen edge a sidebar can be docked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Window rectangle in root (display) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Same rectangle moved horizontally to `x`
    pub fn with_x(self, x: i32) -> Self {
        Self { x, ..self }
    }
}

/// Dimensions of the single virtual display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Display {
    pub width: i32,
    pub height: i32,
}

impl Display {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Convert an unsigned config/protocol length into a coordinate
pub fn to_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 800, 600);
        assert_eq!(rect.left(), 10);
        assert_eq!(rect.right(), 810);
        assert_eq!(Rect::new(i32::MAX - 5, 0, 10, 10).right(), i32::MAX);
    }

    #[test]
    fn test_with_x_keeps_size_and_y() {
        let rect = Rect::new(10, 20, 800, 600).with_x(60);
        assert_eq!(rect, Rect::new(60, 20, 800, 600));
    }

    #[test]
    fn test_to_coord_saturates() {
        assert_eq!(to_coord(1920), 1920);
        assert_eq!(to_coord(u32::MAX), i32::MAX);
    }
}
