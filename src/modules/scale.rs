//! Virtual resolution: the board is laid out in fixed board units and scaled
//! uniformly to fit the window, letterboxed and centred.

use macroquad::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub offset: Vec2,
}

impl Viewport {
    pub fn new(virtual_width: f32, virtual_height: f32, screen_width: f32, screen_height: f32) -> Self {
        let scale = if virtual_width > 0.0 && virtual_height > 0.0 {
            (screen_width / virtual_width).min(screen_height / virtual_height)
        } else {
            1.0
        };
        let offset = vec2(
            (screen_width - virtual_width * scale) / 2.0,
            (screen_height - virtual_height * scale) / 2.0,
        );
        Self { scale, offset }
    }

    pub fn virtual_to_screen(&self, point: Vec2) -> Vec2 {
        point * self.scale + self.offset
    }

    pub fn screen_to_virtual(&self, point: Vec2) -> Vec2 {
        (point - self.offset) / self.scale
    }

    pub fn length(&self, length: f32) -> f32 {
        length * self.scale
    }
}

/// Viewport for the current window size
pub fn use_virtual_resolution(virtual_width: f32, virtual_height: f32) -> Viewport {
    Viewport::new(virtual_width, virtual_height, screen_width(), screen_height())
}

/// Mouse position in board units
pub fn mouse_position_virtual(viewport: &Viewport) -> Vec2 {
    let (x, y) = mouse_position();
    viewport.screen_to_virtual(vec2(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_wide_window() {
        let viewport = Viewport::new(1000.0, 1000.0, 2000.0, 1000.0);
        assert_eq!(viewport.scale, 1.0);
        assert_eq!(viewport.offset, vec2(500.0, 0.0));
    }

    #[test]
    fn test_letterbox_tall_window() {
        let viewport = Viewport::new(1000.0, 1000.0, 500.0, 800.0);
        assert_eq!(viewport.scale, 0.5);
        assert_eq!(viewport.offset, vec2(0.0, 150.0));
    }

    #[test]
    fn test_screen_and_virtual_are_inverse() {
        let viewport = Viewport::new(1000.0, 1000.0, 1024.0, 768.0);
        let board = vec2(500.0, 500.0);
        let back = viewport.screen_to_virtual(viewport.virtual_to_screen(board));
        assert!((back - board).length() < 1e-3);
        // Window centre is board centre
        let centre = viewport.screen_to_virtual(vec2(512.0, 384.0));
        assert!((centre - board).length() < 1e-3);
    }
}
