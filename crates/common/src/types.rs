//! Core geometry types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Video/image resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const HD: Self = Self {
        width: 1920,
        height: 1080,
    };
    pub const UHD: Self = Self {
        width: 3840,
        height: 2160,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Chroma plane height for 4:2:0 subsampling (rounds up for odd heights).
    pub fn chroma_rows_420(self) -> u32 {
        self.height.div_ceil(2)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_display() {
        assert_eq!(Resolution::HD.to_string(), "1920x1080");
        assert_eq!(Resolution::new(640, 480).to_string(), "640x480");
    }

    #[test]
    fn pixel_count() {
        assert_eq!(Resolution::HD.pixel_count(), 1920 * 1080);
    }

    #[test]
    fn chroma_rows_round_up() {
        assert_eq!(Resolution::new(640, 480).chroma_rows_420(), 240);
        assert_eq!(Resolution::new(640, 481).chroma_rows_420(), 241);
    }
}
