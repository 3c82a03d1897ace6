/// Render layer: selects one of the engine's three drawing surfaces.
///
/// Layers are stacked back-to-front: Background first, Foreground last.
/// All three share the play-area dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum RenderLayer {
    Background = 0,
    #[default]
    Game = 1,
    Foreground = 2,
}

impl RenderLayer {
    /// Total number of render layers.
    pub const COUNT: usize = 3;

    /// All layers in stacking order.
    pub const ALL: [RenderLayer; Self::COUNT] =
        [RenderLayer::Background, RenderLayer::Game, RenderLayer::Foreground];

    /// Convert from a u8 value to a RenderLayer.
    /// Returns None if the value is out of range.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Background),
            1 => Some(Self::Game),
            2 => Some(Self::Foreground),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_game() {
        assert_eq!(RenderLayer::default(), RenderLayer::Game);
    }

    #[test]
    fn ordering_is_back_to_front() {
        assert!(RenderLayer::Background < RenderLayer::Game);
        assert!(RenderLayer::Game < RenderLayer::Foreground);
        assert_eq!(RenderLayer::ALL[0], RenderLayer::Background);
    }

    #[test]
    fn index_matches_from_u8() {
        for layer in RenderLayer::ALL {
            assert_eq!(RenderLayer::from_u8(layer.index() as u8), Some(layer));
        }
        assert!(RenderLayer::from_u8(3).is_none());
    }
}
