// Stack Settings - Per-layer transform, independent of the clips placed on it

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transform applied to everything drawn on one stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSettings {
    /// Static vertical mirror, XORed with the pattern's flip row
    pub flip_y: bool,

    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,

    /// Layer opacity [0.0, 1.0]
    pub opacity: f64,

    /// Static rotation in radians
    pub rotation: f64,
}

impl StackSettings {
    pub const IDENTITY: StackSettings = StackSettings {
        flip_y: false,
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
        opacity: 1.0,
        rotation: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Map a scene point through flip, scale, rotation and offset (in that order)
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let y = if self.flip_y { -y } else { y };
        let (x, y) = (x * self.scale, y * self.scale);
        let (sin, cos) = self.rotation.sin_cos();
        (
            x * cos - y * sin + self.offset_x,
            x * sin + y * cos + self.offset_y,
        )
    }
}

impl Default for StackSettings {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Settings for every configured stack; unconfigured stacks are identity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackSettingsMap(BTreeMap<u32, StackSettings>);

impl StackSettingsMap {
    pub fn get(&self, stack: u32) -> StackSettings {
        self.0.get(&stack).copied().unwrap_or_default()
    }

    pub fn set(&mut self, stack: u32, settings: StackSettings) {
        self.0.insert(stack, settings);
    }

    /// Back to identity
    pub fn reset(&mut self, stack: u32) {
        self.0.remove(&stack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform() {
        let (x, y) = StackSettings::IDENTITY.transform_point(3.0, -2.0);
        assert_eq!((x, y), (3.0, -2.0));
        assert!(StackSettings::default().is_identity());
    }

    #[test]
    fn test_transform_point() {
        let settings = StackSettings {
            flip_y: true,
            scale: 2.0,
            offset_x: 10.0,
            offset_y: 0.0,
            opacity: 1.0,
            rotation: FRAC_PI_2,
        };
        // (1, 1) -> flip (1, -1) -> scale (2, -2) -> rotate 90° (2, 2) -> offset (12, 2)
        let (x, y) = settings.transform_point(1.0, 1.0);
        assert!((x - 12.0).abs() < 1e-9);
        assert!((y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_unconfigured_stack_is_identity() {
        let mut map = StackSettingsMap::default();
        map.set(2, StackSettings { opacity: 0.5, ..StackSettings::IDENTITY });
        assert_eq!(map.get(2).opacity, 0.5);
        assert!(map.get(7).is_identity());

        map.reset(2);
        assert!(map.get(2).is_identity());
    }

    #[test]
    fn test_json_keys() {
        let mut map = StackSettingsMap::default();
        map.set(1, StackSettings { flip_y: true, ..StackSettings::IDENTITY });
        let json = serde_json::to_string(&map).unwrap();
        let back: StackSettingsMap = serde_json::from_str(&json).unwrap();
        assert!(back.get(1).flip_y);
    }
}
