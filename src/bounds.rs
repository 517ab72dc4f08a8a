use anyhow::Result;
use serde::Serialize;

use crate::prefs::{PreferenceStore, keys};

pub const DEFAULT_WINDOW_WIDTH: i32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 600;
pub const NEW_WINDOW_OFFSET: i32 = 22;

/// Screen assumed when the front end does not report one.
pub const DEFAULT_SCREEN: ScreenSize = ScreenSize {
    width: 1920,
    height: 1080,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowBounds {
    /// Default-sized window centered on `screen`.
    pub fn default_for(screen: ScreenSize) -> Self {
        Self {
            x: screen.width.saturating_sub(DEFAULT_WINDOW_WIDTH) / 2,
            y: screen.height.saturating_sub(DEFAULT_WINDOW_HEIGHT) / 2,
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }

    /// Bounds for a new window opened next to `self`.
    pub fn offset(self) -> Self {
        Self {
            x: self.x.saturating_add(NEW_WINDOW_OFFSET),
            y: self.y.saturating_add(NEW_WINDOW_OFFSET),
            ..self
        }
    }

    /// Clips the size to the screen, then moves the rectangle fully onto it.
    pub fn sanitize(self, screen: ScreenSize) -> Self {
        let screen_width = screen.width.max(0);
        let screen_height = screen.height.max(0);
        let width = self.width.clamp(0, screen_width);
        let height = self.height.clamp(0, screen_height);
        Self {
            x: self.x.clamp(0, screen_width - width),
            y: self.y.clamp(0, screen_height - height),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowSettings {
    pub bounds: WindowBounds,
    pub maximized: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self::centered(DEFAULT_SCREEN)
    }
}

impl WindowSettings {
    pub fn centered(screen: ScreenSize) -> Self {
        Self {
            bounds: WindowBounds::default_for(screen),
            maximized: false,
        }
    }

    /// Settings for a window opened next to this one, kept on `screen`.
    pub fn next_window(&self, screen: ScreenSize) -> Self {
        Self {
            bounds: self.bounds.offset().sanitize(screen),
            maximized: false,
        }
    }

    /// Reads stored settings, falling back to centered defaults per field.
    pub fn read(store: &dyn PreferenceStore, screen: ScreenSize) -> Result<Self> {
        let defaults = WindowBounds::default_for(screen);
        let bounds = WindowBounds {
            x: store.get_i32(keys::WINDOW_X, defaults.x)?,
            y: store.get_i32(keys::WINDOW_Y, defaults.y)?,
            width: store.get_i32(keys::WINDOW_WIDTH, defaults.width)?,
            height: store.get_i32(keys::WINDOW_HEIGHT, defaults.height)?,
        };
        Ok(Self {
            bounds: bounds.sanitize(screen),
            maximized: store.get_bool(keys::WINDOW_MAXIMIZED, false)?,
        })
    }

    /// Persists the settings. Bounds of a maximized window are not stored so
    /// the last normal size survives.
    pub fn save(&self, store: &dyn PreferenceStore) -> Result<()> {
        store.put_bool(keys::WINDOW_MAXIMIZED, self.maximized)?;
        if !self.maximized {
            store.put_i32(keys::WINDOW_X, self.bounds.x)?;
            store.put_i32(keys::WINDOW_Y, self.bounds.y)?;
            store.put_i32(keys::WINDOW_WIDTH, self.bounds.width)?;
            store.put_i32(keys::WINDOW_HEIGHT, self.bounds.height)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferences;

    const SCREEN: ScreenSize = ScreenSize {
        width: 1920,
        height: 1080,
    };

    #[test]
    fn default_is_centered() {
        assert_eq!(
            WindowBounds::default_for(SCREEN),
            WindowBounds { x: 560, y: 240, width: 800, height: 600 }
        );
    }

    #[test]
    fn sanitize_moves_offscreen_windows_back() {
        let b = WindowBounds { x: -50, y: 1000, width: 800, height: 600 };
        assert_eq!(b.sanitize(SCREEN), WindowBounds { x: 0, y: 480, width: 800, height: 600 });
    }

    #[test]
    fn sanitize_clips_oversized_windows() {
        let b = WindowBounds { x: 10, y: 10, width: 4000, height: 3000 };
        assert_eq!(b.sanitize(SCREEN), WindowBounds { x: 0, y: 0, width: 1920, height: 1080 });
    }

    #[test]
    fn offset_shifts_down_right() {
        let b = WindowBounds::default_for(SCREEN).offset();
        assert_eq!((b.x, b.y), (582, 262));
    }

    #[test]
    fn next_window_cascades_and_stays_on_screen() {
        let active = WindowSettings {
            bounds: WindowBounds { x: 100, y: 50, width: 640, height: 480 },
            maximized: true,
        };
        let next = active.next_window(SCREEN);
        assert_eq!(next.bounds, WindowBounds { x: 122, y: 72, width: 640, height: 480 });
        assert!(!next.maximized);

        let corner = WindowSettings {
            bounds: WindowBounds { x: 1280, y: 600, width: 640, height: 480 },
            maximized: false,
        };
        assert_eq!(corner.next_window(SCREEN).bounds, corner.bounds);
    }

    #[test]
    fn extreme_stored_values_are_clamped() -> Result<()> {
        let store = MemoryPreferences::new();
        store.put_i32(keys::WINDOW_X, i32::MAX)?;
        store.put_i32(keys::WINDOW_Y, i32::MIN)?;
        store.put_i32(keys::WINDOW_WIDTH, i32::MAX)?;
        store.put_i32(keys::WINDOW_HEIGHT, -5)?;

        let read = WindowSettings::read(&store, SCREEN)?;
        assert_eq!(read.bounds, WindowBounds { x: 0, y: 0, width: 1920, height: 0 });

        let far = WindowBounds { x: i32::MAX, y: i32::MAX, width: 10, height: 10 };
        assert_eq!(far.offset(), far);
        assert_eq!(far.sanitize(SCREEN), WindowBounds { x: 1910, y: 1070, width: 10, height: 10 });
        Ok(())
    }

    #[test]
    fn settings_round_trip_and_maximized_keeps_normal_bounds() -> Result<()> {
        let store = MemoryPreferences::new();
        assert_eq!(
            WindowSettings::read(&store, SCREEN)?.bounds,
            WindowBounds::default_for(SCREEN)
        );

        let normal = WindowSettings {
            bounds: WindowBounds { x: 5, y: 6, width: 700, height: 500 },
            maximized: false,
        };
        normal.save(&store)?;
        let maximized = WindowSettings {
            bounds: WindowBounds { x: 0, y: 0, width: 1920, height: 1080 },
            maximized: true,
        };
        maximized.save(&store)?;

        let read = WindowSettings::read(&store, SCREEN)?;
        assert!(read.maximized);
        assert_eq!(read.bounds, normal.bounds);
        Ok(())
    }
}
