use crate::error::AlertError;

#[cfg(target_os = "linux")]
pub mod x11;

#[cfg(target_os = "linux")]
pub use x11::X11Monitors as NativeMonitors;

/// A connected display's bounds in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Monitor {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner that centers a `size` box on this monitor
    pub fn center(&self, size: WindowSize) -> (i32, i32) {
        let dx = (signed(self.width) - signed(size.width)).div_euclid(2);
        let dy = (signed(self.height) - signed(size.height)).div_euclid(2);
        (self.x + dx, self.y + dy)
    }
}

fn signed(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

/// Where one alert window goes. `position: None` leaves centering to the
/// window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlacement {
    pub position: Option<(i32, i32)>,
    pub size: WindowSize,
}

pub trait MonitorProvider {
    /// Every connected display, in the order the platform reports them
    fn monitors(&self) -> Result<Vec<Monitor>, AlertError>;

    /// Bounds of the primary screen, when the platform can tell
    fn primary_screen(&self) -> Option<Monitor>;
}

/// Provider for platforms without a monitor query; always falls back to a
/// single window.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMonitors;

impl MonitorProvider for NoMonitors {
    fn monitors(&self) -> Result<Vec<Monitor>, AlertError> {
        Ok(Vec::new())
    }

    fn primary_screen(&self) -> Option<Monitor> {
        None
    }
}

#[cfg(not(target_os = "linux"))]
pub use NoMonitors as NativeMonitors;

/// One placement per monitor, each centered on its own bounds. Without any
/// monitors (or when the query failed) a single window is centered on the
/// primary screen.
pub fn plan_windows<P: MonitorProvider + ?Sized>(provider: &P, size: WindowSize) -> Vec<WindowPlacement> {
    let monitors = provider.monitors().unwrap_or_else(|e| {
        log::warn!("{}; showing a single window", e);
        Vec::new()
    });

    if monitors.is_empty() {
        let position = provider.primary_screen().map(|screen| screen.center(size));
        return vec![WindowPlacement { position, size }];
    }

    monitors
        .iter()
        .map(|m| WindowPlacement {
            position: Some(m.center(size)),
            size,
        })
        .collect()
}
