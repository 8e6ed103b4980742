use super::{Monitor, MonitorProvider};
use crate::error::AlertError;
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;

/// Monitor geometry from the X server's RandR extension.
///
/// Connecting is deferred to each query so a missing display (Wayland without
/// XWayland, headless sessions) only surfaces as a query error.
#[derive(Debug, Default, Clone, Copy)]
pub struct X11Monitors;

impl X11Monitors {
    pub fn new() -> Self {
        Self
    }

    fn connect() -> Result<(RustConnection, usize), AlertError> {
        x11rb::connect(None).map_err(|e| AlertError::Monitors(format!("X11 connect: {}", e)))
    }
}

impl MonitorProvider for X11Monitors {
    fn monitors(&self) -> Result<Vec<Monitor>, AlertError> {
        let (conn, screen_num) = Self::connect()?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| AlertError::Monitors(format!("invalid screen number {}", screen_num)))?;

        let reply = conn
            .randr_get_monitors(screen.root, true)
            .map_err(|e| AlertError::Monitors(e.to_string()))?
            .reply()
            .map_err(|e| AlertError::Monitors(e.to_string()))?;

        let mut monitors: Vec<(bool, Monitor)> = reply
            .monitors
            .iter()
            .map(|m| {
                (
                    m.primary,
                    Monitor::new(
                        i32::from(m.x),
                        i32::from(m.y),
                        u32::from(m.width),
                        u32::from(m.height),
                    ),
                )
            })
            .collect();
        // Primary first so the root window lands there
        monitors.sort_by_key(|(primary, _)| !*primary);

        Ok(monitors.into_iter().map(|(_, m)| m).collect())
    }

    fn primary_screen(&self) -> Option<Monitor> {
        let (conn, screen_num) = Self::connect().ok()?;
        let screen = conn.setup().roots.get(screen_num)?;
        Some(Monitor::new(
            0,
            0,
            u32::from(screen.width_in_pixels),
            u32::from(screen.height_in_pixels),
        ))
    }
}
