use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CaptureBackendError;

/// Selects a display: 0 is the union of all monitors, 1..N a physical one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorIndex(pub u32);

impl MonitorIndex {
    pub const ALL: MonitorIndex = MonitorIndex(0);
    pub const PRIMARY: MonitorIndex = MonitorIndex(1);

    pub fn is_all(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for MonitorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MonitorIndex {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(MonitorIndex)
    }
}

impl From<u32> for MonitorIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Geometry of a monitor, or of the union when `index` is 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorInfo {
    pub index: u32,
    /// Backend identifier used to find the monitor again
    pub id: u32,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl MonitorInfo {
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Bounding box covering every monitor
pub fn bounding_box(monitors: &[MonitorInfo]) -> Option<MonitorInfo> {
    let left = monitors.iter().map(|m| m.x).min()?;
    let top = monitors.iter().map(|m| m.y).min()?;
    let right = monitors.iter().map(MonitorInfo::right).max()?;
    let bottom = monitors.iter().map(MonitorInfo::bottom).max()?;
    Some(MonitorInfo {
        index: 0,
        id: 0,
        name: "all".to_string(),
        x: left,
        y: top,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
        is_primary: false,
    })
}

/// Resolve an index against the enumerated monitors
pub fn select(
    monitors: &[MonitorInfo],
    index: MonitorIndex,
) -> Result<MonitorInfo, CaptureBackendError> {
    if monitors.is_empty() {
        return Err(CaptureBackendError::NoMonitor(
            "no display is connected".to_string(),
        ));
    }
    if index.is_all() {
        return bounding_box(monitors)
            .ok_or_else(|| CaptureBackendError::NoMonitor("empty monitor list".to_string()));
    }
    monitors
        .get(index.0 as usize - 1)
        .cloned()
        .ok_or(CaptureBackendError::MonitorUnavailable {
            index: index.0,
            available: monitors.len(),
        })
}

/// Monitors that intersect the selection; the union selects all of them
pub fn covered<'a>(monitors: &'a [MonitorInfo], index: MonitorIndex) -> Vec<&'a MonitorInfo> {
    if index.is_all() {
        monitors.iter().collect()
    } else {
        monitors.get(index.0 as usize - 1).into_iter().collect()
    }
}

#[cfg(test)]
pub(crate) fn monitor(index: u32, x: i32, y: i32, width: u32, height: u32) -> MonitorInfo {
    MonitorInfo {
        index,
        id: index * 10,
        name: format!("fake-{}", index),
        x,
        y,
        width,
        height,
        is_primary: index == 1,
    }
}
