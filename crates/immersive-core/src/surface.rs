use serde::{Deserialize, Serialize};
use std::fmt;

/// Overlay UI surfaces the controller can show or hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Address bar and navigation buttons.
    Toolbar,
    TabStrip,
    BookmarksBar,
    DownloadShelf,
    InfoBarContainer,
}

impl Surface {
    pub const ALL: [Surface; 5] = [
        Surface::Toolbar,
        Surface::TabStrip,
        Surface::BookmarksBar,
        Surface::DownloadShelf,
        Surface::InfoBarContainer,
    ];

    /// Surfaces managed when the configuration does not say otherwise.
    /// The download shelf and info bars keep their own visibility logic.
    pub fn default_managed() -> Vec<Surface> {
        vec![Surface::Toolbar, Surface::TabStrip, Surface::BookmarksBar]
    }

    pub fn name(self) -> &'static str {
        match self {
            Surface::Toolbar => "toolbar",
            Surface::TabStrip => "tab_strip",
            Surface::BookmarksBar => "bookmarks_bar",
            Surface::DownloadShelf => "download_shelf",
            Surface::InfoBarContainer => "info_bar_container",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Pointer position in window/screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Host window bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Whether `point` lies in the strip `[x, right) × [y, y + depth)`
    /// along the top edge.
    pub fn top_strip_contains(&self, point: Point, depth: i32) -> bool {
        point.x >= self.x
            && point.x < self.right()
            && point.y >= self.y
            && point.y < self.y.saturating_add(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- top strip hit testing ---

    #[test]
    fn far_edge_of_strip_is_excluded() {
        let window = Rect::new(0, 0, 1200, 800);
        assert!(window.top_strip_contains(Point::new(600, 4), 5));
        assert!(!window.top_strip_contains(Point::new(600, 5), 5));
    }

    #[test]
    fn strip_respects_window_origin_and_width() {
        let window = Rect::new(100, 50, 200, 400);
        assert!(window.top_strip_contains(Point::new(100, 50), 5));
        assert!(!window.top_strip_contains(Point::new(99, 50), 5));
        assert!(!window.top_strip_contains(Point::new(300, 50), 5));
        assert!(!window.top_strip_contains(Point::new(150, 49), 5));
        assert!(!window.top_strip_contains(Point::new(150, 55), 5));
    }

    #[test]
    fn surface_names_match_serde_tags() {
        for surface in Surface::ALL {
            let json = serde_json::to_string(&surface).unwrap();
            assert_eq!(json, format!("\"{}\"", surface.name()));
        }
    }

    #[test]
    fn default_managed_excludes_shelf_and_infobars() {
        let managed = Surface::default_managed();
        assert_eq!(managed.len(), 3);
        assert!(!managed.contains(&Surface::DownloadShelf));
        assert!(!managed.contains(&Surface::InfoBarContainer));
    }
}
