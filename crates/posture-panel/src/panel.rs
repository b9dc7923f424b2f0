//! Base panel abstraction
//!
//! A panel owns a content area and a notification badge in its header. The
//! posture component only ever replaces the whole content area.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

use crate::render::escape_html;

/// Notification badge shown in the panel header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelBadge {
    /// Number of theaters at the level that raised the badge
    pub count: usize,
    /// Urgent badges pulse; non-urgent ones do not
    pub urgent: bool,
}

impl PanelBadge {
    pub fn urgent(count: usize) -> Self {
        Self { count, urgent: true }
    }

    pub fn non_urgent(count: usize) -> Self {
        Self { count, urgent: false }
    }
}

/// Container a component renders into
pub trait Panel: Send + Sync {
    /// Replace the whole content area
    fn set_content(&self, html: String);

    /// Set or clear the header badge
    fn set_badge(&self, badge: Option<PanelBadge>);

    /// Release the panel
    fn destroy(&self);
}

/// In-process panel that keeps its rendered state for a host to serve
pub struct HtmlPanel {
    id: String,
    title: String,
    content: RwLock<String>,
    badge: RwLock<Option<PanelBadge>>,
    destroyed: AtomicBool,
}

impl HtmlPanel {
    /// Create an empty panel
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: RwLock::new(String::new()),
            badge: RwLock::new(None),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Current content fragment
    pub fn content(&self) -> String {
        self.content.read().clone()
    }

    /// Current badge
    pub fn badge(&self) -> Option<PanelBadge> {
        *self.badge.read()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Render the panel with its header, badge and content
    pub fn render(&self) -> String {
        let badge = match self.badge() {
            Some(badge) => format!(
                r#"<span class="panel-badge{}">{}</span>"#,
                if badge.urgent { " panel-badge-urgent" } else { "" },
                badge.count
            ),
            None => String::new(),
        };

        format!(
            r#"<section class="panel" id="{id}">
  <header class="panel-header"><span class="panel-title">{title}</span>{badge}</header>
  <div class="panel-content" id="{id}-content">{content}</div>
</section>"#,
            id = escape_html(&self.id),
            title = escape_html(&self.title),
            badge = badge,
            content = self.content.read().as_str(),
        )
    }
}

impl Panel for HtmlPanel {
    fn set_content(&self, html: String) {
        if self.is_destroyed() {
            tracing::debug!(panel = %self.id, "Ignoring content update on destroyed panel");
            return;
        }
        *self.content.write() = html;
    }

    fn set_badge(&self, badge: Option<PanelBadge>) {
        if self.is_destroyed() {
            return;
        }
        *self.badge.write() = badge;
    }

    fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.content.write().clear();
        *self.badge.write() = None;
        tracing::debug!(panel = %self.id, "Panel destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_replacement() {
        let panel = HtmlPanel::new("posture", "Posture");
        panel.set_content("<p>one</p>".to_string());
        panel.set_content("<p>two</p>".to_string());
        assert_eq!(panel.content(), "<p>two</p>");
    }

    #[test]
    fn test_render_includes_badge() {
        let panel = HtmlPanel::new("posture", "Posture <Live>");
        panel.set_badge(Some(PanelBadge::urgent(2)));

        let html = panel.render();
        assert!(html.contains("panel-badge-urgent"));
        assert!(html.contains(">2</span>"));
        assert!(html.contains("Posture &lt;Live&gt;"));

        panel.set_badge(None);
        assert!(!panel.render().contains("panel-badge"));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let panel = HtmlPanel::new("posture", "Posture");
        panel.set_content("<p>data</p>".to_string());
        panel.destroy();
        panel.destroy();

        assert!(panel.is_destroyed());
        panel.set_content("<p>late</p>".to_string());
        assert!(panel.content().is_empty());
    }
}
