//! HTML rendering for the posture panel
//!
//! Markup is assembled with plain string templates. Every field that comes
//! from the aggregation service goes through [`escape_html`] first.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::view::{PostureView, TheaterDisplay, TheaterView};

/// Escape text for use in element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Placeholder shown before the first fetch resolves
pub fn render_loading() -> String {
    r#"<div class="posture-placeholder posture-loading">
  <div class="posture-placeholder-icon">⏳</div>
  <div class="posture-placeholder-title">Loading Theater Posture...</div>
</div>"#
        .to_string()
}

/// Placeholder for an empty or absent snapshot
pub fn render_no_data() -> String {
    r#"<div class="posture-placeholder posture-no-data">
  <div class="posture-placeholder-icon">📡</div>
  <div class="posture-placeholder-title">No Data Available</div>
  <div class="posture-placeholder-detail">No theater activity has been reported yet.</div>
</div>"#
        .to_string()
}

/// Placeholder for a failed fetch
pub fn render_error() -> String {
    r#"<div class="posture-placeholder posture-error">
  <div class="posture-placeholder-icon">⚠️</div>
  <div class="posture-placeholder-title">Error Loading Posture Data</div>
  <div class="posture-placeholder-detail">Will retry automatically.</div>
</div>"#
        .to_string()
}

/// Footer time, e.g. `14:05 UTC`
pub fn format_updated_at(at: DateTime<Utc>) -> String {
    at.format("%H:%M UTC").to_string()
}

/// Render a full snapshot view
pub fn render_view(view: &PostureView) -> String {
    let mut html = String::from(r#"<div class="posture-panel">"#);
    html.push('\n');

    for theater in &view.theaters {
        html.push_str(&render_theater(theater));
        html.push('\n');
    }

    let _ = write!(
        html,
        r#"  <div class="posture-footer">
    <span class="posture-updated">Updated {updated}</span>
    <button class="posture-refresh-btn" type="button" title="Refresh">↻</button>
  </div>
</div>"#,
        updated = format_updated_at(view.last_updated),
    );

    html
}

/// Render one theater in its compact or expanded layout
pub fn render_theater(theater: &TheaterView) -> String {
    let level = theater.level.as_str();
    let open = format!(
        r#"  <div class="posture-theater posture-{mode} posture-{level}" data-theater="{id}" data-lat="{lat}" data-lon="{lon}">"#,
        mode = if theater.is_expanded() { "expanded" } else { "compact" },
        level = level,
        id = escape_html(&theater.theater_id),
        lat = theater.center_lat,
        lon = theater.center_lon,
    );
    let badge = format!(
        r#"<span class="posture-level-badge posture-{}">{}</span>"#,
        level,
        theater.level.label()
    );

    match &theater.display {
        TheaterDisplay::Compact => format!(
            r#"{open}
    <span class="posture-name">{name}</span>
    {badge}
    <span class="posture-total">{total} aircraft</span>
  </div>"#,
            open = open,
            name = escape_html(&theater.name),
            badge = badge,
            total = theater.total_aircraft,
        ),
        TheaterDisplay::Expanded {
            rows,
            strike_capable,
            trend,
            target_nation,
        } => {
            let mut body = String::new();
            for row in rows {
                let _ = write!(
                    body,
                    r#"
      <div class="posture-row"><span class="posture-row-icon">{}</span><span class="posture-row-label">{}</span><span class="posture-row-count">{}</span></div>"#,
                    row.role.icon(),
                    row.role.label(),
                    row.count
                );
            }

            let strike = if *strike_capable {
                "\n    <div class=\"posture-strike\">⚡ STRIKE CAPABLE</div>"
            } else {
                ""
            };

            let target = match target_nation {
                Some(nation) => format!(
                    "\n    <div class=\"posture-target\">Focus: {}</div>",
                    escape_html(nation)
                ),
                None => String::new(),
            };

            format!(
                r#"{open}
    <div class="posture-header">
      <span class="posture-name">{name}</span>
      {badge}
    </div>
    <div class="posture-breakdown">{body}
    </div>{strike}
    <div class="posture-trend {trend_class}">{trend_text}</div>{target}
  </div>"#,
                open = open,
                name = escape_html(&theater.name),
                badge = badge,
                body = body,
                strike = strike,
                trend_class = trend.css_class(),
                trend_text = trend.text(),
                target = target,
            )
        }
    }
}
