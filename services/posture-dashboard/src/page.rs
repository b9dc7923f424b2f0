//! Dashboard page shell
//!
//! The page embeds the rendered panel and a small script that delegates
//! clicks from the panel root, so handlers survive every content swap.

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Theater Posture</title>
    <style>
        body { background: #0b0f14; color: #d7dde4; font-family: ui-monospace, Menlo, monospace; margin: 24px; }
        .panel { max-width: 420px; border: 1px solid #243040; border-radius: 6px; background: #111820; }
        .panel-header { display: flex; justify-content: space-between; padding: 8px 12px; border-bottom: 1px solid #243040; font-weight: bold; }
        .panel-badge { background: #d08a1c; color: #000; border-radius: 8px; padding: 0 6px; font-size: 12px; }
        .panel-badge-urgent { background: #e0443a; animation: pulse 1.2s infinite; }
        .panel-content { padding: 8px 12px; }
        .posture-theater { padding: 6px 0; border-bottom: 1px solid #1b2530; cursor: pointer; }
        .posture-theater:hover { background: #16202b; }
        .posture-compact { display: flex; gap: 8px; align-items: center; }
        .posture-header { display: flex; justify-content: space-between; }
        .posture-level-badge { font-size: 11px; padding: 0 4px; border-radius: 3px; }
        .posture-critical { color: #ff6b61; }
        .posture-elevated { color: #f0b246; }
        .posture-normal, .posture-unknown { color: #7fb77e; }
        .posture-row { display: flex; gap: 6px; font-size: 12px; }
        .posture-row-count { margin-left: auto; }
        .posture-strike { color: #ff6b61; font-size: 12px; }
        .trend-up { color: #ff6b61; }
        .trend-down { color: #7fb77e; }
        .trend-stable { color: #8a96a3; }
        .posture-footer { display: flex; justify-content: space-between; padding-top: 6px; font-size: 11px; color: #8a96a3; }
        .posture-refresh-btn { background: none; border: 1px solid #243040; color: inherit; cursor: pointer; }
        .posture-placeholder { text-align: center; padding: 24px 0; }
        #map-focus { margin-top: 12px; font-size: 12px; color: #8a96a3; }
        @keyframes pulse { 50% { opacity: 0.5; } }
    </style>
</head>
<body>
<div id="panel-root">
"#;

const PAGE_TAIL: &str = r#"
</div>
<div id="map-focus"></div>
<script>
(function () {
    const root = document.getElementById('panel-root');
    const focus = document.getElementById('map-focus');

    async function swap(response) {
        if (response.ok) {
            root.innerHTML = await response.text();
        }
    }

    root.addEventListener('click', async function (event) {
        if (event.target.closest('.posture-refresh-btn')) {
            await swap(await fetch('/panel/refresh', { method: 'POST' }));
            return;
        }
        const theater = event.target.closest('.posture-theater');
        if (!theater) {
            return;
        }
        const params = new URLSearchParams({ lat: theater.dataset.lat, lon: theater.dataset.lon });
        const response = await fetch('/panel/click?' + params.toString(), { method: 'POST' });
        const body = await response.json();
        if (body.handled) {
            focus.textContent = 'Map focus: ' + theater.dataset.lat + ', ' + theater.dataset.lon;
        }
    });

    setInterval(async function () {
        await swap(await fetch('/panel'));
    }, 60000);
})();
</script>
</body>
</html>
"#;

/// Full dashboard page around an already rendered panel
pub fn render_page(panel_html: &str) -> String {
    let mut page = String::with_capacity(PAGE_HEAD.len() + panel_html.len() + PAGE_TAIL.len());
    page.push_str(PAGE_HEAD);
    page.push_str(panel_html);
    page.push_str(PAGE_TAIL);
    page
}
