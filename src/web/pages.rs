// ═══════════════════════════════════════════════════════════
// HTML rendering: self-contained pages (no external assets)
// ═══════════════════════════════════════════════════════════

use crate::capture::CaptureForm;
use crate::config::{FormDefaults, APP_NAME, APP_VERSION};
use crate::dashboard::DashboardSnapshot;
use crate::models::{CaseRecord, MediaAttachment};
use crate::result_view::ResultView;

const STYLE: &str = r##"<style>
*,*::before,*::after{box-sizing:border-box}
body{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#f3f4f6;color:#111827;padding:16px}
.card{background:#fff;border-radius:12px;box-shadow:0 2px 12px rgba(0,0,0,.06);max-width:560px;margin:0 auto 16px;padding:20px}
.wide{max-width:960px}
h1{font-size:1.4rem;margin:0 0 12px}
h2{font-size:1.05rem;margin:16px 0 8px}
label{display:block;font-size:.85rem;color:#374151;margin-top:10px}
input[type=text],select{width:100%;padding:10px;border:1px solid #d1d5db;border-radius:8px;font-size:1rem}
.btn{display:block;width:100%;padding:14px;border:none;border-radius:10px;font-size:1rem;font-weight:600;cursor:pointer;margin-top:16px;text-decoration:none;text-align:center}
.btn-primary{background:#2563EB;color:#fff}
.btn-secondary{background:#e5e7eb;color:#111827}
.notice{background:#FEF2F2;border:1px solid #FECACA;color:#991B1B;border-radius:8px;padding:10px;margin-bottom:12px}
.held{color:#15803D;font-size:.85rem}
.missing{color:#6B7280;font-size:.85rem}
.stats{display:grid;grid-template-columns:repeat(4,1fr);gap:8px}
.stat{border-radius:10px;padding:12px;color:#fff}
.stat b{display:block;font-size:1.6rem}
.bar{height:22px;border-radius:4px;margin:4px 0}
table{width:100%;border-collapse:collapse;font-size:.85rem}
td,th{border-bottom:1px solid #e5e7eb;padding:6px;text-align:left}
.muted{color:#6B7280;font-size:.8rem}
</style>"##;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{head_extra}<title>{title} · {app}</title>
{style}
</head>
<body>
{body}
<p class="muted" style="text-align:center">{app} v{version}</p>
</body>
</html>"##,
        title = escape_html(title),
        app = APP_NAME,
        version = APP_VERSION,
        style = STYLE,
    )
}

fn notice_block(notice: Option<&str>) -> String {
    notice
        .map(|n| format!(r#"<div class="notice">{}</div>"#, escape_html(n)))
        .unwrap_or_default()
}

pub fn landing_page() -> String {
    page(
        "Home",
        "",
        r##"<div class="card">
  <h1>Bact-Trace</h1>
  <p>AI triage for respiratory infections in the field.</p>
  <a href="/capture" class="btn btn-primary">New Patient Case</a>
  <a href="/dashboard" class="btn btn-secondary">Surveillance Dashboard</a>
</div>"##,
    )
}

// ── Capture ─────────────────────────────────────────────────

fn text_input(label: &str, name: &str, value: Option<&str>, placeholder: &str) -> String {
    format!(
        r#"<label>{label}<input type="text" name="{name}" value="{value}" placeholder="{placeholder}"></label>"#,
        label = escape_html(label),
        value = escape_html(value.unwrap_or("")),
        placeholder = escape_html(placeholder),
    )
}

fn checkbox(label: &str, name: &str, checked: bool) -> String {
    format!(
        r#"<label><input type="checkbox" name="{name}" value="Yes"{checked}> {label}</label>"#,
        label = escape_html(label),
        checked = if checked { " checked" } else { "" },
    )
}

fn media_status(media: Option<&MediaAttachment>, empty: &str) -> String {
    match media {
        Some(m) => format!(
            r#"<span class="held">Held: {} ({} KB)</span>"#,
            escape_html(&m.file_name),
            m.size_bytes().div_ceil(1024)
        ),
        None => format!(r#"<span class="missing">{empty}</span>"#),
    }
}

/// The capture form. Media already held are listed; empty file inputs keep them.
pub fn capture_page(form: &CaptureForm, defaults: &FormDefaults, notice: Option<&str>) -> String {
    let draft = form.draft();
    let gender = draft.gender.as_deref().unwrap_or(&defaults.gender);
    let gender_options: String = ["Male", "Female", "Other"]
        .iter()
        .map(|g| {
            format!(
                r#"<option value="{g}"{sel}>{g}</option>"#,
                sel = if *g == gender { " selected" } else { "" }
            )
        })
        .collect();

    let location = match draft.location {
        Some(p) => format!(
            r#"<p class="muted">Location: {:.5}, {:.5}</p>
  <input type="hidden" name="latitude" value="{}">
  <input type="hidden" name="longitude" value="{}">"#,
            p.latitude, p.longitude, p.latitude, p.longitude
        ),
        None => r#"<p class="muted" id="loc">Location: not available</p>
  <input type="hidden" name="latitude" id="lat">
  <input type="hidden" name="longitude" id="lon">"#
            .to_string(),
    };

    let body = format!(
        r##"<div class="card">
  <h1>New Patient Case</h1>
  {notice}
  <form method="post" action="/capture" enctype="multipart/form-data">
  {name}
  {age}
  <label>Gender<select name="gender">{gender_options}</select></label>
  {village}
  {temperature}
  {days}
  {phlegm}
  {breathing}
  <h2>Throat photo</h2>
  {photo_status}
  <input type="file" name="image" accept="image/*" capture="environment">
  <h2>Cough recording</h2>
  {audio_status}
  <input type="file" name="audio" accept="audio/*" capture>
  {location}
  <button type="submit" class="btn btn-primary">Submit for Diagnosis</button>
  </form>
  <a href="/" class="btn btn-secondary">Back</a>
</div>
<script>
(function(){{
  var lat=document.getElementById('lat');
  if(!lat||!navigator.geolocation)return;
  navigator.geolocation.getCurrentPosition(function(p){{
    lat.value=p.coords.latitude;
    document.getElementById('lon').value=p.coords.longitude;
    document.getElementById('loc').textContent='Location: '+p.coords.latitude.toFixed(5)+', '+p.coords.longitude.toFixed(5);
  }},function(){{}});
}})();
</script>"##,
        notice = notice_block(notice),
        name = text_input(
            "Patient name",
            "patientName",
            draft.patient_name.as_deref(),
            &defaults.patient_name
        ),
        age = text_input("Age", "age", draft.age.as_deref(), &defaults.age),
        village = text_input(
            "Village",
            "village",
            draft.village.as_deref(),
            &defaults.village
        ),
        temperature = text_input(
            "Temperature (°F)",
            "temperature",
            draft.temperature.as_deref(),
            &defaults.temperature
        ),
        days = text_input(
            "Days with symptoms",
            "symptomsDays",
            draft.symptom_days.as_deref(),
            &defaults.symptom_days
        ),
        phlegm = checkbox("Coughing up phlegm", "hasPhlegm", draft.has_phlegm),
        breathing = checkbox(
            "Difficulty breathing",
            "breathingDifficulty",
            draft.breathing_difficulty
        ),
        photo_status = media_status(draft.photo.as_ref(), "No photo yet"),
        audio_status = media_status(draft.audio.as_ref(), "No recording yet"),
    );

    page("Capture", "", &body)
}

// ── Result ──────────────────────────────────────────────────

pub fn result_page(view: &ResultView, notice: Option<&str>) -> String {
    let body = format!(
        r##"<div class="card">
  {notice}
  <h1>Diagnosis Complete</h1>
  <p class="muted">Confidence: {confidence}</p>
  <h2>PRIMARY DIAGNOSIS</h2>
  <p style="font-size:1.3rem;font-weight:700">{diagnosis}</p>
  <h2>RECOMMENDATION</h2>
  <p>{recommendation}</p>
  <h2>Visual Findings</h2>
  <p style="color:{cue};font-weight:600">{visual}</p>
  <form method="post" action="/reset">
    <button type="submit" class="btn btn-primary">New Patient</button>
  </form>
</div>"##,
        notice = notice_block(notice),
        confidence = escape_html(&view.confidence),
        diagnosis = escape_html(&view.diagnosis),
        recommendation = escape_html(&view.recommendation),
        cue = view.visual_cue.color_hex(),
        visual = escape_html(&view.visual_finding),
    );
    page("Result", "", &body)
}

// ── Dashboard ───────────────────────────────────────────────

fn opt(value: &Option<String>) -> String {
    escape_html(value.as_deref().unwrap_or("-"))
}

fn alert_row(case: &CaseRecord) -> String {
    let tag = if case.is_critical() {
        "CRITICAL"
    } else {
        "BACTERIAL"
    };
    format!(
        "<tr><td>{tag}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        opt(&case.patient_name),
        opt(&case.village_name),
        opt(&case.cough_diagnosis),
        opt(&case.created_at),
    )
}

/// Auto-refreshing dashboard. The browser reloads on the poll cadence.
pub fn dashboard_page(snapshot: &DashboardSnapshot, refresh_secs: u64) -> String {
    let stats = &snapshot.stats;
    let max = snapshot.chart.iter().map(|b| b.count).max().unwrap_or(0).max(1);

    let bars: String = snapshot
        .chart
        .iter()
        .map(|bar| {
            format!(
                r#"<div>{label}: {count}<div class="bar" style="width:{pct}%;background:{color}"></div></div>"#,
                label = bar.label,
                count = bar.count,
                pct = bar.count * 100 / max,
                color = bar.color_hex,
            )
        })
        .collect();

    let markers: String = snapshot
        .markers
        .iter()
        .map(|m| {
            format!(
                r#"<tr><td><span style="color:{color}">&#9679;</span></td><td>{lat:.4}, {lon:.4}</td><td>{village}</td><td>{diag}</td><td>{temp}</td><td>{phlegm}</td><td>{breathing}</td></tr>"#,
                color = m.color.color_hex(),
                lat = m.position.latitude,
                lon = m.position.longitude,
                village = opt(&m.village),
                diag = opt(&m.diagnosis),
                temp = opt(&m.temperature),
                phlegm = opt(&m.has_phlegm),
                breathing = opt(&m.breathing_difficulty),
            )
        })
        .collect();

    let alerts: String = snapshot.alerts.iter().map(alert_row).collect();

    let updated = snapshot
        .fetched_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "waiting for first update".to_string());

    let body = format!(
        r##"<div class="card wide">
  <h1>AMR Surveillance</h1>
  <p class="muted">Last update: {updated}</p>
  <div class="stats">
    <div class="stat" style="background:#374151">Total<b>{total}</b></div>
    <div class="stat" style="background:#EF4444">Bacterial<b>{bacterial}</b></div>
    <div class="stat" style="background:#3B82F6">Viral<b>{viral}</b></div>
    <div class="stat" style="background:#7F1D1D">Critical<b>{critical}</b></div>
  </div>
  <h2>Cases by type</h2>
  {bars}
  <h2>Case map</h2>
  <table><tr><th></th><th>Position</th><th>Village</th><th>Diagnosis</th><th>Temp</th><th>Phlegm</th><th>Breathing</th></tr>{markers}</table>
  <h2>High-risk alerts</h2>
  <table><tr><th></th><th>Patient</th><th>Village</th><th>Diagnosis</th><th>Reported</th></tr>{alerts}</table>
  <a href="/" class="btn btn-secondary">Back</a>
</div>"##,
        total = stats.total,
        bacterial = stats.bacterial,
        viral = stats.viral,
        critical = stats.critical,
    );

    let refresh = format!(r#"<meta http-equiv="refresh" content="{refresh_secs}">"#);
    page("Dashboard", &refresh, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::case_record::record;
    use crate::models::DiagnosisResult;
    use chrono::Utc;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn capture_page_shows_notice_and_held_media() {
        let mut form = CaptureForm::new();
        form.set_patient_name("<script>");
        form.capture_photo(MediaAttachment::photo("throat.jpg", vec![0; 2048]));

        let html = capture_page(&form, &FormDefaults::web(), Some("Please capture both photo and audio."));
        assert!(html.contains("Please capture both photo and audio."));
        assert!(html.contains("Held: throat.jpg (2 KB)"));
        assert!(html.contains("No recording yet"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("value=\"<script>\""));
        assert!(html.contains(r#"placeholder="Remote Village A""#));
    }

    #[test]
    fn result_page_colors_invalid_image_red() {
        let view = ResultView::from(&DiagnosisResult {
            cough_diagnosis: "Viral".into(),
            cough_confidence: 0.4,
            visual_diagnosis: "Invalid Image (Not a Throat)".into(),
            final_recommendation: "Retake photo".into(),
        });
        let html = result_page(&view, None);
        assert!(html.contains("40%"));
        assert!(html.contains("color:#DC2626"));
        assert!(html.contains(r#"action="/reset""#));
    }

    #[test]
    fn dashboard_page_lists_counts_and_alerts() {
        let snapshot = DashboardSnapshot::build(
            vec![
                record(1, Some("Bacterial"), "Yes"),
                record(2, Some("Viral"), "No"),
            ],
            Utc::now(),
        );
        let html = dashboard_page(&snapshot, 5);
        assert!(html.contains(r#"content="5""#));
        assert!(html.contains("Critical<b>1</b>"));
        assert!(html.contains("Patient 1"));
        assert!(!html.contains("Patient 2"));
    }
}
