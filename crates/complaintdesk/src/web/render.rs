//! Server-side HTML for the form, confirmation, admin and QR pages.
//!
//! Pages are plain strings built from small helpers. All user-supplied text
//! passes through [`escape`] before it reaches the page.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

use crate::complaint::{
    Choice, ComplaintCandidate, ComplaintRecord, IssueType, Permission, Priority, Street,
};
use crate::config::SiteConfig;
use crate::error::{IntakeError, ProvisionError};
use crate::storage::schema;
use crate::validation::{rule_for, Constraint, Field, ValidationErrors, EARLIEST_DATE};

const STYLE: &str = r"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f5f4; color: #1c1917; }
header { background: #1e3a5f; color: #fff; padding: 1.25rem 2rem; }
header h1 { margin: 0; font-size: 1.5rem; }
header p { margin: 0.25rem 0 0; opacity: 0.85; }
nav a { color: #fff; margin-right: 1rem; }
main { max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
.card { background: #fff; border-radius: 0.5rem; padding: 1.5rem; margin-bottom: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
label { display: block; font-weight: 600; margin-bottom: 0.25rem; }
input, select, textarea { width: 100%; padding: 0.5rem; box-sizing: border-box; }
.field { margin-bottom: 1rem; }
.error { color: #b91c1c; font-size: 0.875rem; margin: 0.25rem 0 0; }
.error:empty { display: none; }
.banner { border-radius: 0.5rem; padding: 1rem; margin-bottom: 1rem; }
.banner.warning { background: #fef3c7; border: 1px solid #f59e0b; }
.banner.danger { background: #fee2e2; border: 1px solid #ef4444; }
.banner.success { background: #dcfce7; border: 1px solid #22c55e; }
.badge { display: inline-block; border-radius: 9999px; padding: 0.125rem 0.625rem; color: #fff; font-size: 0.75rem; }
pre { background: #1c1917; color: #f5f5f4; padding: 1rem; overflow-x: auto; border-radius: 0.375rem; }
button, .button { background: #1e3a5f; color: #fff; border: 0; border-radius: 0.375rem; padding: 0.625rem 1.25rem; cursor: pointer; text-decoration: none; display: inline-block; }
dl { display: grid; grid-template-columns: max-content 1fr; gap: 0.25rem 1rem; }
dt { font-weight: 600; }
dd { margin: 0; }
@media print { header nav, form.settings, .no-print { display: none; } }
";

const VALIDATE_SCRIPT: &str = r"
document.getElementById('complaint-form').addEventListener('submit', async (event) => {
  event.preventDefault();
  const form = event.target;
  const body = Object.fromEntries(new FormData(form).entries());
  form.querySelectorAll('[data-error-for]').forEach((el) => { el.textContent = ''; });
  try {
    const response = await fetch('/api/validate', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    });
    const report = await response.json();
    if (report.valid) { form.submit(); return; }
    for (const error of report.errors) {
      const el = form.querySelector(`[data-error-for='${error.field}']`);
      if (el && !el.textContent) { el.textContent = error.message; }
    }
  } catch (_) {
    form.submit();
  }
});
";

/// A notice shown above the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner<'a> {
    /// The complaints table has not been provisioned.
    SchemaMissing,
    /// Storage rejected the submission.
    Persistence(&'a str),
}

/// Everything the complaint form needs to render.
#[derive(Debug, Default)]
pub struct FormView<'a> {
    /// Values to pre-fill, typically the rejected submission.
    pub values: Option<&'a ComplaintCandidate>,
    /// Field violations to show next to their inputs.
    pub errors: Option<&'a ValidationErrors>,
    /// Page-level notice.
    pub banner: Option<Banner<'a>>,
}

impl<'a> FormView<'a> {
    /// Re-render after a failed submission.
    #[must_use]
    pub fn after_failure(candidate: &'a ComplaintCandidate, err: &'a IntakeError) -> Self {
        let banner = match err {
            IntakeError::Validation(_) => None,
            IntakeError::SchemaMissing => Some(Banner::SchemaMissing),
            IntakeError::Persistence { message } => Some(Banner::Persistence(message)),
        };
        Self {
            values: Some(candidate),
            errors: err.validation_errors(),
            banner,
        }
    }

    fn value(&self, field: Field) -> &str {
        self.values.map_or("", |v| v.value(field))
    }

    fn error(&self, field: Field) -> &str {
        self.errors
            .and_then(|errors| errors.message_for(field))
            .unwrap_or("")
    }
}

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
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

/// Uppercase the first character, leaving the rest untouched.
#[must_use]
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// English ordinal suffix for a day of the month.
#[must_use]
pub fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// A date such as `January 1st, 2024`.
#[must_use]
pub fn format_long_date(date: NaiveDate) -> String {
    let day = date.day();
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        day,
        ordinal_suffix(day),
        date.year()
    )
}

/// A timestamp such as `January 1st, 2024 3:04 PM`, in the timestamp's zone.
#[must_use]
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{} {}",
        format_long_date(timestamp.date_naive()),
        timestamp.format("%-I:%M %p")
    )
}

fn layout(site: &SiteConfig, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {community}</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<h1>{community}</h1>
<p>Managed by {organization}</p>
<nav><a href="/">Submit a complaint</a><a href="/admin">Admin</a><a href="/qr-code">QR code</a></nav>
</header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        community = escape(&site.community_name),
        organization = escape(&site.organization),
    )
}

fn error_slot(field: Field, message: &str) -> String {
    format!(
        r#"<p class="error" data-error-for="{}">{}</p>"#,
        field.name(),
        escape(message)
    )
}

/// `minlength` attribute for fields whose rule is a length minimum.
fn min_length_attr(field: Field) -> String {
    match rule_for(field).map(|rule| rule.constraint) {
        Some(Constraint::MinChars(min)) if min > 1 => format!(r#" minlength="{min}""#),
        _ => String::new(),
    }
}

fn text_input(view: &FormView<'_>, field: Field, input_type: &str) -> String {
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><input type="{input_type}" id="{name}" name="{name}" value="{value}"{min}>{error}</div>"#,
        name = field.name(),
        label = field.label(),
        value = escape(view.value(field)),
        min = min_length_attr(field),
        error = error_slot(field, view.error(field)),
    )
}

fn select<C: Choice>(view: &FormView<'_>, field: Field, placeholder: &str) -> String {
    let current = view.value(field);
    let mut options = format!(r#"<option value="">{}</option>"#, escape(placeholder));
    for choice in C::ALL {
        let selected = if choice.as_str() == current { " selected" } else { "" };
        options.push_str(&format!(
            r#"<option value="{}"{selected}>{}</option>"#,
            choice.as_str(),
            escape(choice.label())
        ));
    }
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><select id="{name}" name="{name}">{options}</select>{error}</div>"#,
        name = field.name(),
        label = field.label(),
        error = error_slot(field, view.error(field)),
    )
}

fn permission_radios(view: &FormView<'_>) -> String {
    let field = Field::Permission;
    let current = view.value(field);
    let radios: String = Permission::ALL
        .iter()
        .map(|choice| {
            let checked = if choice.as_str() == current { " checked" } else { "" };
            format!(
                r#"<label><input type="radio" name="{}" value="{}"{checked}> {}</label>"#,
                field.name(),
                choice.as_str(),
                escape(choice.label())
            )
        })
        .collect();
    format!(
        r#"<div class="field"><fieldset><legend>{}</legend>{radios}</fieldset>{}</div>"#,
        field.label(),
        error_slot(field, view.error(field))
    )
}

fn form_banner(banner: Banner<'_>) -> String {
    match banner {
        Banner::SchemaMissing => format!(
            r#"<div class="banner warning"><strong>Database setup required.</strong> {} <a href="/admin">Go to admin page</a></div>"#,
            escape(&IntakeError::SchemaMissing.to_string())
        ),
        Banner::Persistence(message) => format!(
            r#"<div class="banner danger"><strong>Your complaint could not be saved.</strong> {}</div>"#,
            escape(message)
        ),
    }
}

/// The complaint form.
#[must_use]
pub fn complaint_form(site: &SiteConfig, view: &FormView<'_>, today: NaiveDate) -> String {
    let banner = view.banner.map(form_banner).unwrap_or_default();
    let date = Field::DateNoticed;
    let description = Field::Description;

    let body = format!(
        r#"{banner}<div class="card">
<h2>Maintenance Complaint Form</h2>
<p>Report a maintenance issue in your unit or building. Staff will follow up by email or phone.</p>
<form id="complaint-form" method="post" action="/" novalidate>
<div class="grid">{first}{last}</div>
<div class="grid">{email}{phone}</div>
<div class="grid">{street}{unit}</div>
<div class="grid">{issue}{priority}</div>
<div class="field"><label for="{date_name}">{date_label}</label><input type="date" id="{date_name}" name="{date_name}" min="{min}" max="{max}" value="{date_value}">{date_error}</div>
<div class="field"><label for="{desc_name}">{desc_label}</label><textarea id="{desc_name}" name="{desc_name}" rows="5"{desc_min}>{desc_value}</textarea>{desc_error}</div>
{permission}
<button type="submit">Submit Complaint</button>
</form>
</div>
<script>{VALIDATE_SCRIPT}</script>"#,
        first = text_input(view, Field::FirstName, "text"),
        last = text_input(view, Field::LastName, "text"),
        email = text_input(view, Field::Email, "email"),
        phone = text_input(view, Field::Phone, "tel"),
        street = select::<Street>(view, Field::Street, "Select your street"),
        unit = text_input(view, Field::Unit, "text"),
        issue = select::<IssueType>(view, Field::IssueType, "Select issue type"),
        priority = select::<Priority>(view, Field::Priority, "Select priority"),
        date_name = date.name(),
        date_label = date.label(),
        min = EARLIEST_DATE.format("%Y-%m-%d"),
        max = today.format("%Y-%m-%d"),
        date_value = escape(view.value(date)),
        date_error = error_slot(date, view.error(date)),
        desc_name = description.name(),
        desc_label = description.label(),
        desc_value = escape(view.value(description)),
        desc_min = min_length_attr(description),
        desc_error = error_slot(description, view.error(description)),
        permission = permission_radios(view),
    );
    layout(site, "Submit a Complaint", &body)
}

/// Shown after a complaint is stored.
#[must_use]
pub fn confirmation(site: &SiteConfig) -> String {
    let body = format!(
        r#"<div class="card">
<h2>Complaint Submitted</h2>
<p>Thank you. Your complaint has been received and {} staff will review it shortly.</p>
<a class="button" href="/">Submit Another Complaint</a>
</div>"#,
        escape(&site.organization)
    );
    layout(site, "Complaint Submitted", &body)
}

fn complaint_card(record: &ComplaintRecord) -> String {
    let tag = record.priority_tag();
    let submitted = record.created_at.map_or_else(
        || "Date not recorded".to_string(),
        |ts| format_timestamp(&ts.with_timezone(&Local)),
    );
    let noticed = record
        .date_noticed
        .map_or_else(|| "Not specified".to_string(), format_long_date);
    let permission = if record.permits_entry() {
        "Yes"
    } else {
        "No, resident wants to be present"
    };

    format!(
        r#"<div class="card complaint" data-id="{id}">
<h3>{first} {last} <span class="badge priority-{tag}" style="background: {color}">{priority}</span></h3>
<p>Submitted {submitted}</p>
<dl>
<dt>Email</dt><dd>{email}</dd>
<dt>Phone</dt><dd>{phone}</dd>
<dt>Address</dt><dd>{unit} {street}</dd>
<dt>Issue type</dt><dd>{issue}</dd>
<dt>Date noticed</dt><dd>{noticed}</dd>
<dt>Permission to enter</dt><dd>{permission}</dd>
</dl>
<p>{description}</p>
</div>"#,
        id = record.id,
        first = escape(&record.first_name),
        last = escape(&record.last_name),
        color = tag.css_color(),
        priority = escape(&capitalize_first(&record.priority)),
        email = escape(&record.email),
        phone = escape(&record.phone),
        unit = escape(&record.unit),
        street = escape(&capitalize_first(&record.street)),
        issue = escape(&capitalize_first(&record.issue_type)),
        description = escape(&record.description),
    )
}

fn provisioning_prompt(database: &str, failure: Option<&ProvisionError>) -> String {
    let failure = failure
        .map(|err| {
            format!(
                r#"<div class="banner danger">{}</div>"#,
                escape(&err.message)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class="card">
<h2>Database Setup Required</h2>
{failure}<p>The complaints table doesn't exist yet. Create it automatically:</p>
<form method="post" action="/admin/provision"><button type="submit">Create Complaints Table</button></form>
<h3>Manual setup</h3>
<ol>
<li>Open the database: <code>sqlite3 {database}</code></li>
<li>Run the following SQL:</li>
</ol>
<pre>{sql}</pre>
<p>Or run <code>complaintdesk provision</code> on the server.</p>
</div>"#,
        database = escape(database),
        sql = escape(&schema::manual_setup_sql()),
    )
}

fn error_panel(message: &str) -> String {
    format!(
        r#"<div class="card">
<div class="banner danger"><strong>Error loading complaints.</strong> {}</div>
<a class="button" href="/">Back to Form</a>
</div>"#,
        escape(message)
    )
}

/// The admin listing.
///
/// `listing` is the outcome of listing complaints; `notice` is shown above it.
#[must_use]
pub fn admin(
    site: &SiteConfig,
    database: &str,
    listing: &Result<Vec<ComplaintRecord>, IntakeError>,
    notice: Option<&str>,
) -> String {
    let notice = notice
        .map(|n| format!(r#"<div class="banner success">{}</div>"#, escape(n)))
        .unwrap_or_default();

    let content = match listing {
        Ok(records) if records.is_empty() => {
            r#"<div class="card"><p>No complaints have been submitted yet.</p></div>"#.to_string()
        }
        Ok(records) => {
            let cards: String = records.iter().map(complaint_card).collect();
            format!("<p>{} complaint(s), newest first.</p>{cards}", records.len())
        }
        Err(IntakeError::SchemaMissing) => provisioning_prompt(database, None),
        Err(err) => error_panel(&err.to_string()),
    };

    layout(
        site,
        "Complaint Admin",
        &format!("{}{notice}{content}", admin_header()),
    )
}

fn admin_header() -> String {
    r#"<div class="admin-header"><h2>Submitted Complaints</h2>
<form class="no-print" method="post" action="/admin/provision"><button type="submit">Reset Database Table</button></form>
</div>"#
        .to_string()
}

/// The admin page after provisioning failed.
#[must_use]
pub fn provision_failed(site: &SiteConfig, database: &str, err: &ProvisionError) -> String {
    layout(
        site,
        "Complaint Admin",
        &format!(
            "{}{}",
            admin_header(),
            provisioning_prompt(database, Some(err))
        ),
    )
}

/// The QR code page: settings, preview and print/download actions.
///
/// `preview` is the inline SVG, or the reason it could not be drawn.
#[must_use]
pub fn qr_page(
    site: &SiteConfig,
    url: &str,
    size: u32,
    preview: Result<&str, &str>,
) -> String {
    let size_text = size.to_string();
    let query = serde_urlencoded::to_string([("url", url), ("size", size_text.as_str())])
        .unwrap_or_default();
    let preview = match preview {
        Ok(svg) => format!(
            r#"<div class="qr">{svg}</div>
<p>Scan to open the complaint form:<br><code>{}</code></p>
<p class="no-print"><button type="button" onclick="window.print()">Print</button>
<a class="button" href="/qr-code.svg?{}">Download SVG</a>
<button type="button" data-url="{}" onclick="navigator.clipboard.writeText(this.dataset.url)">Copy URL</button></p>"#,
            escape(url),
            escape(&query),
            escape(url)
        ),
        Err(reason) => format!(r#"<div class="banner danger">{}</div>"#, escape(reason)),
    };

    let body = format!(
        r#"<div class="card">
<h2>Complaint Form QR Code</h2>
<form class="settings" method="get" action="/qr-code">
<div class="grid">
<div class="field"><label for="url">Form URL</label><input type="url" id="url" name="url" value="{url}"></div>
<div class="field"><label for="size">Size (px)</label><input type="number" id="size" name="size" min="{min}" max="{max}" value="{size}"></div>
</div>
<button type="submit">Update</button>
</form>
{preview}
</div>"#,
        url = escape(url),
        min = super::qr::MIN_SIZE,
        max = super::qr::MAX_SIZE,
    );
    layout(site, "QR Code", &body)
}
