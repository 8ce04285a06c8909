//! HTML rendering of the front-end pages

use super::page::Page;
use crate::data::{EmployeeRecord, CHOICE_FIELDS, NUMERIC_FIELDS, SAMPLE_FILE_NAME};
use crate::inference::format_currency;
use serde_json::{Map, Value};
use std::fmt::Write;

pub const APP_TITLE: &str = "Salary Predictor";
pub const DEVELOPER: &str = "Sambhasis Jena";
pub const CONTACT_EMAIL: &str = "sambhasis.jena245@gmail.com";

pub const HOME_INTRO: &str = "This application predicts employee salaries from factors such as \
education level, experience, job role and location.";

pub const FEEDBACK_TEXT: &str = "If you have any suggestions, feedback, or encounter issues, \
feel free to get in touch. We appreciate your input to help improve the app!";

/// Everything a page shows besides its fixed layout
#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Values shown in the manual entry form
    pub record: EmployeeRecord,
    pub prediction: Option<f64>,
    pub error: Option<String>,
    /// First rows of an uploaded file
    pub preview: Option<Vec<Map<String, Value>>>,
    pub model_name: Option<String>,
}

impl PageView {
    pub fn with_record(mut self, record: EmployeeRecord) -> Self {
        self.record = record;
        self
    }

    pub fn with_prediction(mut self, prediction: f64) -> Self {
        self.prediction = Some(prediction);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_preview(mut self, rows: Vec<Map<String, Value>>) -> Self {
        self.preview = Some(rows);
        self
    }

    pub fn with_model(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }
}

/// Render a full HTML document for `page`
pub fn render_page(page: Page, view: &PageView) -> String {
    let body = match page {
        Page::Home => render_home(view),
        Page::ManualEntry => render_manual(view),
        Page::BulkUpload => render_bulk(view),
        Page::Feedback => render_feedback(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · {app}</title>
    <style>{style}</style>
</head>
<body>
    <aside><h2>Menu</h2>{nav}</aside>
    <main>{body}</main>
</body>
</html>"#,
        title = page.title(),
        app = APP_TITLE,
        style = STYLE,
        nav = render_nav(page),
        body = body,
    )
}

const STYLE: &str = "body{font-family:sans-serif;display:flex;margin:0;background:#f5f7fb;color:#1f2933}\
aside{width:200px;padding:24px;background:#1f2933;min-height:100vh}\
aside h2{color:#e4e7eb;font-size:16px}\
aside a{display:block;padding:8px 12px;margin:4px 0;border-radius:6px;color:#cbd2d9;text-decoration:none}\
aside a.active{background:#3e4c59;color:#fff}\
main{flex:1;padding:32px 48px}\
.grid{display:grid;grid-template-columns:repeat(3,1fr);gap:16px}\
label{display:block;font-size:14px;margin-bottom:4px}\
select,input{width:100%;padding:6px}\
.success{background:#e3f9e5;border-left:4px solid #31b237;padding:12px;margin-top:16px}\
.error{background:#ffe3e3;border-left:4px solid #e12d39;padding:12px;margin-top:16px}\
table{border-collapse:collapse;margin-top:12px}td,th{border:1px solid #cbd2d9;padding:4px 8px}\
button{margin-top:16px;padding:8px 16px}";

fn render_nav(active: Page) -> String {
    Page::ALL
        .iter()
        .map(|page| {
            let class = if *page == active { " class=\"active\"" } else { "" };
            format!(
                "<a href=\"/?page={}\"{}>{}</a>",
                page.as_query(),
                class,
                page.title()
            )
        })
        .collect()
}

fn render_home(view: &PageView) -> String {
    let model = view
        .model_name
        .as_deref()
        .map(|name| format!("<p>Current model: <strong>{}</strong></p>", escape_html(name)))
        .unwrap_or_default();

    format!(
        "<h1>Welcome to {app}</h1>\
<p>{intro}</p>\
<p><strong>You can choose:</strong></p>\
<ul>\
<li><a href=\"/?page=manual\"><strong>Manual Entry</strong></a> to input one employee's details and get a prediction</li>\
<li><a href=\"/?page=bulk\"><strong>Bulk Upload</strong></a> to upload a CSV file and predict for many employees at once</li>\
</ul>{model}\
<p><strong>Developed by:</strong> {dev}<br><strong>Contact:</strong> {email}</p>",
        app = APP_TITLE,
        intro = HOME_INTRO,
        model = model,
        dev = DEVELOPER,
        email = CONTACT_EMAIL,
    )
}

fn render_manual(view: &PageView) -> String {
    let record = &view.record;
    let mut fields = String::new();

    for field in CHOICE_FIELDS {
        let current = record
            .categorical_values()
            .iter()
            .find(|(name, _)| *name == field.name)
            .map(|(_, value)| *value)
            .unwrap_or_default();
        let _ = write!(
            fields,
            "<div><label for=\"{0}\">{1}</label><select id=\"{0}\" name=\"{0}\">",
            field.name, field.label
        );
        for option in field.options {
            let selected = if *option == current { " selected" } else { "" };
            let _ = write!(fields, "<option{}>{}</option>", selected, escape_html(option));
        }
        fields.push_str("</select></div>");
    }

    for field in NUMERIC_FIELDS {
        let current = record
            .numeric_values()
            .iter()
            .find(|(name, _)| *name == field.name)
            .map(|(_, value)| *value)
            .unwrap_or(field.default);
        let _ = write!(
            fields,
            "<div><label for=\"{0}\">{1} ({2}–{3})</label>\
<input type=\"number\" id=\"{0}\" name=\"{0}\" min=\"{2}\" max=\"{3}\" step=\"1\" value=\"{4}\"></div>",
            field.name, field.label, field.min, field.max, current
        );
    }

    format!(
        "<h1>Manual Entry</h1><h3>Enter employee details:</h3>\
<form method=\"post\" action=\"/manual\"><div class=\"grid\">{fields}</div>\
<button type=\"submit\">Predict Salary</button></form>{outcome}",
        fields = fields,
        outcome = render_outcome(view),
    )
}

fn render_outcome(view: &PageView) -> String {
    if let Some(error) = &view.error {
        return format!("<div class=\"error\">{}</div>", escape_html(error));
    }
    match view.prediction {
        Some(value) => format!(
            "<div class=\"success\">Predicted Salary: <strong>{}</strong></div>",
            format_currency(value)
        ),
        None => String::new(),
    }
}

fn render_bulk(view: &PageView) -> String {
    let mut html = format!(
        "<h1>Bulk Upload</h1><h3>Upload a CSV file to predict salaries for multiple entries.</h3>\
<p><a href=\"/api/sample\" download=\"{sample}\">Download Sample CSV</a></p>\
<form method=\"post\" enctype=\"multipart/form-data\" action=\"/bulk\">\
<input type=\"file\" name=\"file\" accept=\".csv\" required>\
<button type=\"submit\" formaction=\"/bulk\">Preview</button> \
<button type=\"submit\" formaction=\"/api/bulk/predict\">Predict for All Rows</button></form>",
        sample = SAMPLE_FILE_NAME,
    );

    if let Some(error) = &view.error {
        let _ = write!(html, "<div class=\"error\">{}</div>", escape_html(error));
    }

    if let Some(rows) = &view.preview {
        html.push_str("<h3>Uploaded CSV Preview:</h3>");
        html.push_str(&render_table(rows));
    }

    html
}

fn render_table(rows: &[Map<String, Value>]) -> String {
    let Some(first) = rows.first() else {
        return "<p>The file has no rows.</p>".to_string();
    };

    let mut html = String::from("<table><tr>");
    for name in first.keys() {
        let _ = write!(html, "<th>{}</th>", escape_html(name));
    }
    html.push_str("</tr>");

    for row in rows {
        html.push_str("<tr>");
        for value in row.values() {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            let _ = write!(html, "<td>{}</td>", escape_html(&text));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

fn render_feedback() -> String {
    format!(
        "<h1>Feedback / Suggestions</h1><p>{}</p><p>Contact: <a href=\"mailto:{email}\"><strong>{email}</strong></a></p>",
        FEEDBACK_TEXT,
        email = CONTACT_EMAIL,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_marks_active_page() {
        let html = render_page(Page::BulkUpload, &PageView::default());
        assert!(html.contains("<a href=\"/?page=bulk\" class=\"active\">Bulk Upload</a>"));
        assert!(html.contains("<a href=\"/?page=home\">Home</a>"));
    }

    #[test]
    fn test_manual_shows_prediction() {
        let view = PageView::default().with_prediction(65_432.1);
        let html = render_page(Page::ManualEntry, &view);
        assert!(html.contains("$65,432.10"));
        assert!(html.contains("name=\"working_hours\""));
    }

    #[test]
    fn test_manual_keeps_selected_values() {
        let view = PageView::default().with_record(EmployeeRecord::sample());
        let html = render_page(Page::ManualEntry, &view);
        assert!(html.contains("<option selected>Data Scientist</option>"));
        assert!(html.contains("value=\"5\""));
    }

    #[test]
    fn test_error_is_escaped() {
        let view =
            PageView::default().with_error("Invalid value for 'job_title': unseen category '<b>'");
        let html = render_page(Page::BulkUpload, &view);
        assert!(html.contains("job_title"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("'<b>'"));
    }

    #[test]
    fn test_feedback_has_contact() {
        let html = render_page(Page::Feedback, &PageView::default());
        assert!(html.contains(CONTACT_EMAIL));
    }

    #[test]
    fn test_preview_table() {
        let mut row = Map::new();
        row.insert("job_title".to_string(), Value::String("Analyst".to_string()));
        row.insert("age".to_string(), Value::from(30));
        let html = render_page(Page::BulkUpload, &PageView::default().with_preview(vec![row]));
        assert!(html.contains("<th>job_title</th>"));
        assert!(html.contains("<td>30</td>"));
    }
}
