//! HTML pages for the plant login, data entry and admin screens.
//!
//! Pages are assembled with `format!` around a shared layout; every value
//! that originates from a request or the database goes through
//! [`html_escape`].

use crate::models::plant_record;
use crate::normalization::{RecordColumn, cell};
use crate::session::Flash;

/// Shared page chrome with flash messages rendered above the body.
pub fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    let mut messages = String::new();
    for flash in flashes {
        messages.push_str(&format!(
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.level.as_str(),
            html_escape(&flash.message)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Plant Data</title>
    <style>{css}</style>
</head>
<body>
    <main>
        <h1>{title}</h1>
        {messages}
        {body}
    </main>
</body>
</html>"#,
        title = html_escape(title),
        css = CSS,
        messages = messages,
        body = body,
    )
}

pub fn plant_login_page(flashes: &[Flash]) -> String {
    layout(
        "Plant Login",
        flashes,
        r#"
        <form method="post" action="/" class="login">
            <label>Plant name <input type="text" name="plant_name" required autofocus></label>
            <label>Password <input type="password" name="password" required></label>
            <button type="submit">Log in</button>
        </form>
        <p class="muted"><a href="/login">Admin login</a></p>
        "#,
    )
}

pub fn admin_login_page(flashes: &[Flash]) -> String {
    layout(
        "Admin Login",
        flashes,
        r#"
        <form method="post" action="/login" class="login">
            <label>Username <input type="text" name="username" required autofocus></label>
            <label>Password <input type="password" name="password" required></label>
            <button type="submit">Log in</button>
        </form>
        <p class="muted"><a href="/">Plant login</a></p>
        "#,
    )
}

/// Monthly data entry form. The plant name is prefilled with the logged-in identity.
pub fn record_form_page(plant_name: Option<&str>, flashes: &[Flash]) -> String {
    let fields: String = RecordColumn::EDITABLE
        .iter()
        .map(|column| {
            let value = match column {
                RecordColumn::PlantName => plant_name.unwrap_or_default(),
                _ => "",
            };
            field_input(*column, value)
        })
        .collect();

    let body = format!(
        r#"
        <form method="post" action="/submit" class="record">
            {fields}
            <button type="submit">Submit</button>
        </form>
        <p class="muted"><a href="/plant-logout">Log out</a></p>
        "#
    );
    layout("Monthly Plant Data", flashes, &body)
}

pub fn success_page() -> String {
    layout(
        "Submitted",
        &[],
        r#"
        <p>Your monthly data has been recorded.</p>
        <p><a href="/form">Submit another entry</a> &middot; <a href="/plant-logout">Log out</a></p>
        "#,
    )
}

/// Listing of every record with edit and delete actions.
pub fn admin_page(records: &[plant_record::Model], flashes: &[Flash]) -> String {
    let header: String = RecordColumn::ALL
        .iter()
        .map(|column| format!("<th>{}</th>", html_escape(column.label())))
        .collect();

    let mut rows = String::new();
    for record in records {
        let cells: String = RecordColumn::ALL
            .iter()
            .map(|column| {
                let class = if column.is_numeric() { r#" class="num""# } else { "" };
                format!(
                    "<td{}>{}</td>",
                    class,
                    html_escape(&cell(record, *column).display())
                )
            })
            .collect();

        rows.push_str(&format!(
            r#"
            <tr>
                {cells}
                <td class="actions">
                    <a href="/edit/{id}">Edit</a>
                    <form method="post" action="/delete/{id}" onsubmit="return confirm('Delete record {id}?');">
                        <button type="submit" class="danger">Delete</button>
                    </form>
                </td>
            </tr>"#,
            cells = cells,
            id = record.id,
        ));
    }

    if records.is_empty() {
        rows = format!(
            r#"<tr><td colspan="{}" class="muted">No records yet.</td></tr>"#,
            RecordColumn::ALL.len() + 1
        );
    }

    let body = format!(
        r#"
        <nav class="toolbar">
            <span>{count} record(s)</span>
            <a href="/export">Export to Excel</a>
            <a href="/logout">Log out</a>
        </nav>
        <div class="scroll">
            <table>
                <thead><tr>{header}<th></th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
        "#,
        count = records.len(),
        header = header,
        rows = rows,
    );
    layout("Plant Records", flashes, &body)
}

/// Edit form prefilled with the stored values of one record.
pub fn edit_page(record: &plant_record::Model, flashes: &[Flash]) -> String {
    let fields: String = RecordColumn::EDITABLE
        .iter()
        .map(|column| field_input(*column, &cell(record, *column).display()))
        .collect();

    let body = format!(
        r#"
        <p class="muted">Record {id}, submitted {created_at}</p>
        <form method="post" action="/edit/{id}" class="record">
            {fields}
            <button type="submit">Save</button>
            <a href="/admin">Cancel</a>
        </form>
        "#,
        id = record.id,
        created_at = html_escape(&cell(record, RecordColumn::CreatedAt).display()),
        fields = fields,
    );
    layout("Edit Record", flashes, &body)
}

/// Error page shown for any failed request.
pub fn error_page(status: u16, message: &str, trace_id: Option<&str>) -> String {
    let reference = trace_id
        .map(|id| format!(r#"<p class="muted">Reference: <code>{}</code></p>"#, html_escape(id)))
        .unwrap_or_default();

    let body = format!(
        r#"
        <p>{message}</p>
        {reference}
        <p><a href="/">Back to start</a></p>
        "#,
        message = html_escape(message),
        reference = reference,
    );
    layout(&format!("Error {}", status), &[], &body)
}

fn field_input(column: RecordColumn, value: &str) -> String {
    let name = column.as_str();
    let label = html_escape(column.label());
    let value = html_escape(value);

    if column.is_narrative() {
        format!(
            r#"<label>{label}<textarea name="{name}" rows="3">{value}</textarea></label>"#
        )
    } else if column.is_numeric() {
        format!(
            r#"<label>{label}<input type="number" step="any" name="{name}" value="{value}"></label>"#
        )
    } else {
        format!(r#"<label>{label}<input type="text" name="{name}" value="{value}"></label>"#)
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #222; background: #f6f7f9; }
main { max-width: 1200px; margin: 0 auto; padding: 1.5rem; }
h1 { font-size: 1.4rem; }
form.login, form.record { display: grid; gap: 0.6rem; max-width: 28rem; }
label { display: grid; gap: 0.2rem; font-size: 0.9rem; }
input, textarea { padding: 0.4rem; border: 1px solid #bbb; border-radius: 4px; font: inherit; }
button { padding: 0.45rem 0.9rem; border: 0; border-radius: 4px; background: #2457a6; color: #fff; cursor: pointer; }
button.danger { background: #b3261e; }
.flash { padding: 0.6rem 0.8rem; border-radius: 4px; margin-bottom: 1rem; }
.flash-success { background: #e3f4e6; }
.flash-info { background: #e6eef9; }
.flash-danger { background: #fbe4e2; }
.muted { color: #666; }
.toolbar { display: flex; gap: 1rem; align-items: center; margin-bottom: 1rem; }
.scroll { overflow-x: auto; }
table { border-collapse: collapse; background: #fff; font-size: 0.85rem; }
th, td { border: 1px solid #ddd; padding: 0.3rem 0.5rem; vertical-align: top; }
td.num { text-align: right; }
td.actions { white-space: nowrap; }
td.actions form { display: inline; }
"#;
