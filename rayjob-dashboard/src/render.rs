//! HTML rendering
//!
//! Small server-side pages over job records. Everything taken from a record
//! goes through `escape_html`, since logs are arbitrary program output.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rayjob_core::domain::JobRecord;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;width:100%}\
th,td{border-bottom:1px solid #ddd;padding:.4rem .6rem;text-align:left}\
nav a{margin-right:1rem}\
pre{background:#f6f6f6;padding:1rem;overflow-x:auto;white-space:pre-wrap}\
.status{font-weight:bold}";

/// Escapes text for use in HTML element content and attribute values
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Ray Jobs Dashboard</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n<nav><a href=\"/\">Active jobs</a><a href=\"/completed\">Completed jobs</a></nav>\n\
         <h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn job_link(record: &JobRecord) -> String {
    let name = escape_html(&record.job_name);
    format!("<a href=\"/jobs/{name}\">{name}</a>")
}

fn job_table(records: &[JobRecord], with_end_time: bool, empty: &str) -> String {
    if records.is_empty() {
        return format!("<p>{}</p>", escape_html(empty));
    }

    let mut html = String::from("<table>\n<tr><th>Job name</th><th>Status</th><th>Start time</th>");
    if with_end_time {
        html.push_str("<th>End time</th>");
    }
    html.push_str("</tr>\n");

    for record in records {
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"status\">{}</td><td>{}</td>",
            job_link(record),
            escape_html(record.status.as_str()),
            format_time(record.start_time),
        ));
        if with_end_time {
            html.push_str(&format!("<td>{}</td>", format_time(record.end_time)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>");
    html
}

/// Page listing jobs that have not finished yet
pub fn active_page(records: &[JobRecord]) -> String {
    layout(
        "Active jobs",
        &job_table(records, false, "No active jobs."),
    )
}

/// Page listing finished jobs
pub fn completed_page(records: &[JobRecord]) -> String {
    layout(
        "Completed jobs",
        &job_table(records, true, "No completed jobs yet."),
    )
}

/// Detail page for one job, including its logs
pub fn detail_page(record: &JobRecord) -> String {
    let body = format!(
        "<table>\n\
         <tr><th>Status</th><td class=\"status\">{status}</td></tr>\n\
         <tr><th>Start time</th><td>{start}</td></tr>\n\
         <tr><th>End time</th><td>{end}</td></tr>\n\
         </table>\n<h2>Logs</h2>\n<pre>{logs}</pre>",
        status = escape_html(record.status.as_str()),
        start = format_time(record.start_time),
        end = format_time(record.end_time),
        logs = escape_html(&record.logs),
    );

    layout(&record.job_name, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    layout(
        status.canonical_reason().unwrap_or("Error"),
        &format!("<p>{}</p>", escape_html(message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rayjob_core::domain::JobStatus;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_detail_page_escapes_logs() {
        let record = JobRecord::finished(
            "alpha",
            JobStatus::Succeeded,
            "<b>done</b>".to_string(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            None,
        );

        let html = detail_page(&record);
        assert!(html.contains("&lt;b&gt;done&lt;/b&gt;"));
        assert!(!html.contains("<b>done</b>"));
        assert!(html.contains("2024-01-01 00:00:00"));
        assert!(html.contains("<td>-</td>"));
    }

    #[test]
    fn test_completed_page_shows_end_time_column() {
        let record = JobRecord::finished(
            "alpha",
            JobStatus::Failed,
            String::new(),
            None,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap()),
        );

        let html = completed_page(&[record]);
        assert!(html.contains("<th>End time</th>"));
        assert!(html.contains("2024-01-01 00:10:00"));
        assert!(html.contains("<a href=\"/jobs/alpha\">alpha</a>"));
    }

    #[test]
    fn test_empty_tables() {
        assert!(active_page(&[]).contains("No active jobs."));
        assert!(!active_page(&[]).contains("<table>"));
    }
}
