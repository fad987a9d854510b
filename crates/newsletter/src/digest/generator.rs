//! Digest content generator.
//!
//! Builds the weekly email from the accumulated category rows. Pure: the
//! same rows and date always give the same document.

use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

use crate::extract::truncate;
use crate::storage::{meaningful, Accumulated, Expert, Opportunity};

const TITLE_MAX_CHARS: usize = 90;
const DESCRIPTION_MAX_CHARS: usize = 160;

const EMPTY_SECTION: &str = r#"<div class="no-data">
                <div class="no-data-icon">📭</div>
                <div class="no-data-text">No items curated this week</div>
            </div>"#;

/// A rendered digest ready to hand to the mail transport.
#[derive(Debug, Clone)]
pub struct RenderedDigest {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Generates digest email content.
pub struct DigestGenerator;

impl DigestGenerator {
    /// Render subject, HTML and plain-text bodies.
    #[must_use]
    pub fn render(data: &Accumulated, today: NaiveDate) -> RenderedDigest {
        RenderedDigest {
            subject: Self::subject(today),
            html: Self::generate_html(data, today),
            text: Self::generate_text(data, today),
        }
    }

    /// Email subject line.
    #[must_use]
    pub fn subject(today: NaiveDate) -> String {
        format!(
            "Climate Cardinals Weekly Intelligence - {}",
            today.format("%B %d, %Y")
        )
    }

    /// Generate the HTML document.
    #[must_use]
    pub fn generate_html(data: &Accumulated, today: NaiveDate) -> String {
        let week_num = today.iso_week().week();
        let date_str = today.format("%A, %B %d, %Y").to_string();

        let experts_html = Self::cards(&data.experts, Self::expert_card);
        let grants_html = Self::cards(&data.grants, Self::opportunity_card);
        let events_html = Self::cards(&data.events, Self::opportunity_card);
        let reports_html = Self::cards(&data.reports, Self::opportunity_card);

        let sections = [
            Self::section(
                data.experts.len(),
                "Connect",
                "Climate Experts",
                "Leaders and decision-makers in the climate space open to partnerships.",
                &experts_html,
            ),
            Self::section(
                data.grants.len(),
                "Fund",
                "Grants &amp; Funding",
                "Active grant programs and funding calls for climate work.",
                &grants_html,
            ),
            Self::section(
                data.events.len(),
                "Gather",
                "Events &amp; Conferences",
                "Upcoming gatherings where climate leaders meet.",
                &events_html,
            ),
            Self::section(
                data.reports.len(),
                "Learn",
                "ESG &amp; Sustainability Reports",
                "Recent corporate sustainability disclosures.",
                &reports_html,
            ),
        ]
        .join("\n");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Climate Cardinals Weekly Intelligence</title>
    <style>
        body {{
            font-family: Georgia, 'Times New Roman', serif;
            line-height: 1.6;
            color: #1f2937;
            background-color: #f4f1ea;
            margin: 0;
            padding: 20px;
        }}
        .container {{
            max-width: 680px;
            margin: 0 auto;
            background: #ffffff;
            border: 1px solid #e5e0d5;
        }}
        .masthead {{
            background: #14532d;
            color: #f0fdf4;
            padding: 36px 32px 20px;
        }}
        .issue-label {{
            font-size: 11px;
            letter-spacing: 2px;
            text-transform: uppercase;
            opacity: 0.8;
        }}
        .masthead-title {{
            font-size: 38px;
            margin: 8px 0 4px;
        }}
        .date-bar {{
            border-top: 1px solid rgba(240, 253, 244, 0.3);
            margin-top: 16px;
            padding-top: 10px;
            font-size: 13px;
        }}
        .editorial {{
            padding: 24px 32px;
            border-bottom: 1px solid #e5e0d5;
            font-style: italic;
        }}
        .section {{
            padding: 28px 32px;
            border-bottom: 1px solid #e5e0d5;
        }}
        .item-count {{
            float: right;
            font-size: 34px;
            font-weight: 700;
            color: #bbf7d0;
        }}
        .section-kicker {{
            font-size: 11px;
            letter-spacing: 2px;
            text-transform: uppercase;
            color: #15803d;
        }}
        .section-title {{
            font-size: 24px;
            margin: 4px 0;
        }}
        .section-description {{
            color: #6b7280;
            font-size: 14px;
        }}
        .expert-card, .opportunity-card {{
            border-left: 3px solid #15803d;
            padding: 12px 16px;
            margin: 16px 0;
            background: #fafaf7;
        }}
        .card-title, .expert-name {{
            font-weight: 700;
            font-size: 16px;
        }}
        .card-meta, .expert-role, .expert-org {{
            font-size: 13px;
            color: #4b5563;
        }}
        .meta-item {{
            display: inline-block;
            margin-right: 12px;
        }}
        .card-description {{
            font-size: 14px;
            margin: 8px 0;
        }}
        .card-link, .expert-link {{
            color: #15803d;
            font-size: 13px;
            font-weight: 700;
        }}
        .no-data {{
            text-align: center;
            color: #9ca3af;
            padding: 24px;
        }}
        .footer {{
            padding: 28px 32px;
            text-align: center;
            font-size: 12px;
            color: #6b7280;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="masthead">
            <div class="issue-label">Weekly Intelligence &bull; Issue #{week_num}</div>
            <h1 class="masthead-title">Climate Cardinals</h1>
            <div class="masthead-subtitle">Curated opportunities for climate action leaders</div>
            <div class="date-bar">{date_str} &bull; Week {week_num}</div>
        </div>
        <div class="editorial">
            This week brings {grants} funding opportunities, {events} upcoming climate events,
            {experts} expert connections and {reports} sustainability reports.
        </div>
{sections}
        <div class="footer">
            <strong>Climate Cardinals</strong><br>
            &copy; {year} Climate Cardinals &bull; Weekly Intelligence Report
        </div>
    </div>
</body>
</html>
"#,
            grants = data.grants.len(),
            events = data.events.len(),
            experts = data.experts.len(),
            reports = data.reports.len(),
            year = today.year(),
        )
    }

    fn section(count: usize, kicker: &str, title: &str, description: &str, body: &str) -> String {
        format!(
            r#"        <div class="section">
            <div class="item-count">{count:02}</div>
            <div class="section-kicker">{kicker}</div>
            <h2 class="section-title">{title}</h2>
            <p class="section-description">{description}</p>
            {body}
        </div>"#
        )
    }

    fn cards<R>(rows: &[R], card: fn(&R) -> String) -> String {
        if rows.is_empty() {
            return EMPTY_SECTION.to_string();
        }
        rows.iter().map(card).collect::<Vec<_>>().join("\n")
    }

    fn opportunity_card(row: &Opportunity) -> String {
        let mut meta = String::new();
        if let Some(date) = meaningful(row.date_info.as_deref()) {
            let _ = write!(
                meta,
                r#"<span class="meta-item meta-date">📅 {}</span>"#,
                html_escape(date)
            );
        }
        if let Some(domain) = meaningful(row.domain.as_deref()) {
            let _ = write!(
                meta,
                r#"<span class="meta-item meta-domain">🌐 {}</span>"#,
                html_escape(domain)
            );
        }

        let meta_html = if meta.is_empty() {
            String::new()
        } else {
            format!(r#"<div class="card-meta">{meta}</div>"#)
        };

        let description_html = meaningful(row.description.as_deref())
            .map(|d| {
                format!(
                    r#"<div class="card-description">{}</div>"#,
                    html_escape(&truncate(d, DESCRIPTION_MAX_CHARS))
                )
            })
            .unwrap_or_default();

        let link_html = link(row.url.as_deref())
            .map(|url| format!(r#"<a href="{url}" class="card-link">Read more &rarr;</a>"#))
            .unwrap_or_default();

        format!(
            r#"<div class="opportunity-card">
                <div class="card-title">{title}</div>
                {meta_html}
                {description_html}
                {link_html}
            </div>"#,
            title = html_escape(&truncate(&row.title, TITLE_MAX_CHARS)),
        )
    }

    fn expert_card(row: &Expert) -> String {
        let role_html = meaningful(row.role.as_deref())
            .map(|r| format!(r#"<div class="expert-role">{}</div>"#, html_escape(r)))
            .unwrap_or_default();
        let org_html = meaningful(row.organization.as_deref())
            .map(|o| format!(r#"<div class="expert-org">{}</div>"#, html_escape(o)))
            .unwrap_or_default();
        let link_html = link(row.profile_url.as_deref())
            .map(|url| format!(r#"<a href="{url}" class="expert-link">View profile &rarr;</a>"#))
            .unwrap_or_default();

        format!(
            r#"<div class="expert-card">
                <div class="expert-name">{name}</div>
                {role_html}
                {org_html}
                {link_html}
            </div>"#,
            name = html_escape(&row.name),
        )
    }

    /// Generate the plain-text alternative body.
    #[must_use]
    pub fn generate_text(data: &Accumulated, today: NaiveDate) -> String {
        let mut text = format!(
            "CLIMATE CARDINALS - WEEKLY INTELLIGENCE\n{date}  |  Week {week}\n{rule}\n\n",
            date = today.format("%B %d, %Y"),
            week = today.iso_week().week(),
            rule = "=".repeat(60),
        );

        text.push_str("CLIMATE EXPERTS\n");
        text.push_str(&"-".repeat(40));
        text.push('\n');
        if data.experts.is_empty() {
            text.push_str("No items curated this week\n");
        }
        for expert in &data.experts {
            let _ = writeln!(text, "* {}", expert.name);
            let detail: Vec<&str> = [expert.role.as_deref(), expert.organization.as_deref()]
                .into_iter()
                .filter_map(meaningful)
                .collect();
            if !detail.is_empty() {
                let _ = writeln!(text, "  {}", detail.join(", "));
            }
            if let Some(url) = link(expert.profile_url.as_deref()) {
                let _ = writeln!(text, "  {url}");
            }
        }
        text.push('\n');

        for (heading, rows) in [
            ("GRANTS & FUNDING", &data.grants),
            ("EVENTS & CONFERENCES", &data.events),
            ("ESG & SUSTAINABILITY REPORTS", &data.reports),
        ] {
            text.push_str(heading);
            text.push('\n');
            text.push_str(&"-".repeat(40));
            text.push('\n');
            if rows.is_empty() {
                text.push_str("No items curated this week\n");
            }
            for row in rows {
                let _ = writeln!(text, "* {}", truncate(&row.title, TITLE_MAX_CHARS));
                if let Some(date) = meaningful(row.date_info.as_deref()) {
                    let _ = writeln!(text, "  {date}");
                }
                if let Some(url) = link(row.url.as_deref()) {
                    let _ = writeln!(text, "  {url}");
                }
            }
            text.push('\n');
        }

        text.push_str("---\nClimate Cardinals Weekly Intelligence Report\n");
        text
    }
}

/// An http(s) link worth rendering, attribute-escaped.
fn link(url: Option<&str>) -> Option<String> {
    meaningful(url)
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
        .map(html_escape)
}

/// Simple HTML escaping for user content.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn grant(date_info: Option<&str>) -> Opportunity {
        Opportunity {
            title: "Community <Resilience> Grant".to_string(),
            domain: Some("fund.org".to_string()),
            description: Some("Funding for adaptation".to_string()),
            date_info: date_info.map(ToString::to_string),
            url: Some("https://fund.org/grant".to_string()),
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            DigestGenerator::subject(today()),
            "Climate Cardinals Weekly Intelligence - October 19, 2026"
        );
    }

    #[test]
    fn test_empty_digest_has_placeholder_per_section() {
        let html = DigestGenerator::generate_html(&Accumulated::default(), today());
        assert_eq!(html.matches(r#"class="no-data""#).count(), 4);
        assert_eq!(html.matches(r#"class="opportunity-card""#).count(), 0);
        assert_eq!(html.matches(r#"class="expert-card""#).count(), 0);
        assert!(html.contains(r#"<div class="item-count">00</div>"#));
        assert!(html.contains("Week 43"));
    }

    #[test]
    fn test_title_truncated_and_escaped() {
        let mut row = grant(None);
        row.title = format!("<b>{}</b>", "x".repeat(120));
        let card = DigestGenerator::opportunity_card(&row);
        assert!(card.contains("&lt;b&gt;"));
        assert!(!card.contains("<b>"));
        assert!(card.contains("..."));
    }

    #[test]
    fn test_invalid_link_omitted() {
        let mut row = grant(None);
        row.url = Some("#".to_string());
        assert!(!DigestGenerator::opportunity_card(&row).contains("card-link"));

        row.url = Some("javascript:alert(1)".to_string());
        assert!(!DigestGenerator::opportunity_card(&row).contains("card-link"));
    }

    #[test]
    fn test_text_body_lists_rows() {
        let data = Accumulated {
            grants: vec![grant(Some("Deadline: March 3, 2027"))],
            ..Accumulated::default()
        };
        let text = DigestGenerator::generate_text(&data, today());
        assert!(text.contains("* Community <Resilience> Grant"));
        assert!(text.contains("  Deadline: March 3, 2027"));
        assert_eq!(text.matches("No items curated this week").count(), 3);
    }
}
