// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Named HTML email templates with `{{variable}}` substitution.
//!
//! Rendering fails loudly: an unknown template name or a placeholder
//! left unresolved after substitution is an error, never a silently
//! half-filled email.

/// Template name for the prospect confirmation email.
pub const PROSPECT_CONFIRMATION: &str = "prospect_confirmation";

/// Template name for the attorney notification email.
pub const ATTORNEY_NOTIFICATION: &str = "attorney_notification";

struct Template {
    subject: &'static str,
    body: &'static str,
}

const PROSPECT_CONFIRMATION_TEMPLATE: Template = Template {
    subject: "Thank you for your submission",
    body: r#"<html>
  <body style="font-family: Arial, sans-serif; color: #333;">
    <h2>Thank you, {{name}}!</h2>
    <p>We have received your information and resume.</p>
    <p>An attorney will review your submission and reach out to you shortly.</p>
    <p style="color: #888; font-size: 12px;">Reference: {{lead_id}}</p>
  </body>
</html>"#,
};

const ATTORNEY_NOTIFICATION_TEMPLATE: Template = Template {
    subject: "New Lead Submitted: {{name}}",
    body: r#"<html>
  <body style="font-family: Arial, sans-serif; color: #333;">
    <h2>New Lead Submitted</h2>
    <table cellpadding="4">
      <tr><td><b>Name</b></td><td>{{name}}</td></tr>
      <tr><td><b>Email</b></td><td>{{email}}</td></tr>
      <tr><td><b>Resume</b></td><td>{{resume}}</td></tr>
      <tr><td><b>Lead ID</b></td><td>{{lead_id}}</td></tr>
    </table>
    <p><a href="{{dashboard_url}}">Review this lead in the dashboard</a></p>
  </body>
</html>"#,
};

/// A rendered email ready to wrap in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub html: String,
}

/// Render a named template with the given variables.
pub fn render(name: &str, vars: &[(&str, &str)]) -> Result<Rendered, String> {
    let template = match name {
        PROSPECT_CONFIRMATION => &PROSPECT_CONFIRMATION_TEMPLATE,
        ATTORNEY_NOTIFICATION => &ATTORNEY_NOTIFICATION_TEMPLATE,
        other => return Err(format!("unknown email template '{other}'")),
    };

    let subject = substitute(template.subject, vars)?;
    let html = substitute(template.body, vars)?;
    Ok(Rendered { subject, html })
}

fn substitute(text: &str, vars: &[(&str, &str)]) -> Result<String, String> {
    let mut out = text.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    if let Some(start) = out.find("{{") {
        let tail: String = out[start..].chars().take(30).collect();
        return Err(format!("unresolved template placeholder near '{tail}'"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prospect_template_renders() {
        let rendered = render(
            PROSPECT_CONFIRMATION,
            &[("name", "John Doe"), ("lead_id", "abc-123")],
        )
        .unwrap();
        assert_eq!(rendered.subject, "Thank you for your submission");
        assert!(rendered.html.contains("Thank you, John Doe!"));
        assert!(rendered.html.contains("abc-123"));
    }

    #[test]
    fn attorney_template_renders_with_subject_variable() {
        let rendered = render(
            ATTORNEY_NOTIFICATION,
            &[
                ("name", "John Doe"),
                ("email", "john@example.com"),
                ("resume", "ref.pdf"),
                ("lead_id", "abc-123"),
                ("dashboard_url", "/leads/abc-123"),
            ],
        )
        .unwrap();
        assert_eq!(rendered.subject, "New Lead Submitted: John Doe");
        assert!(rendered.html.contains("john@example.com"));
        assert!(rendered.html.contains("href=\"/leads/abc-123\""));
    }

    #[test]
    fn unknown_template_is_an_error() {
        assert!(render("no_such_template", &[]).is_err());
    }

    #[test]
    fn unresolved_placeholder_is_an_error() {
        let err = render(PROSPECT_CONFIRMATION, &[("name", "John")]).unwrap_err();
        assert!(err.contains("unresolved"), "{err}");
    }
}
