use serde::Serialize;
use tera::{Context, Tera};

const BODY_TEMPLATE: &str = include_str!("../../templates/email/shortlisted.html");

/// Template context for the "you have been shortlisted" message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortlistEmail {
    pub recipient: String,
    pub candidate_name: String,
    pub job_title: String,
    pub company: String,
}

impl ShortlistEmail {
    pub fn subject(&self) -> String {
        format!(
            "Congratulations! You've been shortlisted for {} at {}",
            self.job_title, self.company
        )
    }

    /// HTML body with every field autoescaped.
    pub fn html_body(&self) -> Result<String, tera::Error> {
        let ctx = Context::from_serialize(self)?;
        Tera::one_off(BODY_TEMPLATE, &ctx, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_context_into_body_and_subject() {
        let email = ShortlistEmail {
            recipient: "ann@example.com".into(),
            candidate_name: "Ann <Lee>".into(),
            job_title: "Rust Engineer".into(),
            company: "Acme & Co".into(),
        };

        let body = email.html_body().unwrap();
        assert!(body.contains("Dear Ann &lt;Lee&gt;,"));
        assert!(body.contains("<h2>Rust Engineer</h2>"));
        assert!(body.contains("The Acme &amp; Co Recruiting Team"));
        assert!(!body.contains("Ann <Lee>"));
        assert_eq!(
            email.subject(),
            "Congratulations! You've been shortlisted for Rust Engineer at Acme & Co"
        );
    }
}
