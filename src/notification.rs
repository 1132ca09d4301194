// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification message composed from a validated submission.

use crate::config::EmailConfig;
use crate::validator::Submission;

/// An address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub email: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }
}

/// Outbound email announcing a contact form submission.
#[derive(Debug, Clone)]
pub struct Notification {
    pub sender: Mailbox,
    pub recipient: Mailbox,
    pub reply_to: Mailbox,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
}

impl Notification {
    /// Build the notification for `submission`, addressed per `config`.
    ///
    /// Replies go to the submitter. Submitter text is escaped in the HTML
    /// rendering.
    pub fn compose(submission: &Submission, config: &EmailConfig) -> Self {
        Self {
            sender: Mailbox::new(&config.sender_email, Some(config.sender_name.clone())),
            recipient: Mailbox::new(&config.recipient_email, None),
            reply_to: Mailbox::new(submission.email(), Some(submission.name().to_string())),
            subject: format!("Contact Form: {}", submission.subject()),
            html_content: render_html(submission),
            text_content: render_text(submission),
        }
    }
}

fn render_html(submission: &Submission) -> String {
    format!(
        "<html>\n\
         <body>\n\
         <h2>New Contact Form Submission</h2>\n\
         <p><strong>From:</strong> {name}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         <p><strong>Subject:</strong> {subject}</p>\n\
         <hr>\n\
         <h3>Message:</h3>\n\
         <p>{message}</p>\n\
         </body>\n\
         </html>\n",
        name = escape_html(submission.name()),
        email = escape_html(submission.email()),
        subject = escape_html(submission.subject()),
        message = escape_html(submission.message()).replace('\n', "<br>\n"),
    )
}

fn render_text(submission: &Submission) -> String {
    format!(
        "New Contact Form Submission\n\
         \n\
         From: {}\n\
         Email: {}\n\
         Subject: {}\n\
         \n\
         Message:\n\
         {}\n",
        submission.name(),
        submission.email(),
        submission.subject(),
        submission.message(),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
