//! Weekly digest: rendering and delivery.
//!
//! - Magazine-style HTML with a plain-text alternative
//! - One section per category, with an empty-state block when nothing was collected
//! - STARTTLS SMTP delivery behind the [`MailTransport`] trait

mod email;
mod generator;

pub use email::{MailTransport, SmtpMailer};
pub use generator::{DigestGenerator, RenderedDigest};
