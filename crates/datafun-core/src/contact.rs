//! Contact form fields and the static contact details.

use serde::{Deserialize, Serialize};

pub const SUPPORT_EMAIL: &str = "support@example.com";
pub const SUPPORT_PHONE: &str = "+86 123 4567 8910";
pub const SUPPORT_ADDRESS: &str = "Building A, Science Park, Chaoyang District, Beijing";

/// The three free-text fields of the contact form. Doubles as the
/// submission payload and as the values the form currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.message.is_empty()
    }

    /// Every field has non-blank content.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.message]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// How a contact submission was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Sent,
    /// At least one field was blank; the draft is kept for correction.
    Incomplete,
}

pub fn contact_details() -> Vec<String> {
    vec![
        format!("Email: {}", SUPPORT_EMAIL),
        format!("Phone: {}", SUPPORT_PHONE),
        format!("Address: {}", SUPPORT_ADDRESS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_requires_every_field() {
        assert!(ContactForm::new("Ann", "ann@example.com", "Hi").is_complete());
        assert!(!ContactForm::new("Ann", "ann@example.com", "   ").is_complete());
        assert!(!ContactForm::new("", "ann@example.com", "Hi").is_complete());
        assert!(!ContactForm::default().is_complete());
    }

    #[test]
    fn test_clear_empties_form() {
        let mut form = ContactForm::new("Ann", "ann@example.com", "Hi");
        form.clear();
        assert!(form.is_empty());
    }
}
