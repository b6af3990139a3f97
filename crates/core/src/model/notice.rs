use crate::model::FieldKey;

/// Advisory surfaced to the user alongside a transition. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An add was refused because the field is at its cap.
    LimitReached { field: FieldKey, limit: usize },
    /// The winning rules were auto-completed; the user must advance again.
    WinRulesAutoSelected { added: Vec<String> },
    /// The user is not sure where to get help.
    SupportContacts { contacts: Vec<String> },
    /// The terminal step was confirmed and the completion record is ready.
    Completed,
}

impl Notice {
    /// Blocking notices explain a vetoed advance and must be acknowledged.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Notice::WinRulesAutoSelected { .. })
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Notice::LimitReached { limit, .. } => format!("Pick up to {limit}."),
            Notice::WinRulesAutoSelected { .. } => {
                "All of these are how you win this season, so we selected them for you. \
                 Hit Next again when you're ready."
                    .to_owned()
            }
            Notice::SupportContacts { contacts } if contacts.is_empty() => {
                "Your teacher or coach can point you to help.".to_owned()
            }
            Notice::SupportContacts { contacts } => {
                format!("You can get help here: {}", contacts.join(", "))
            }
            Notice::Completed => "You're Season Ready! Download your completion record.".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_message_names_the_cap() {
        let notice = Notice::LimitReached {
            field: FieldKey::Playstyle,
            limit: 2,
        };
        assert_eq!(notice.message(), "Pick up to 2.");
        assert!(!notice.is_blocking());
    }

    #[test]
    fn support_message_lists_contacts() {
        let notice = Notice::SupportContacts {
            contacts: vec!["Coach".into(), "Help Center".into()],
        };
        assert_eq!(notice.message(), "You can get help here: Coach, Help Center");
    }
}
