//! Entry record and lifecycle

use serde::{Deserialize, Serialize};

use super::key::{get_entry_id, EntryKey};
use crate::domain::storage::{Record, ToPk};
use crate::domain::DomainError;

/// Record type used when an entry does not specify one
pub const DEFAULT_ENTRY_TYPE: &str = "Entry";

/// Processing status of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Automated processing produced a value
    Completed,
    /// Automated processing failed and a person has to look at the entry
    Escalation,
    /// A person replaced the automated value
    Override,
    /// The value was entered by a person without automated processing
    Manual,
}

/// A titled user input with a derived deterministic id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Derived by `init`, empty until then
    #[serde(default)]
    pub entry_id: String,
    #[serde(default = "default_entry_type")]
    pub entry_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Optional YAML document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
}

fn default_entry_type() -> String {
    DEFAULT_ENTRY_TYPE.to_string()
}

impl Entry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            entry_id: String::new(),
            entry_type: default_entry_type(),
            title: title.into(),
            body: None,
            data: None,
            status: None,
            proposed_value: None,
            approved_by: None,
        }
    }

    pub fn with_type(mut self, entry_type: impl Into<String>) -> Self {
        self.entry_type = entry_type.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Text the extraction pipeline works on
    pub fn text(&self) -> &str {
        match self.body.as_deref() {
            Some(body) if !body.trim().is_empty() => body,
            _ => &self.title,
        }
    }

    /// Parsed YAML data, if any
    pub fn data_value(&self) -> Result<Option<serde_yaml::Value>, DomainError> {
        match self.data.as_deref() {
            Some(data) if !data.is_empty() => serde_yaml::from_str(data)
                .map(Some)
                .map_err(|e| DomainError::validation(format!("Entry data is not valid YAML: {}", e))),
            _ => Ok(None),
        }
    }

    /// Record the result of automated processing
    pub fn apply_proposal(&mut self, value: Option<String>) {
        self.status = Some(match value {
            Some(_) => EntryStatus::Completed,
            None => EntryStatus::Escalation,
        });
        self.proposed_value = value;
        self.approved_by = None;
    }

    /// Approve the current proposal
    pub fn approve(&mut self, approver: impl Into<String>) -> Result<(), DomainError> {
        let approver = require_approver(approver.into())?;

        match self.status {
            None => Err(DomainError::validation(format!(
                "Entry '{}' has no proposal to approve",
                self.entry_id
            ))),
            Some(EntryStatus::Escalation) => Err(DomainError::validation(format!(
                "Entry '{}' is escalated, override it with a value instead of approving",
                self.entry_id
            ))),
            Some(_) => {
                self.approved_by = Some(approver);
                Ok(())
            }
        }
    }

    /// Replace the automated value
    pub fn override_value(
        &mut self,
        value: impl Into<String>,
        approver: impl Into<String>,
    ) -> Result<(), DomainError> {
        let approver = require_approver(approver.into())?;
        self.proposed_value = Some(value.into());
        self.status = Some(EntryStatus::Override);
        self.approved_by = Some(approver);
        Ok(())
    }

    /// Set a value entered by hand
    pub fn record_manual(
        &mut self,
        value: impl Into<String>,
        approver: impl Into<String>,
    ) -> Result<(), DomainError> {
        let approver = require_approver(approver.into())?;
        self.proposed_value = Some(value.into());
        self.status = Some(EntryStatus::Manual);
        self.approved_by = Some(approver);
        Ok(())
    }
}

fn require_approver(approver: String) -> Result<String, DomainError> {
    if approver.trim().is_empty() {
        return Err(DomainError::validation("Approver must not be empty"));
    }

    Ok(approver)
}

impl Record for Entry {
    type Key = EntryKey;
    const TYPE_NAME: &'static str = "Entry";

    fn key(&self) -> EntryKey {
        EntryKey {
            entry_id: self.entry_id.clone(),
        }
    }

    /// Validates the title and data and computes `entry_id`. Once set, the id is
    /// frozen: a later `init` must derive the same id.
    fn init(&mut self) -> Result<(), DomainError> {
        self.data_value()?;

        let entry_id = get_entry_id(
            &self.entry_type,
            &self.title,
            self.body.as_deref(),
            self.data.as_deref(),
        )?;

        if self.entry_id.is_empty() {
            self.entry_id = entry_id;
        } else if self.entry_id != entry_id {
            return Err(DomainError::validation(format!(
                "Entry id '{}' does not match its content, expected '{}'",
                self.entry_id, entry_id
            )));
        }

        Ok(())
    }
}

impl ToPk for Entry {
    fn to_pk(&self) -> String {
        self.get_pk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized(entry: Entry) -> Entry {
        let mut entry = entry;
        entry.init().unwrap();
        entry
    }

    #[test]
    fn test_init_computes_entry_id() {
        let entry = initialized(Entry::new("Sell 10y SOFR swap").with_type("TradeEntry"));
        assert_eq!(entry.entry_id, "TradeEntry: Sell 10y SOFR swap");
        assert_eq!(entry.get_pk(), entry.entry_id);
    }

    #[test]
    fn test_init_hashes_body_and_data() {
        let entry = initialized(
            Entry::new("Swap")
                .with_body("Sell 10y SOFR swap at 3.45%")
                .with_data("notional: 10000000"),
        );
        assert!(entry.entry_id.starts_with("Entry: Swap (MD5: "));
    }

    #[test]
    fn test_init_rejects_invalid_title() {
        let mut entry = Entry::new("Title: with colon");
        assert!(matches!(entry.init(), Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_init_rejects_invalid_yaml() {
        let mut entry = Entry::new("Title").with_data("key: [unclosed");
        assert!(matches!(entry.init(), Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_entry_id_is_frozen() {
        let mut entry = initialized(Entry::new("Title"));
        assert!(entry.init().is_ok());

        entry.title = "Other".to_string();
        assert!(entry.init().is_err());
    }

    #[test]
    fn test_text_prefers_body() {
        assert_eq!(Entry::new("Title").text(), "Title");
        assert_eq!(Entry::new("Title").with_body("Body").text(), "Body");
        assert_eq!(Entry::new("Title").with_body("  ").text(), "Title");
    }

    #[test]
    fn test_proposal_and_approval() {
        let mut entry = initialized(Entry::new("Title"));

        assert!(entry.approve("alice").is_err());

        entry.apply_proposal(Some("3.45%".to_string()));
        assert_eq!(entry.status, Some(EntryStatus::Completed));

        entry.approve("alice").unwrap();
        assert_eq!(entry.approved_by.as_deref(), Some("alice"));
    }

    #[test]
    fn test_escalated_entry_requires_override() {
        let mut entry = initialized(Entry::new("Title"));
        entry.apply_proposal(None);

        assert_eq!(entry.status, Some(EntryStatus::Escalation));
        assert!(entry.approve("alice").is_err());

        entry.override_value("USD", "alice").unwrap();
        assert_eq!(entry.status, Some(EntryStatus::Override));
        assert_eq!(entry.proposed_value.as_deref(), Some("USD"));
        assert_eq!(entry.approved_by.as_deref(), Some("alice"));
    }

    #[test]
    fn test_manual_entry() {
        let mut entry = initialized(Entry::new("Title"));
        entry.record_manual("EUR", "bob").unwrap();

        assert_eq!(entry.status, Some(EntryStatus::Manual));
        assert!(entry.record_manual("EUR", " ").is_err());
    }
}
