//! Entry-id command - computes or checks entry ids without touching storage

use clap::{Args, Subcommand};

use crate::domain::entry::{check_entry_id, get_entry_id, EntryKeyError, DEFAULT_ENTRY_TYPE};

#[derive(Args, Debug, Clone)]
pub struct EntryIdArgs {
    #[command(subcommand)]
    pub action: EntryIdAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EntryIdAction {
    /// Print the id derived from an entry's parts
    Compute {
        /// Record type prefix
        #[arg(long = "type", default_value = DEFAULT_ENTRY_TYPE)]
        record_type: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        body: Option<String>,

        /// YAML data
        #[arg(long)]
        data: Option<String>,
    },

    /// Validate an existing id
    Check { entry_id: String },
}

pub fn run(args: EntryIdArgs) -> anyhow::Result<()> {
    println!("{}", execute(&args.action)?);
    Ok(())
}

fn execute(action: &EntryIdAction) -> Result<String, EntryKeyError> {
    match action {
        EntryIdAction::Compute {
            record_type,
            description,
            body,
            data,
        } => get_entry_id(record_type, description, body.as_deref(), data.as_deref()),
        EntryIdAction::Check { entry_id } => {
            check_entry_id(entry_id)?;
            Ok(format!("'{}' is a valid entry id", entry_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_then_check() {
        let entry_id = execute(&EntryIdAction::Compute {
            record_type: "Trade".to_string(),
            description: "Swap rate".to_string(),
            body: Some("Sell 10y SOFR swap at 3.45%".to_string()),
            data: None,
        })
        .unwrap();

        assert!(entry_id.starts_with("Trade: Swap rate (MD5: "));
        assert!(execute(&EntryIdAction::Check { entry_id }).is_ok());
    }

    #[test]
    fn test_check_rejects_bad_suffix() {
        let result = execute(&EntryIdAction::Check {
            entry_id: "Entry: Swap rate (MD5: xyz)".to_string(),
        });

        assert!(matches!(result, Err(EntryKeyError::InvalidHashSuffix { .. })));
    }
}
