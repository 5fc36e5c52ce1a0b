//! Retriever prompt templates
//!
//! Templates are rendered against the fields of the trial's retrieval record.

use once_cell::sync::Lazy;

use crate::domain::prompt::PromptTemplate;

pub const ANNOTATING_PROMPT: &str = r#"You will be given an input text and the description of a parameter.

Return the input text exactly as given, character for character, except that every
occurrence of the parameter value is surrounded by curly braces. Do not change, add or
remove any other character and do not nest braces.

Respond with a JSON object with the following fields:
- success: Y if the parameter is present in the input text, N otherwise
- annotated_text: the input text with the parameter value in curly braces
- justification: one sentence explaining your answer

Example: for the input text "Buy 5y EUR IRS at 2.10%" and the parameter "Fixed rate." respond with
{{"success": "Y", "annotated_text": "Buy 5y EUR IRS at {{2.10%}}", "justification": "2.10% is the fixed rate."}}

Parameter description: {param_description}
Sample values (may be empty): {param_samples}

Input text: {input_text}"#;

pub const MULTIPLE_CHOICE_PROMPT: &str = r#"You will be given an input text, the description of a parameter and a list of valid choices.

Determine the value of the parameter from the input text and map it to exactly one of the
valid choices. The text may use loose wording, for example "$" or "dollars" for the choice
"USD". Always answer with the choice spelled exactly as it appears in the list.

Respond with a JSON object with the following fields:
- success: Y if the input text specifies the parameter, N otherwise
- param_value: one of the valid choices, or null if success is N
- justification: one sentence explaining your answer

Parameter description: {param_description}
Valid choices: {valid_choices}

Input text: {input_text}"#;

pub const BRACE_PROMPT: &str = r#"Reproduce the input text below exactly, character for character, and surround every
occurrence of the described parameter with curly braces. Do not change any other character
and do not nest braces. If the parameter does not occur, return the text without braces.
Return only the text.

Parameter description: {param_description}
Sample values (may be empty): {param_samples}

Input text:
{input_text}"#;

pub static ANNOTATING_TEMPLATE: Lazy<PromptTemplate> =
    Lazy::new(|| PromptTemplate::parse(ANNOTATING_PROMPT).unwrap());

pub static MULTIPLE_CHOICE_TEMPLATE: Lazy<PromptTemplate> =
    Lazy::new(|| PromptTemplate::parse(MULTIPLE_CHOICE_PROMPT).unwrap());

pub static BRACE_TEMPLATE: Lazy<PromptTemplate> =
    Lazy::new(|| PromptTemplate::parse(BRACE_PROMPT).unwrap());

/// Instruction appended to the next prompt after a rejected answer
pub fn corrective_note(diagnostic: &str) -> String {
    format!(
        "\n\nYour previous answer was rejected for the following reason:\n{}\nCorrect this in your new answer.",
        diagnostic
    )
}
