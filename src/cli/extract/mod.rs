//! Extract command - runs one retriever and prints the result as JSON

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::domain::{CompletionModel, DataSource, Retriever};
use crate::infrastructure::retrieval::{AnnotatingRetriever, BraceRetriever, MultipleChoiceRetriever};
use crate::infrastructure::storage::DataSourceFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RetrieverKind {
    Annotating,
    MultipleChoice,
    Brace,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Input text; read from --file or stdin when omitted
    #[arg(long)]
    pub text: Option<String>,

    /// File holding the input text
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Description of the parameter to extract
    #[arg(long)]
    pub description: String,

    /// Example value, may be repeated
    #[arg(long = "sample")]
    pub samples: Vec<String>,

    #[arg(long, value_enum, default_value_t = RetrieverKind::Annotating)]
    pub retriever: RetrieverKind,

    /// Valid choices for the multiple-choice retriever, comma separated
    #[arg(long, value_delimiter = ',')]
    pub choices: Vec<String>,

    /// Return null instead of failing when the parameter is absent
    #[arg(long)]
    pub optional: bool,

    /// Dataset receiving the retrieval records (overrides config)
    #[arg(long)]
    pub dataset: Option<String>,
}

/// Printed result of an extraction
#[derive(Debug, Serialize)]
pub struct ExtractionOutput {
    pub retriever: String,
    pub param_description: String,
    pub value: Option<String>,
}

pub async fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    let input_text = read_input(&args)?;
    let dataset = args
        .dataset
        .clone()
        .unwrap_or_else(|| config.storage.dataset.clone());

    let llm: Arc<dyn CompletionModel> = Arc::new(crate::create_llm(&config).await?);
    let data_source =
        DataSourceFactory::create(&config.storage.to_storage_settings()?).await?;

    let output = execute(&args, &input_text, llm, data_source, &dataset).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn read_input(args: &ExtractArgs) -> anyhow::Result<String> {
    if let Some(ref text) = args.text {
        return Ok(text.clone());
    }

    if let Some(ref path) = args.file {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

fn build_retriever(
    args: &ExtractArgs,
    llm: Arc<dyn CompletionModel>,
    data_source: Arc<dyn DataSource>,
    dataset: &str,
) -> anyhow::Result<Box<dyn Retriever>> {
    let retriever: Box<dyn Retriever> = match args.retriever {
        RetrieverKind::Annotating => Box::new(AnnotatingRetriever::new(llm, data_source, dataset)),
        RetrieverKind::Brace => Box::new(BraceRetriever::new(llm, data_source, dataset)),
        RetrieverKind::MultipleChoice => {
            if args.choices.is_empty() {
                anyhow::bail!("--choices is required for the multiple-choice retriever");
            }

            Box::new(MultipleChoiceRetriever::new(
                llm,
                data_source,
                dataset,
                args.choices.iter().map(|c| c.trim().to_string()).collect(),
            ))
        }
    };

    Ok(retriever)
}

async fn execute(
    args: &ExtractArgs,
    input_text: &str,
    llm: Arc<dyn CompletionModel>,
    data_source: Arc<dyn DataSource>,
    dataset: &str,
) -> anyhow::Result<ExtractionOutput> {
    let retriever = build_retriever(args, llm, data_source.clone(), dataset)?;

    let value = retriever
        .retrieve(input_text, &args.description, &args.samples, !args.optional)
        .await?;
    data_source.commit().await?;

    info!(
        retriever = %retriever.retriever_id(),
        found = value.is_some(),
        "Extraction finished"
    );

    Ok(ExtractionOutput {
        retriever: retriever.retriever_id().to_string(),
        param_description: args.description.clone(),
        value,
    })
}
