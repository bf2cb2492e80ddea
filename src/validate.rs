use thiserror::Error;
use tracing::{info, warn};

use crate::backend::Dispatcher;

/// A backend response that could not be used as a list of strings.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("no response was produced by any backend")]
    Missing,
    #[error("response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response is valid JSON but not a list of strings")]
    NotAStringList,
}

/// Decode a raw backend response as a JSON array of strings.
///
/// An absent response fails immediately without attempting a parse. Any JSON
/// value other than an array whose every element is a string is rejected.
pub fn parse_string_list(raw: Option<&str>) -> Result<Vec<String>, PayloadError> {
    let raw = raw.ok_or(PayloadError::Missing)?;
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let items = value.as_array().ok_or(PayloadError::NotAStringList)?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or(PayloadError::NotAStringList)
        })
        .collect()
}

/// Validate `raw` as a string list, with one repair pass through the primary
/// backend when it is malformed.
///
/// The repair prompt carries the malformed text (or a note that none was
/// produced) and asks the model to either extract a valid list or synthesize
/// a fresh one for `context`. The repair output is held to the same rule; no
/// default is supplied here. On `Err` the caller picks the default that fits
/// its step.
pub async fn string_list_or_repair(
    dispatcher: &Dispatcher,
    raw: Option<&str>,
    context: &str,
) -> Result<Vec<String>, PayloadError> {
    match parse_string_list(raw) {
        Ok(items) => Ok(items),
        Err(e) => {
            warn!("Response was not a valid JSON list of strings: {}", e);
            info!("Attempting to extract the list or generate a new one via the primary backend...");

            let repair_prompt = format!(
                r#"The following text is supposed to be a JSON list of items, but it might be malformed or missing:
---
{}
---
Please extract the items and format them as a valid JSON array of strings.
If you cannot extract a meaningful list, generate a new list of 3-5 items for {}.
Output only the JSON array."#,
                raw.unwrap_or("No content provided by previous AI."),
                context
            );

            let repaired = dispatcher.dispatch_primary(&repair_prompt).await;
            info!("Primary backend's cleaned or generated list: {:?}", repaired);
            parse_string_list(repaired.as_deref())
        }
    }
}
