//! Prompts for the classification oracle.

use crate::traits::oracle::OracleRequest;

/// System message for LLM-backed oracles.
pub const CLUSTER_SYSTEM_PROMPT: &str =
    "You are an expert at semantic clustering. Respond with valid JSON only.";

/// Prompt for grouping a batch of items by an instruction.
pub const CLUSTER_PROMPT: &str = r#"You are an expert at semantic clustering. Your task is to group items based on the user's request.

USER REQUEST: "{query}"
ENTITY TYPE: {entity_type}
ITEMS TO CLUSTER: {count}

{guidance}

ITEMS DATA:
{items}

INSTRUCTIONS:
1. Analyze the user's request to understand the clustering criteria
2. Group items that share the specified characteristic
3. Create meaningful cluster names that describe the grouping
4. Provide a brief reasoning for each cluster
5. Each item should belong to exactly one cluster
6. Aim for 2-8 clusters (avoid too many small clusters)

RESPONSE FORMAT (JSON):
{
  "clusters": [
    {
      "name": "Descriptive Cluster Name",
      "reasoning": "Why these items belong together",
      "item_indices": [0, 1, 5, 8]
    },
    {
      "name": "Another Cluster Name",
      "reasoning": "Reasoning for this grouping",
      "item_indices": [2, 3, 4]
    }
  ]
}

Respond with valid JSON only."#;

/// Render the batch items as the JSON array shown to the oracle.
pub fn format_items(request: &OracleRequest<'_, '_>) -> String {
    let views: Vec<_> = request
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| item.prompt_view(i))
        .collect();
    serde_json::to_string_pretty(&views).unwrap_or_else(|_| "[]".to_string())
}

/// Format the clustering prompt for one batch.
pub fn format_cluster_prompt(request: &OracleRequest<'_, '_>) -> String {
    let entity_type = if request.entity_type.is_empty() {
        "unknown"
    } else {
        request.entity_type
    };

    CLUSTER_PROMPT
        .replace("{query}", request.instruction)
        .replace("{entity_type}", entity_type)
        .replace("{count}", &request.len().to_string())
        .replace("{guidance}", request.guidance)
        .replace("{items}", &format_items(request))
}
