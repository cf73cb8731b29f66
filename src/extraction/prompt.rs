//! Extraction prompt construction

/// Build the instruction asking the model to search one website for an asset.
///
/// The reply is expected to be a bare JSON array of listing objects.
pub fn build_prompt(website_url: &str, asset_description: &str, max_tokens: u32) -> String {
    format!(
        r#"You are a construction equipment search assistant. I need you to search for {asset_description} on the following website: {website_url}.

Please navigate to the site, use appropriate search parameters, and return ALL matching items located in the continental United States.

For each item found, extract:
1. Full item description
2. Exact location
3. Listed price (if available)
4. All available specifications
5. Complete contact information
6. Current date and time of this search

Format the results as a JSON array with the following structure for each item:
{{
    "description": "string",
    "location": "string",
    "price": "string",
    "specifications": [
        {{"name": "string", "value": "string"}}
    ],
    "contact": "string",
    "website": "{website_url}",
    "datetime": "string"
}}

Only include items located in the continental United States. Be comprehensive but ensure the total response stays under {max_tokens} tokens.
Respond with the JSON array only. If nothing matches, respond with []."#
    )
}
