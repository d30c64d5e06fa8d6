//! STS endpoint URL builders

/// Build the "all properties" URL for one data model
pub fn model_properties_url(base_url: &str, model: &str) -> String {
    format!("{}/{}", base_url, model)
}

/// One properties URL per model, in model order
pub fn model_properties_urls(base_url: &str, models: &[String]) -> Vec<String> {
    models
        .iter()
        .map(|model| model_properties_url(base_url, model))
        .collect()
}
