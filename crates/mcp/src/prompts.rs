// MCP prompt templates

use crate::protocol::{
    GetPromptResult, PromptArgument, PromptMessage, PromptSchema, Role, ToolContent,
};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// A fixed instruction text with one substituted argument.
#[derive(Clone)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub argument: &'static str,
    pub argument_description: &'static str,
    render: fn(&str) -> String,
}

impl PromptTemplate {
    pub fn schema(&self) -> PromptSchema {
        PromptSchema {
            name: self.name.to_string(),
            description: self.description.to_string(),
            arguments: vec![PromptArgument {
                name: self.argument.to_string(),
                description: self.argument_description.to_string(),
                required: true,
            }],
        }
    }

    pub fn get(&self, arguments: &HashMap<String, String>) -> Result<GetPromptResult> {
        let value = arguments
            .get(self.argument)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "Missing required argument '{}' for prompt {}",
                    self.argument,
                    self.name
                )
            })?;

        Ok(GetPromptResult {
            description: self.description.to_string(),
            messages: vec![PromptMessage {
                role: Role::User,
                content: ToolContent::text((self.render)(value)),
            }],
        })
    }
}

fn render_search_data(keyword: &str) -> String {
    format!(
        "Follow these steps to find the relevant time series:\n\
         1. Search for the time series group using the search_time_series_groups tool with the keyword: {keyword}\n\
         2. Search for the time series using the search_time_series_by_group tool with the time series group.\n\
         3. Return the time series code and name.\n\
         4. If no time series is found, retry with different keywords. If you have found the time series, return the time series code and name.\n"
    )
}

fn render_ask(question: &str) -> String {
    format!(
        "You are a financial analyst. You are given a question and you need to answer it.\n\
         Question: {question}\n\
         Follow these steps to answer the question:\n\
         1. Extract keywords from the question; they need to be related to financial time series.\n\
         2. Search for the time series group using the search_time_series_groups tool with the keywords.\n\
         3. Search for the time series using the search_time_series_by_group tool with the time series group.\n\
         4. Return the time series code and name.\n\
         5. If no time series is found, retry with different keywords.\n\
         6. If you have found the time series, select the relevant ones for the analysis; there can be more than one if the question needs it.\n\
         7. Get the data for the time series using the get_time_series_data tool. You can get the data for multiple time series if needed.\n\
         8. Answer the question with the data.\n"
    )
}

pub fn search_data_prompt() -> PromptTemplate {
    PromptTemplate {
        name: "search_data",
        description: "Step-by-step instructions to locate a BCRP time series from a keyword",
        argument: "keyword",
        argument_description: "Keyword describing the data to find",
        render: render_search_data,
    }
}

pub fn ask_prompt() -> PromptTemplate {
    PromptTemplate {
        name: "ask",
        description: "Answer an economic question using BCRP time series data",
        argument: "question",
        argument_description: "The question to answer",
        render: render_ask,
    }
}

/// Prompt registry, listed in registration order
#[derive(Clone, Default)]
pub struct PromptRegistry {
    prompts: Vec<PromptTemplate>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `search_data` and `ask`.
    pub fn bcrp_prompts() -> Self {
        let mut registry = Self::new();
        registry.register(search_data_prompt());
        registry.register(ask_prompt());
        registry
    }

    /// Register a prompt, replacing any with the same name
    pub fn register(&mut self, prompt: PromptTemplate) {
        self.prompts.retain(|p| p.name != prompt.name);
        self.prompts.push(prompt);
    }

    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.prompts.iter().find(|p| p.name == name)
    }

    pub fn list_schemas(&self) -> Vec<PromptSchema> {
        self.prompts.iter().map(PromptTemplate::schema).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(key: &str, value: &str) -> HashMap<String, String> {
        HashMap::from([(key.to_string(), value.to_string())])
    }

    #[test]
    fn test_registry_lists_both_prompts() {
        let registry = PromptRegistry::bcrp_prompts();
        let names: Vec<String> = registry.list_schemas().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["search_data", "ask"]);
        assert!(registry.get("ask").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_search_data_substitutes_keyword() {
        let result = search_data_prompt().get(&args("keyword", "inflación")).unwrap();
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].role, Role::User);
        let ToolContent::Text { text } = &result.messages[0].content;
        assert!(text.contains("with the keyword: inflación"));
        assert!(text.contains("search_time_series_by_group"));
    }

    #[test]
    fn test_ask_mentions_every_tool() {
        let result = ask_prompt()
            .get(&args("question", "How did inflation evolve in 2023?"))
            .unwrap();
        let ToolContent::Text { text } = &result.messages[0].content;
        assert!(text.contains("Question: How did inflation evolve in 2023?"));
        for tool in ["search_time_series_groups", "search_time_series_by_group", "get_time_series_data"] {
            assert!(text.contains(tool), "missing {}", tool);
        }
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        assert!(ask_prompt().get(&HashMap::new()).is_err());
        assert!(ask_prompt().get(&args("question", "  ")).is_err());
        assert!(ask_prompt().get(&args("keyword", "pbi")).is_err());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = PromptRegistry::bcrp_prompts();
        registry.register(ask_prompt());
        assert_eq!(registry.list_schemas().len(), 2);
    }
}
