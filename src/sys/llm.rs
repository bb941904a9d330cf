use std::{collections::HashMap, fmt::Display};

use handlebars::Handlebars;

pub type TemplateVars = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = self.as_ref();
        write!(f, "{role}")
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Content {
    pub role: Role,
    pub message: String,
}

impl Content {
    pub fn system(message: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            message: message.into(),
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            message: message.into(),
        }
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            message: message.into(),
        }
    }
}

/// Renders `{{Name}}` placeholders from `vars`.
///
/// Prompts are plain text, so html escaping is off. On a template error the
/// text is returned unchanged.
pub struct PromptRenderer {
    registry: Handlebars<'static>,
}

impl PromptRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    pub fn render(&self, template: &str, vars: &TemplateVars) -> String {
        match self.registry.render_template(template, vars) {
            Ok(rendered) => {
                log::debug!("prompt:\n{}", rendered);
                rendered
            }
            Err(e) => {
                log::warn!("prompt template render failed: {e}");
                template.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_placeholders() {
        let renderer = PromptRenderer::new();
        let out = renderer.render(
            "{{NPCName}} greets {{PlayerName}}.",
            &vars(&[("NPCName", "Garrus"), ("PlayerName", "Shepard")]),
        );
        assert_eq!(out, "Garrus greets Shepard.");
    }

    #[test]
    fn does_not_escape_markup() {
        let renderer = PromptRenderer::new();
        let out = renderer.render(
            "[OPTIONS] <{{Who}}> & \"quotes\"",
            &vars(&[("Who", "Tali'Zorah & co")]),
        );
        assert_eq!(out, "[OPTIONS] <Tali'Zorah & co> & \"quotes\"");
    }

    #[test]
    fn missing_variable_renders_empty() {
        let renderer = PromptRenderer::new();
        assert_eq!(renderer.render("Hi {{Nobody}}!", &TemplateVars::new()), "Hi !");
    }

    #[test]
    fn broken_template_is_returned_verbatim() {
        let renderer = PromptRenderer::new();
        assert_eq!(renderer.render("Hi {{#if}}", &TemplateVars::new()), "Hi {{#if}}");
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Content::user("x").role.as_ref(), "user");
    }
}
