use crate::sys::llm::TemplateVars;

pub mod im_channel;
pub mod worker;

/// Completion of one chat request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatResponse {
    pub is_success: bool,
    pub content: String,
    pub error_message: String,
}

impl ChatResponse {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            is_success: true,
            content: content.into(),
            error_message: String::new(),
        }
    }

    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            content: String::new(),
            error_message: error_message.into(),
        }
    }
}

impl From<anyhow::Result<String>> for ChatResponse {
    fn from(result: anyhow::Result<String>) -> Self {
        match result {
            Ok(content) => Self::success(content),
            Err(e) => Self::failure(format!("{e:#}")),
        }
    }
}

/// A language model chat session.
///
/// Every request is fire-and-forget. The completion arrives later as a
/// [`ChatResponse`] which the owner hands back to whoever issued the request,
/// on the same thread that issued it.
pub trait ChatBackend {
    /// Sends `user_prompt` with `system_prompt` replacing the current one.
    fn chat_with_system(&mut self, system_prompt: &str, user_prompt: &str, vars: &TemplateVars);

    /// Sends `user_prompt`, keeping the existing system prompt and history.
    fn chat(&mut self, user_prompt: &str, vars: &TemplateVars);

    fn clear_history(&mut self);

    fn set_use_conversation_history(&mut self, enabled: bool);

    /// Best effort: requests that already finished may still be delivered.
    fn cancel_all_requests(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_from_result() {
        let ok: ChatResponse = anyhow::Ok("hello".to_string()).into();
        assert!(ok.is_success);
        assert_eq!(ok.content, "hello");

        let err: ChatResponse = Err::<String, _>(anyhow::anyhow!("timed out")).into();
        assert!(!err.is_success);
        assert_eq!(err.error_message, "timed out");
    }
}
