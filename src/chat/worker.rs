use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::sys::llm::{Content, PromptRenderer, TemplateVars};

use super::{
    im_channel::{Message, MessageRx, MessageTx, ResponseRx, ResponseTx},
    ChatBackend, ChatResponse,
};

/// Produces the assistant reply for a full prompt list.
pub trait Generator: Send + 'static {
    fn generate(&mut self, prompts: &[Content]) -> anyhow::Result<String>;
}

impl<F> Generator for F
where
    F: FnMut(&[Content]) -> anyhow::Result<String> + Send + 'static,
{
    fn generate(&mut self, prompts: &[Content]) -> anyhow::Result<String> {
        self(prompts)
    }
}

/// [`ChatBackend`] that runs a [`Generator`] on its own thread.
///
/// Completions come out of the [`ResponseRx`] returned by [`WorkerChat::spawn`].
pub struct WorkerChat {
    tx: MessageTx,
    epoch: Arc<AtomicU64>,
    renderer: PromptRenderer,
}

impl WorkerChat {
    pub fn spawn<G: Generator>(generator: G) -> (Self, ResponseRx) {
        let (tx, rx) = crossbeam::channel::unbounded();
        let (response_tx, response_rx) = crossbeam::channel::unbounded();
        let epoch = Arc::new(AtomicU64::new(0));

        let mut worker = ChatWorker {
            generator,
            system: None,
            turns: Vec::new(),
            use_history: false,
            epoch: epoch.clone(),
            rx,
            tx: response_tx,
        };
        std::thread::spawn(move || worker.run_loop());

        let chat = Self {
            tx,
            epoch,
            renderer: PromptRenderer::new(),
        };
        (chat, response_rx)
    }

    fn send(&self, message: Message) {
        if self.tx.send(message).is_err() {
            log::error!("chat worker is gone");
        }
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

impl ChatBackend for WorkerChat {
    fn chat_with_system(&mut self, system_prompt: &str, user_prompt: &str, vars: &TemplateVars) {
        let system = Content::system(self.renderer.render(system_prompt, vars));
        let user = Content::user(self.renderer.render(user_prompt, vars));
        self.send(Message::ChatWithSystem {
            system,
            user,
            epoch: self.current_epoch(),
        });
    }

    fn chat(&mut self, user_prompt: &str, vars: &TemplateVars) {
        let user = Content::user(self.renderer.render(user_prompt, vars));
        self.send(Message::Chat {
            user,
            epoch: self.current_epoch(),
        });
    }

    fn clear_history(&mut self) {
        self.send(Message::ClearHistory);
    }

    fn set_use_conversation_history(&mut self, enabled: bool) {
        self.send(Message::UseHistory(enabled));
    }

    fn cancel_all_requests(&mut self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("chat requests cancelled, epoch now {epoch}");
    }
}

struct ChatWorker<G> {
    generator: G,
    system: Option<Content>,
    turns: Vec<Content>,
    use_history: bool,
    epoch: Arc<AtomicU64>,
    rx: MessageRx,
    tx: ResponseTx,
}

impl<G: Generator> ChatWorker<G> {
    fn is_stale(&self, epoch: u64) -> bool {
        epoch != self.epoch.load(Ordering::SeqCst)
    }

    fn run_loop(&mut self) {
        while let Ok(message) = self.rx.recv() {
            let (user, epoch) = match message {
                Message::ChatWithSystem {
                    system,
                    user,
                    epoch,
                } => {
                    if self.is_stale(epoch) {
                        continue;
                    }
                    self.system = Some(system);
                    (user, epoch)
                }
                Message::Chat { user, epoch } => (user, epoch),
                Message::ClearHistory => {
                    self.turns.clear();
                    continue;
                }
                Message::UseHistory(enabled) => {
                    self.use_history = enabled;
                    continue;
                }
            };

            if self.is_stale(epoch) {
                log::debug!("skipping cancelled chat request");
                continue;
            }

            let Some(response) = self.exchange(user, epoch) else {
                continue;
            };
            if self.tx.send(response).is_err() {
                break;
            }
        }
        log::debug!("chat worker exit");
    }

    /// Runs one request. `None` when it was cancelled while generating.
    fn exchange(&mut self, user: Content, epoch: u64) -> Option<ChatResponse> {
        let mut prompts = Vec::with_capacity(self.turns.len() + 2);
        prompts.extend(self.system.iter().cloned());
        if self.use_history {
            prompts.extend(self.turns.iter().cloned());
        }
        prompts.push(user);

        let result = self.generator.generate(&prompts);

        if self.is_stale(epoch) {
            log::debug!("dropping reply of cancelled chat request");
            return None;
        }

        if let Ok(reply) = &result {
            if self.use_history {
                // the user turn is the last prompt
                self.turns.extend(prompts.pop());
                self.turns.push(Content::assistant(reply.clone()));
            }
        }
        Some(result.into())
    }
}
