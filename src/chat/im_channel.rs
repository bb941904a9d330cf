use crate::sys::llm::Content;

use super::ChatResponse;

/// Requests from the owning thread to the chat worker.
#[derive(Debug, Clone)]
pub enum Message {
    ChatWithSystem {
        system: Content,
        user: Content,
        epoch: u64,
    },
    Chat {
        user: Content,
        epoch: u64,
    },
    ClearHistory,
    UseHistory(bool),
}

pub type MessageTx = crossbeam::channel::Sender<Message>;
pub type MessageRx = crossbeam::channel::Receiver<Message>;

pub type ResponseTx = crossbeam::channel::Sender<ChatResponse>;
pub type ResponseRx = crossbeam::channel::Receiver<ChatResponse>;
