use chrono::{DateTime, Local};
use crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::{
    layout::Rect,
    text::{Line, Text},
    widgets::{Block, Paragraph},
    Frame,
};

use super::Input;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    Npc(String),
    Player(String),
    Notice,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub at: DateTime<Local>,
    pub speaker: Speaker,
    pub text: String,
}

/// Splits `message` into rows of at most `max_len` columns, counting
/// non-ascii chars as two columns.
pub fn wrap_lines(message: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut rows = Vec::new();
    let mut s = String::with_capacity(max_len);
    let mut len = 0;
    for c in message.chars() {
        if c == '\n' {
            rows.push(std::mem::take(&mut s));
            len = 0;
            continue;
        }
        let w = if c.is_ascii() { 1 } else { 2 };
        if len + w > max_len {
            rows.push(std::mem::take(&mut s));
            len = 0;
        }
        s.push(c);
        len += w;
    }
    rows.push(s);
    rows
}

/// Scrollable history of the conversation.
pub struct TranscriptComponent {
    pub entries: Vec<Entry>,
    cursor: (u16, u16),
    last_mouse_event: MouseEvent,
    pub lock_on_bottom: bool,
    area: Rect,
    active: bool,
}

impl TranscriptComponent {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: (0, 0),
            lock_on_bottom: true,
            active: true,
            area: Rect::default(),
            last_mouse_event: MouseEvent {
                row: 0,
                column: 0,
                kind: MouseEventKind::Moved,
                modifiers: KeyModifiers::empty(),
            },
        }
    }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(Entry {
            at: Local::now(),
            speaker,
            text: text.into(),
        });
        self.lock_on_bottom = true;
    }

    fn update_active(&mut self, event: MouseEvent) {
        if event.kind == MouseEventKind::Down(MouseButton::Left) {
            self.active = self.area.contains(Position::new(event.column, event.row))
        }
        if event.kind == MouseEventKind::Drag(MouseButton::Left) && self.active {
            self.move_scroll(event);
        }
        self.last_mouse_event = event;
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.area = area;
        let max_len = area.width.max(3) as usize - 2;

        let mut text = Text::default();
        for entry in &self.entries {
            let (name, style) = match &entry.speaker {
                Speaker::Npc(name) => (name.as_str(), Style::new().fg(Color::Cyan)),
                Speaker::Player(name) => (name.as_str(), Style::new().fg(Color::Yellow)),
                Speaker::Notice => ("--", Style::new().fg(Color::DarkGray)),
            };
            text.extend([Line::styled(
                format!("[{}] {}:", entry.at.format("%H:%M:%S"), name),
                style.add_modifier(Modifier::BOLD),
            )]);
            for row in wrap_lines(&entry.text, max_len) {
                text.extend([Line::styled(row, style)]);
            }
            text.extend([Line::raw("")]);
        }

        let line_n = text.lines.len();
        let max_line = area.height.max(3) as usize - 2;
        if line_n > max_line {
            let max_cursor = line_n - max_line;
            if self.cursor.0 >= max_cursor as u16 {
                self.lock_on_bottom = true;
            }
            if self.lock_on_bottom {
                self.cursor.0 = max_cursor as u16;
            }
        } else {
            self.cursor.0 = 0;
        }

        let paragraph = Paragraph::new(text)
            .block(Block::bordered().title("Conversation").gray())
            .scroll(self.cursor);
        frame.render_widget(paragraph, area);
    }

    pub fn move_scroll(&mut self, event: MouseEvent) {
        let delta_y = event.row as i16 - self.last_mouse_event.row as i16;
        if delta_y != 0 {
            self.cursor.0 = (self.cursor.0 as i16 - delta_y).max(0) as u16;
            self.lock_on_bottom = false;
        }
    }

    pub fn handler_input(&mut self, input: Input) {
        if let Input::Event(Event::Mouse(event)) = input {
            match event.kind {
                MouseEventKind::ScrollDown => {
                    self.cursor.0 += 3;
                }
                MouseEventKind::ScrollUp => {
                    self.cursor.0 = self.cursor.0.max(3) - 3;
                    self.lock_on_bottom = false;
                }
                _ => {}
            }
            self.update_active(event);
        }
    }
}
