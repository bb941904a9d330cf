use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::dialogue::{DialogueLine, DialogueOption, DialogueState, DialogueTone};

pub fn tone_color(tone: DialogueTone) -> Color {
    match tone {
        DialogueTone::Paragon => Color::Rgb(51, 128, 255),
        DialogueTone::Renegade => Color::Rgb(255, 51, 51),
        DialogueTone::Neutral => Color::Rgb(217, 217, 217),
    }
}

/// The player's options for the current line.
pub struct WheelComponent {
    line: DialogueLine,
    list_state: ListState,
}

impl WheelComponent {
    pub fn new() -> Self {
        Self {
            line: DialogueLine::default(),
            list_state: ListState::default(),
        }
    }

    pub fn set_line(&mut self, line: DialogueLine) {
        self.list_state
            .select(if line.options.is_empty() { None } else { Some(0) });
        self.line = line;
    }

    pub fn clear(&mut self) {
        self.set_line(DialogueLine::default());
    }

    pub fn option(&self, index: usize) -> Option<&DialogueOption> {
        self.line.options.get(index)
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn select_next(&mut self) {
        let n = self.line.options.len();
        if n == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % n);
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        let n = self.line.options.len();
        if n == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + n - 1) % n);
        self.list_state.select(Some(i));
    }

    pub fn render(&mut self, state: DialogueState, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().title("Responses").gray();

        match state {
            DialogueState::PlayerChoosing => {}
            DialogueState::WaitingForNPC => {
                let waiting = Paragraph::new(Line::raw("...").italic()).block(block);
                frame.render_widget(waiting, area);
                return;
            }
            DialogueState::Inactive | DialogueState::Ending => {
                let idle = Paragraph::new(Line::raw("No conversation. [Ctrl+S start]")).block(block);
                frame.render_widget(idle, area);
                return;
            }
        }

        let goodbye = self
            .line
            .options
            .len()
            .checked_sub(1)
            .filter(|_| self.line.is_goodbye);
        let items: Vec<ListItem> = self
            .line
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let mut label = format!("{}. {}", i + 1, option.label);
                if goodbye == Some(i) {
                    label.push_str("  (end)");
                }
                ListItem::new(label).style(Style::new().fg(tone_color(option.tone)))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::new().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> DialogueLine {
        DialogueLine {
            npc_text: "hi".to_string(),
            options: (0..n)
                .map(|i| DialogueOption::new(format!("o{i}"), DialogueTone::Neutral, ""))
                .collect(),
            is_goodbye: false,
        }
    }

    #[test]
    fn tone_colors() {
        assert_eq!(tone_color(DialogueTone::Paragon), Color::Rgb(51, 128, 255));
        assert_eq!(tone_color(DialogueTone::Renegade), Color::Rgb(255, 51, 51));
        assert_eq!(tone_color(DialogueTone::Neutral), Color::Rgb(217, 217, 217));
    }

    #[test]
    fn selection_wraps_around() {
        let mut wheel = WheelComponent::new();
        wheel.set_line(line(3));
        assert_eq!(wheel.selected(), Some(0));

        wheel.select_previous();
        assert_eq!(wheel.selected(), Some(2));
        wheel.select_next();
        assert_eq!(wheel.selected(), Some(0));
    }

    #[test]
    fn empty_wheel_has_no_selection() {
        let mut wheel = WheelComponent::new();
        wheel.set_line(line(2));
        wheel.clear();
        wheel.select_next();
        assert_eq!(wheel.selected(), None);
        assert!(wheel.option(0).is_none());
    }
}
