//! The form: a pure view of the screen state plus key translation.
//!
//! Neither half keeps state of its own. Rendering draws whatever it is given,
//! and key handling turns a key press into a [`FormAction`] for the caller to
//! apply. Input is accepted verbatim; there is no validation.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;

use super::intent::ScreenIntent;
use super::state::{Focus, ScreenState};

const NAME_LABEL: &str = "Name";
const VIP_LABEL: &str = "Is VIP";
const SAVE_LABEL: &str = "Save";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    NameChanged(String),
    VipChanged(bool),
    SaveRequested,
    FocusNext,
    FocusPrev,
    Quit,
}

impl FormAction {
    /// State change implied by the action, if any. Saving and quitting are
    /// handled by the caller.
    pub fn into_intent(self) -> Option<ScreenIntent> {
        match self {
            FormAction::NameChanged(name) => Some(ScreenIntent::NameChanged(name)),
            FormAction::VipChanged(vip) => Some(ScreenIntent::VipChanged(vip)),
            FormAction::FocusNext => Some(ScreenIntent::FocusNext),
            FormAction::FocusPrev => Some(ScreenIntent::FocusPrev),
            FormAction::SaveRequested | FormAction::Quit => None,
        }
    }
}

/// Inputs of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormProps<'a> {
    pub name: &'a str,
    pub response: &'a str,
    pub vip: bool,
    pub focus: Focus,
    pub toast: Option<&'a str>,
}

impl<'a> From<&'a ScreenState> for FormProps<'a> {
    fn from(state: &'a ScreenState) -> Self {
        Self {
            name: &state.name,
            response: &state.response,
            vip: state.vip,
            focus: state.focus,
            toast: state.toast.as_ref().map(|t| t.message.as_str()),
        }
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::new().fg(Color::Yellow)
    } else {
        Style::new()
    }
}

pub fn render(frame: &mut Frame, props: &FormProps) {
    let [name_area, vip_area, save_area, response_area, _] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(frame.area());

    let name = Paragraph::new(props.name).block(
        Block::bordered()
            .title(NAME_LABEL)
            .border_style(focus_style(props.focus == Focus::Name)),
    );
    frame.render_widget(name, name_area);

    let switch = if props.vip { "[x]" } else { "[ ]" };
    let [label_area, switch_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(switch.len() as u16)])
            .areas(vip_area);
    frame.render_widget(Paragraph::new(VIP_LABEL), label_area);
    frame.render_widget(
        Paragraph::new(Span::styled(switch, focus_style(props.focus == Focus::Vip))),
        switch_area,
    );

    let save = Paragraph::new(SAVE_LABEL)
        .alignment(Alignment::Center)
        .block(Block::bordered().border_style(focus_style(props.focus == Focus::Save)));
    frame.render_widget(save, save_area);

    let response = Paragraph::new(Line::from(Span::styled(
        props.response,
        Style::new().add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(response, response_area);

    if let Some(message) = props.toast {
        render_toast(frame, message);
    }
}

fn render_toast(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let width = (message.chars().count() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let toast_area = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height - height,
        width,
        height,
    };
    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(Block::bordered()),
        toast_area,
    );
}

/// Translates a key press into an action for the focused control.
pub fn handle_key(props: &FormProps, key: KeyEvent) -> Option<FormAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(FormAction::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => return Some(FormAction::Quit),
        KeyCode::Tab | KeyCode::Down => return Some(FormAction::FocusNext),
        KeyCode::BackTab | KeyCode::Up => return Some(FormAction::FocusPrev),
        _ => {}
    }

    match props.focus {
        Focus::Name => match key.code {
            KeyCode::Char(c) => {
                let mut name = props.name.to_string();
                name.push(c);
                Some(FormAction::NameChanged(name))
            }
            KeyCode::Backspace if !props.name.is_empty() => {
                let mut name = props.name.to_string();
                name.pop();
                Some(FormAction::NameChanged(name))
            }
            KeyCode::Enter => Some(FormAction::FocusNext),
            _ => None,
        },
        Focus::Vip => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => Some(FormAction::VipChanged(!props.vip)),
            _ => None,
        },
        Focus::Save => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => Some(FormAction::SaveRequested),
            _ => None,
        },
    }
}
