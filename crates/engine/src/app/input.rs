use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    /// Raw (unnormalized) movement axis; opposing keys cancel out. Screen y grows downward.
    pub(crate) fn movement_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.is_down(InputAction::MoveUp) {
            axis.y -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            axis.y += 1.0;
        }
        if self.is_down(InputAction::MoveLeft) {
            axis.x -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            axis.x += 1.0;
        }
        axis
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Text typed since the previous simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub typed: Vec<char>,
    pub enter_pressed: bool,
    pub backspace_pressed: bool,
}

impl TextInput {
    pub fn is_empty(&self) -> bool {
        self.typed.is_empty() && !self.enter_pressed && !self.backspace_pressed
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.typed
            .extend(text.chars().filter(|character| !character.is_control()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveLeft, true);
        states.set(InputAction::MoveRight, true);
        states.set(InputAction::MoveDown, true);
        assert_eq!(states.movement_axis(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn control_characters_are_not_typed() {
        let mut text = TextInput::default();
        text.push_text("a\u{8}\r b");
        assert_eq!(text.typed, vec!['a', ' ', 'b']);
    }
}
