//! Keyboard mapping
//!
//! Platforms translate their native key codes into [`Key`] and feed them
//! through an [`InputMap`], which produces per-slot [`ActionEvent`]s for the
//! simulation and match-level [`MatchCommand`]s for the driver.

use serde::{Deserialize, Serialize};

pub use crate::sim::Action;
use crate::sim::{ActionEvent, GamePhase, PLAYER_SLOTS};

/// Platform-neutral key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Space,
    Escape,
    RightShift,
    RightCtrl,
    Home,
    End,
    Delete,
    PageDown,
    Insert,
    PageUp,
    NumLock,
}

impl Key {
    /// Same key, ignoring letter case
    fn matches(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }
}

/// Match-level commands that do not belong to a player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCommand {
    Start,
    ToggleTeamSize,
    Quit,
}

/// Keys for one player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub up: Key,
    pub down: Key,
    pub left: Key,
    pub right: Key,
    pub model: Key,
    pub pass: Key,
    pub robot: Key,
}

impl KeyBindings {
    /// Default layout for a player slot
    pub fn for_slot(slot: usize) -> Self {
        match slot {
            0 => Self::chars(['e', 'x', 's', 'f', '1', '2', '4']),
            1 => Self {
                up: Key::Up,
                down: Key::Down,
                left: Key::Left,
                right: Key::Right,
                model: Key::Enter,
                pass: Key::RightShift,
                robot: Key::RightCtrl,
            },
            2 => Self::chars(['i', 'm', 'j', 'l', '7', '8', '0']),
            _ => Self {
                up: Key::Home,
                down: Key::End,
                left: Key::Delete,
                right: Key::PageDown,
                model: Key::Insert,
                pass: Key::PageUp,
                robot: Key::NumLock,
            },
        }
    }

    fn chars([up, down, left, right, model, pass, robot]: [char; 7]) -> Self {
        Self {
            up: Key::Char(up),
            down: Key::Char(down),
            left: Key::Char(left),
            right: Key::Char(right),
            model: Key::Char(model),
            pass: Key::Char(pass),
            robot: Key::Char(robot),
        }
    }

    /// Action bound to `key`, if any
    pub fn action_for(&self, key: Key) -> Option<Action> {
        [
            (self.up, Action::Up),
            (self.down, Action::Down),
            (self.left, Action::Left),
            (self.right, Action::Right),
            (self.model, Action::SwitchModel),
            (self.pass, Action::Pass),
            (self.robot, Action::ToggleAi),
        ]
        .into_iter()
        .find(|(bound, _)| bound.matches(&key))
        .map(|(_, action)| action)
    }
}

/// Bindings for every player slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMap {
    pub slots: [KeyBindings; PLAYER_SLOTS],
}

impl Default for InputMap {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(KeyBindings::for_slot),
        }
    }
}

impl InputMap {
    /// Route a key transition to every active slot bound to it
    pub fn translate(&self, key: Key, pressed: bool, num_players: usize) -> Vec<ActionEvent> {
        self.slots
            .iter()
            .take(num_players.min(PLAYER_SLOTS))
            .enumerate()
            .filter_map(|(player, bindings)| {
                bindings.action_for(key).map(|action| ActionEvent {
                    player,
                    action,
                    pressed,
                })
            })
            .collect()
    }

    /// Match-level key handling, applied on key press
    ///
    /// On the title screen Enter or Space kicks off; in play Space switches
    /// team size.
    pub fn command(&self, key: Key, phase: GamePhase) -> Option<MatchCommand> {
        match (key, phase) {
            (Key::Enter | Key::Space, GamePhase::Idle) => Some(MatchCommand::Start),
            (Key::Space, GamePhase::Playing) => Some(MatchCommand::ToggleTeamSize),
            (Key::Escape, _) => Some(MatchCommand::Quit),
            (Key::Char(c), _) if c.eq_ignore_ascii_case(&'q') => Some(MatchCommand::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{GameState, TickInput, tick};

    #[test]
    fn test_default_layout() {
        let map = InputMap::default();
        assert_eq!(map.slots[0].action_for(Key::Char('e')), Some(Action::Up));
        assert_eq!(map.slots[0].action_for(Key::Char('4')), Some(Action::ToggleAi));
        assert_eq!(map.slots[1].action_for(Key::RightShift), Some(Action::Pass));
        assert_eq!(map.slots[2].action_for(Key::Char('j')), Some(Action::Left));
        assert_eq!(map.slots[3].action_for(Key::PageDown), Some(Action::Right));
        assert_eq!(map.slots[3].action_for(Key::Char('e')), None);
    }

    #[test]
    fn test_translate_is_case_insensitive() {
        let map = InputMap::default();
        let events = map.translate(Key::Char('F'), true, 2);
        assert_eq!(
            events,
            vec![ActionEvent {
                player: 0,
                action: Action::Right,
                pressed: true,
            }]
        );
    }

    #[test]
    fn test_translate_skips_inactive_slots() {
        let map = InputMap::default();
        assert!(map.translate(Key::Char('i'), true, 2).is_empty());
        let events = map.translate(Key::Char('i'), false, 4);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].player, 2);
        assert!(!events[0].pressed);
    }

    #[test]
    fn test_shared_key_reaches_every_bound_slot() {
        let mut map = InputMap::default();
        map.slots[1].pass = Key::Char('2');
        let events = map.translate(Key::Char('2'), true, 2);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.action == Action::Pass));
    }

    #[test]
    fn test_match_commands() {
        let map = InputMap::default();
        assert_eq!(map.command(Key::Enter, GamePhase::Idle), Some(MatchCommand::Start));
        assert_eq!(map.command(Key::Space, GamePhase::Idle), Some(MatchCommand::Start));
        assert_eq!(
            map.command(Key::Space, GamePhase::Playing),
            Some(MatchCommand::ToggleTeamSize)
        );
        assert_eq!(map.command(Key::Enter, GamePhase::Playing), None);
        assert_eq!(map.command(Key::Char('Q'), GamePhase::Playing), Some(MatchCommand::Quit));
        assert_eq!(map.command(Key::Escape, GamePhase::Idle), Some(MatchCommand::Quit));
        assert_eq!(map.command(Key::Char('e'), GamePhase::Idle), None);
    }

    #[test]
    fn test_space_kicks_off_from_title_screen() {
        let map = InputMap::default();
        let mut state = GameState::new(&Settings::default(), 3);
        let mut input = TickInput::default();
        match map.command(Key::Space, state.phase) {
            Some(MatchCommand::Start) => input.start = true,
            Some(MatchCommand::ToggleTeamSize) => input.toggle_team_size = true,
            _ => {}
        }
        tick(&mut state, &input, 40.0, 40);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.num_players(), 2);

        // Same key in play switches to 2-on-2
        let mut input = TickInput::default();
        if map.command(Key::Space, state.phase) == Some(MatchCommand::ToggleTeamSize) {
            input.toggle_team_size = true;
        }
        tick(&mut state, &input, 40.0, 80);
        assert_eq!(state.num_players(), 4);
    }
}
