use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::state::Mark;
use crate::ai::AiDifficulty;

const DEFAULT_NAME_X: &str = "Player X";
const DEFAULT_NAME_O: &str = "Player O";
const COMPUTER_NAME: &str = "Computer";

/// 对局模式：双人对战或人机对战。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Pvp,
    Pvc,
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::Pvp
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pvp" => Ok(GameMode::Pvp),
            "pvc" => Ok(GameMode::Pvc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerProfile {
    pub name: String,
    #[serde(default)]
    pub is_ai: bool,
}

impl PlayerProfile {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_ai: false,
        }
    }
}

/// 累计比分。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scores {
    pub x: u32,
    pub o: u32,
    #[serde(rename = "draw")]
    pub draws: u32,
}

fn default_sound() -> bool {
    true
}

/// 对局设置；字段默认值与前端存储层的缺省一致。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSettings {
    #[serde(default)]
    pub game_mode: GameMode,
    #[serde(default)]
    pub ai_difficulty: AiDifficulty,
    #[serde(default = "default_sound")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            game_mode: GameMode::default(),
            ai_difficulty: AiDifficulty::default(),
            sound_enabled: true,
            dark_mode: false,
        }
    }
}

/// 玩家名册：双方档案、比分与设置。
/// 以显式实例代替全局单例，由上层持有并传递。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRegistry {
    pub x: PlayerProfile,
    pub o: PlayerProfile,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default)]
    pub settings: MatchSettings,
}

impl PlayerRegistry {
    pub fn new(settings: MatchSettings) -> Self {
        let mut registry = Self {
            x: PlayerProfile::human(DEFAULT_NAME_X),
            o: PlayerProfile::human(DEFAULT_NAME_O),
            scores: Scores::default(),
            settings,
        };
        registry.apply_game_mode();
        registry
    }

    pub fn profile(&self, mark: Mark) -> &PlayerProfile {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }

    pub fn set_name(&mut self, mark: Mark, name: impl Into<String>) {
        match mark {
            Mark::X => self.x.name = name.into(),
            Mark::O => self.o.name = name.into(),
        }
    }

    /// 切换对局模式。人机模式下 O 方由电脑执子。
    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.settings.game_mode = mode;
        self.apply_game_mode();
    }

    pub fn set_ai_difficulty(&mut self, difficulty: AiDifficulty) {
        self.settings.ai_difficulty = difficulty;
    }

    /// 记录一局结果：`Some(mark)` 为胜方，`None` 为平局。
    pub fn record_result(&mut self, winner: Option<Mark>) -> Scores {
        match winner {
            Some(Mark::X) => self.scores.x += 1,
            Some(Mark::O) => self.scores.o += 1,
            None => self.scores.draws += 1,
        }
        self.scores
    }

    pub fn reset_scores(&mut self) {
        self.scores = Scores::default();
    }

    fn apply_game_mode(&mut self) {
        match self.settings.game_mode {
            GameMode::Pvc => {
                self.o.name = COMPUTER_NAME.to_string();
                self.o.is_ai = true;
            }
            GameMode::Pvp => {
                if self.o.is_ai {
                    self.o = PlayerProfile::human(DEFAULT_NAME_O);
                }
            }
        }
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        PlayerRegistry::new(MatchSettings::default())
    }
}
