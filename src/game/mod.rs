//! 游戏核心逻辑模块（棋盘状态、规则引擎、玩家名册）。

pub mod players;
pub mod rules;
pub mod state;

pub use players::{GameMode, MatchSettings, PlayerProfile, PlayerRegistry, Scores};
pub use rules::BoardEngine;
pub use state::{
    board_full,
    check_winner,
    empty_cells,
    Board,
    Cell,
    GameSnapshot,
    GameState,
    Mark,
    MoveRecord,
    MoveResult,
    BOARD_CELLS,
    CENTER_CELL,
    WIN_PATTERNS,
};
