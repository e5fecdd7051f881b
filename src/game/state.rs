use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 棋盘格子总数（3x3）。
pub const BOARD_CELLS: usize = 9;
/// 中心格索引。
pub const CENTER_CELL: usize = 4;

/// 全部获胜连线：3 行、3 列、2 条对角线。
/// 按固定顺序扫描，第一条命中的连线即为判定结果。
pub const WIN_PATTERNS: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 玩家标记。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "X" => Ok(Mark::X),
            "O" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

/// 单个格子：空，或某方的标记。
pub type Cell = Option<Mark>;

/// 行优先排列的 9 格棋盘。
pub type Board = [Cell; BOARD_CELLS];

/// 扫描所有连线，返回第一条三格同色的连线及其标记。
pub fn check_winner(board: &Board) -> Option<(Mark, [usize; 3])> {
    for pattern in WIN_PATTERNS {
        let [a, b, c] = pattern;
        if let Some(mark) = board[a] {
            if board[b] == Some(mark) && board[c] == Some(mark) {
                return Some((mark, pattern));
            }
        }
    }
    None
}

pub fn board_full(board: &Board) -> bool {
    board.iter().all(|cell| cell.is_some())
}

pub fn empty_cells(board: &Board) -> Vec<usize> {
    board
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_none())
        .map(|(index, _)| index)
        .collect()
}

/// 游戏整体状态。终局字段只由落子判定写入，不会与棋盘内容脱节。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_player: Mark,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_pattern: Option<[usize; 3]>,
    #[serde(default)]
    pub is_draw: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: [None; BOARD_CELLS],
            current_player: Mark::X,
            game_over: false,
            winner: None,
            win_pattern: None,
            is_draw: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.game_over
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

/// 一步棋的历史记录：落子位置、执子方以及落子前的棋盘快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRecord {
    pub index: usize,
    pub player: Mark,
    pub board: Board,
}

/// 落子结果。`valid` 为 false 时状态未发生任何变化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResult {
    pub valid: bool,
    pub board: Board,
    pub current_player: Mark,
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_pattern: Option<[usize; 3]>,
    #[serde(default)]
    pub is_draw: bool,
}

impl MoveResult {
    pub fn from_state(state: &GameState, valid: bool) -> Self {
        Self {
            valid,
            board: state.board,
            current_player: state.current_player,
            game_over: state.game_over,
            winner: state.winner,
            win_pattern: state.win_pattern,
            is_draw: state.is_draw,
        }
    }
}

/// 供外部持久化层整体往返的快照：状态加上可选的历史记录。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    #[serde(flatten)]
    pub state: GameState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub move_history: Vec<MoveRecord>,
}
