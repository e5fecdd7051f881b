use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::{
    board_full, check_winner, empty_cells, Board, Mark, CENTER_CELL, WIN_PATTERNS,
};
use crate::utils::now_ms;

/// 中等难度走启发式策略的概率，其余情况退回随机策略。
const HEURISTIC_CHANCE: f64 = 0.6;

/// AI 难度等级。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for AiDifficulty {
    fn default() -> Self {
        AiDifficulty::Easy
    }
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "medium" | "normal" => Ok(AiDifficulty::Medium),
            "hard" => Ok(AiDifficulty::Hard),
            _ => Err(()),
        }
    }
}

/// 一次决策的结果与诊断信息，序列化后交给前端展示。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<usize>,
    pub difficulty: AiDifficulty,
    pub nodes: u64,
    pub duration_ms: u64,
}

struct SearchStats {
    nodes: u64,
}

impl SearchStats {
    fn new() -> Self {
        Self { nodes: 0 }
    }
}

/// 电脑对手。持有自己的随机数源；决策只读取传入的棋盘，
/// 搜索全部发生在按值复制的局部棋盘上。
pub struct AiAgent {
    rng: SmallRng,
}

impl AiAgent {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// 按难度为 `mark` 选择一个落子位置；棋盘已满时返回 `None`。
    pub fn select_move(
        &mut self,
        board: &Board,
        mark: Mark,
        difficulty: AiDifficulty,
    ) -> Option<usize> {
        let mut stats = SearchStats::new();
        self.dispatch(board, mark, difficulty, &mut stats)
    }

    /// `select_move` 加上节点数与耗时统计。
    pub fn decide(&mut self, board: &Board, mark: Mark, difficulty: AiDifficulty) -> AiDecision {
        let start = now_ms();
        let mut stats = SearchStats::new();
        let cell = self.dispatch(board, mark, difficulty, &mut stats);
        AiDecision {
            cell,
            difficulty,
            nodes: stats.nodes,
            duration_ms: (now_ms() - start).max(0.0) as u64,
        }
    }

    fn dispatch(
        &mut self,
        board: &Board,
        mark: Mark,
        difficulty: AiDifficulty,
        stats: &mut SearchStats,
    ) -> Option<usize> {
        match difficulty {
            AiDifficulty::Hard => minimax_move(board, mark, stats),
            AiDifficulty::Medium => {
                if self.rng.gen::<f64>() < HEURISTIC_CHANCE {
                    self.heuristic_move(board, mark)
                } else {
                    self.random_move(board)
                }
            }
            AiDifficulty::Easy => self.random_move(board),
        }
    }

    fn random_move(&mut self, board: &Board) -> Option<usize> {
        empty_cells(board).choose(&mut self.rng).copied()
    }

    /// 固定优先级：自己成线 > 封堵对方 > 占中心 > 随机。
    fn heuristic_move(&mut self, board: &Board, mark: Mark) -> Option<usize> {
        if let Some(index) = find_completing_move(board, mark) {
            return Some(index);
        }
        if let Some(index) = find_completing_move(board, mark.opponent()) {
            return Some(index);
        }
        if board[CENTER_CELL].is_none() {
            return Some(CENTER_CELL);
        }
        self.random_move(board)
    }
}

impl Default for AiAgent {
    fn default() -> Self {
        AiAgent::new()
    }
}

/// 找出能让 `mark` 一步成线的位置：某条连线上已有两格同色且第三格为空。
/// 按固定连线顺序扫描，命中即返回。
fn find_completing_move(board: &Board, mark: Mark) -> Option<usize> {
    for pattern in WIN_PATTERNS {
        let owned = pattern
            .iter()
            .filter(|&&index| board[index] == Some(mark))
            .count();
        if owned != 2 {
            continue;
        }
        if let Some(&open) = pattern.iter().find(|&&index| board[index].is_none()) {
            return Some(open);
        }
    }
    None
}

/// 困难难度：完整博弈树搜索，分数严格大于才替换，
/// 因此并列时保留索引最小的着法。
fn minimax_move(board: &Board, mark: Mark, stats: &mut SearchStats) -> Option<usize> {
    let opponent = mark.opponent();
    let mut best_score = i32::MIN;
    let mut best_move = None;

    for index in 0..board.len() {
        if board[index].is_some() {
            continue;
        }
        let mut scratch = *board;
        scratch[index] = Some(mark);
        let score = minimax(scratch, 0, false, mark, opponent, stats);
        if score > best_score {
            best_score = score;
            best_move = Some(index);
        }
    }

    best_move
}

/// 递归打分。`depth` 为从根局面起已展开的层数；胜利分 `10 - depth`、
/// 失败分 `depth - 10`，因此更快的胜利和更晚的失败得分更高。
/// 每层复制一份棋盘，调用方的棋盘不会被改动。
/// 分支规模上限为 9!，仅在 3x3 下可接受；更大棋盘必须先加
/// alpha-beta 剪枝或置换表。
fn minimax(
    board: Board,
    depth: i32,
    maximizing: bool,
    mark: Mark,
    opponent: Mark,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;

    if let Some((winner, _)) = check_winner(&board) {
        return if winner == mark { 10 - depth } else { depth - 10 };
    }
    if board_full(&board) {
        return 0;
    }

    let actor = if maximizing { mark } else { opponent };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };

    for index in 0..board.len() {
        if board[index].is_some() {
            continue;
        }
        let mut scratch = board;
        scratch[index] = Some(actor);
        let score = minimax(scratch, depth + 1, !maximizing, mark, opponent, stats);
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }

    best
}
