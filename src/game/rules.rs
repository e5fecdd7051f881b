use super::state::{
    board_full, check_winner, Board, GameSnapshot, GameState, Mark, MoveRecord, MoveResult,
    BOARD_CELLS,
};

/// 棋盘引擎：棋盘状态、回合顺序与落子合法性的唯一数据源。
/// 历史记录由引擎独占，外界只能通过 `undo` 消费。
#[derive(Debug, Clone, Default)]
pub struct BoardEngine {
    state: GameState,
    history: Vec<MoveRecord>,
}

impl BoardEngine {
    pub fn new() -> Self {
        Self {
            state: GameState::new(),
            history: Vec::new(),
        }
    }

    /// 重置为空棋盘、X 先手、无历史。可重复调用。
    pub fn initialize(&mut self) -> GameState {
        self.state = GameState::new();
        self.history.clear();
        self.state.clone()
    }

    /// 在 `index` 处落子。终局、越界或格子已占用时不改动任何状态，
    /// 仅返回 `valid: false` 的结果。
    pub fn apply_move(&mut self, index: usize) -> MoveResult {
        if self.state.game_over || index >= BOARD_CELLS || self.state.board[index].is_some() {
            return MoveResult::from_state(&self.state, false);
        }

        self.history.push(MoveRecord {
            index,
            player: self.state.current_player,
            board: self.state.board,
        });

        let mark = self.state.current_player;
        self.state.board[index] = Some(mark);

        if let Some((winner, pattern)) = check_winner(&self.state.board) {
            self.state.game_over = true;
            self.state.winner = Some(winner);
            self.state.win_pattern = Some(pattern);
            self.state.is_draw = false;
        } else if board_full(&self.state.board) {
            self.state.game_over = true;
            self.state.is_draw = true;
        } else {
            self.state.current_player = mark.opponent();
        }

        MoveResult::from_state(&self.state, true)
    }

    /// 撤销最近一步：恢复落子前的棋盘与执子方，并清除终局标记。
    /// 终局一定由最后一步造成，所以撤销后必然回到非终局状态。
    pub fn undo(&mut self) -> Option<MoveResult> {
        let record = self.history.pop()?;
        self.state.board = record.board;
        self.state.current_player = record.player;
        self.state.game_over = false;
        self.state.winner = None;
        self.state.win_pattern = None;
        self.state.is_draw = false;
        Some(MoveResult::from_state(&self.state, true))
    }

    /// 当前状态的独立深拷贝。
    pub fn state(&self) -> GameState {
        self.state.clone()
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn win_pattern(&self) -> Option<[usize; 3]> {
        self.state.win_pattern
    }

    /// 含历史记录的完整快照，供持久化层原样往返。
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state.clone(),
            move_history: self.history.clone(),
        }
    }

    /// 从外部快照恢复；快照缺失时退回 `initialize`。
    pub fn restore(&mut self, snapshot: Option<GameSnapshot>) -> GameState {
        match snapshot {
            Some(snapshot) => {
                self.state = snapshot.state;
                self.history = snapshot.move_history;
                self.state.clone()
            }
            None => self.initialize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_moves(moves: &[usize]) -> BoardEngine {
        let mut engine = BoardEngine::new();
        for &index in moves {
            assert!(engine.apply_move(index).valid);
        }
        engine
    }

    #[test]
    fn center_opening() {
        let mut engine = BoardEngine::new();
        let result = engine.apply_move(4);
        assert!(result.valid);
        let state = engine.state();
        assert_eq!(state.board[4], Some(Mark::X));
        assert_eq!(state.current_player, Mark::O);
        assert!(!state.game_over);
    }

    #[test]
    fn completing_top_row_wins() {
        // X: 0, 1 / O: 3, 4，X 落 2 成线。
        let mut engine = engine_with_moves(&[0, 3, 1, 4]);
        let result = engine.apply_move(2);
        assert!(result.valid);
        assert!(result.game_over);
        assert_eq!(result.winner, Some(Mark::X));
        assert_eq!(result.win_pattern, Some([0, 1, 2]));
        assert!(!result.is_draw);
        // 终局时执子方不再切换。
        assert_eq!(result.current_player, Mark::X);
        assert_eq!(engine.win_pattern(), Some([0, 1, 2]));
    }

    #[test]
    fn full_board_without_winner_is_draw() {
        // X O X / X X O / O X O
        let mut engine = engine_with_moves(&[0, 1, 2, 5, 3, 6, 4, 8]);
        let result = engine.apply_move(7);
        assert!(result.valid);
        assert!(result.game_over);
        assert!(result.is_draw);
        assert_eq!(result.winner, None);
        assert_eq!(result.win_pattern, None);
    }

    #[test]
    fn occupied_cell_is_rejected_without_change() {
        let mut engine = engine_with_moves(&[4]);
        let before = engine.state();
        let result = engine.apply_move(4);
        assert!(!result.valid);
        assert_eq!(engine.state(), before);
    }

    #[test]
    fn out_of_range_index_is_rejected_without_change() {
        let mut engine = BoardEngine::new();
        let before = engine.state();
        let result = engine.apply_move(9);
        assert!(!result.valid);
        assert_eq!(engine.state(), before);
    }

    #[test]
    fn moves_after_game_over_are_rejected() {
        let mut engine = engine_with_moves(&[0, 3, 1, 4, 2]);
        let before = engine.state();
        assert!(before.game_over);
        let result = engine.apply_move(5);
        assert!(!result.valid);
        assert_eq!(engine.state(), before);
    }

    #[test]
    fn undo_restores_previous_position_exactly() {
        let mut engine = BoardEngine::new();
        let before = engine.state();
        engine.apply_move(4);
        let result = engine.undo().unwrap();
        assert!(result.valid);
        assert_eq!(engine.state(), before);
        assert_eq!(result.current_player, Mark::X);
    }

    #[test]
    fn undo_after_win_returns_to_live_game() {
        let mut engine = engine_with_moves(&[0, 3, 1, 4, 2]);
        assert!(engine.state().game_over);
        let result = engine.undo().unwrap();
        assert!(!result.game_over);
        assert_eq!(result.winner, None);
        assert_eq!(result.win_pattern, None);
        assert_eq!(result.current_player, Mark::X);
        assert_eq!(result.board[2], None);
    }

    #[test]
    fn undo_drains_history_then_fails() {
        let mut engine = engine_with_moves(&[0, 4, 8]);
        assert!(engine.undo().is_some());
        assert!(engine.undo().is_some());
        assert!(engine.undo().is_some());
        assert!(engine.undo().is_none());
        assert_eq!(engine.state(), GameState::new());
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut engine = engine_with_moves(&[0, 4]);
        let first = engine.initialize();
        let second = engine.initialize();
        assert_eq!(first, second);
        assert_eq!(first, GameState::new());
        assert!(engine.undo().is_none());
    }

    #[test]
    fn snapshot_round_trip_preserves_state_and_history() {
        let mut engine = engine_with_moves(&[0, 4, 1]);
        let snapshot = engine.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: GameSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = BoardEngine::new();
        restored.restore(Some(parsed));
        assert_eq!(restored.state(), engine.state());

        // 恢复后的历史仍然可以逐步撤销。
        assert!(restored.undo().is_some());
        assert!(restored.undo().is_some());
        assert!(restored.undo().is_some());
        assert!(restored.undo().is_none());
    }

    #[test]
    fn restore_without_snapshot_reinitializes() {
        let mut engine = engine_with_moves(&[0, 4, 1]);
        let state = engine.restore(None);
        assert_eq!(state, GameState::new());
        assert!(engine.undo().is_none());
    }
}
