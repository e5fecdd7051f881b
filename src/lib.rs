pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiAgent, AiDecision, AiDifficulty};
pub use game::{
    Board, BoardEngine, Cell, GameMode, GameSnapshot, GameState, Mark, MatchSettings, MoveRecord,
    MoveResult, PlayerProfile, PlayerRegistry, Scores, WIN_PATTERNS,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_mark(text: &str) -> Result<Mark, JsValue> {
    Mark::from_str(text).map_err(|_| JsValue::from_str("invalid mark, expected \"X\" or \"O\""))
}

fn parse_difficulty(text: Option<&str>, fallback: AiDifficulty) -> AiDifficulty {
    text.and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or(fallback)
}

/// 解析持久化快照。损坏的快照按缺失处理并在控制台提示。
fn parse_snapshot(json: &str) -> Option<GameSnapshot> {
    match serde_json::from_str::<GameSnapshot>(json) {
        Ok(snapshot) => Some(snapshot),
        Err(error) => {
            web_sys::console::warn_1(&format!("discarding malformed snapshot: {error}").into());
            None
        }
    }
}

/// 顶层游戏引擎：棋盘引擎、玩家名册与电脑对手的组合，
/// 前端通过 JSON 字符串与它交互。
#[wasm_bindgen]
pub struct GameEngine {
    board: BoardEngine,
    players: PlayerRegistry,
    agent: AiAgent,
}

#[wasm_bindgen]
impl GameEngine {
    /// 可选地从持久化快照恢复；快照缺失或损坏时开新局。
    #[wasm_bindgen(constructor)]
    pub fn new(snapshot_json: Option<String>) -> GameEngine {
        let mut board = BoardEngine::new();
        board.restore(snapshot_json.as_deref().and_then(parse_snapshot));
        GameEngine {
            board,
            players: PlayerRegistry::default(),
            agent: AiAgent::new(),
        }
    }

    pub fn initialize(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.board.initialize()).map_err(serde_to_js_error)
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.board.state()).map_err(serde_to_js_error)
    }

    /// 含历史记录的完整快照，供 localStorage 原样保存。
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.board.snapshot()).map_err(serde_to_js_error)
    }

    /// 从快照 JSON 恢复。解析失败按快照缺失处理，重开新局。
    pub fn set_state_json(&mut self, json: &str) -> Result<String, JsValue> {
        serde_json::to_string(&self.board.restore(parse_snapshot(json))).map_err(serde_to_js_error)
    }

    pub fn apply_move(&mut self, index: usize) -> Result<String, JsValue> {
        serde_json::to_string(&self.board.apply_move(index)).map_err(serde_to_js_error)
    }

    /// 撤销最近一步；没有可撤销的步时返回 null。
    pub fn undo(&mut self) -> Result<JsValue, JsValue> {
        match self.board.undo() {
            Some(result) => to_value(&result).map_err(JsValue::from),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn win_pattern(&self) -> Result<JsValue, JsValue> {
        to_value(&self.board.win_pattern()).map_err(JsValue::from)
    }

    pub fn current_player(&self) -> String {
        self.board.state().current_player.to_string()
    }

    pub fn game_over(&self) -> bool {
        self.board.state().game_over
    }

    pub fn set_game_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = GameMode::from_str(mode)
            .map_err(|_| JsValue::from_str("invalid game mode, expected \"pvp\" or \"pvc\""))?;
        self.players.set_game_mode(mode);
        Ok(())
    }

    pub fn set_ai_difficulty(&mut self, difficulty: &str) -> Result<(), JsValue> {
        let difficulty = AiDifficulty::from_str(difficulty)
            .map_err(|_| JsValue::from_str("invalid difficulty"))?;
        self.players.set_ai_difficulty(difficulty);
        Ok(())
    }

    pub fn set_player_name(&mut self, mark: &str, name: &str) -> Result<(), JsValue> {
        let mark = parse_mark(mark)?;
        self.players.set_name(mark, name);
        Ok(())
    }

    /// 记录一局结果并返回最新比分。`winner` 缺省或不是 X/O 记为平局。
    pub fn record_outcome(&mut self, winner: Option<String>) -> Result<String, JsValue> {
        let winner = winner.as_deref().and_then(|value| Mark::from_str(value).ok());
        let scores = self.players.record_result(winner);
        serde_json::to_string(&scores).map_err(serde_to_js_error)
    }

    pub fn reset_scores(&mut self) {
        self.players.reset_scores();
    }

    pub fn scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.players.scores).map_err(serde_to_js_error)
    }

    pub fn players_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.players).map_err(serde_to_js_error)
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.players.settings).map_err(serde_to_js_error)
    }

    /// 为当前执子方选一个落子位置。棋盘已满时返回 -1。
    /// 难度缺省时使用设置里的难度。
    pub fn select_ai_move(&mut self, difficulty: Option<String>) -> i32 {
        let difficulty =
            parse_difficulty(difficulty.as_deref(), self.players.settings.ai_difficulty);
        let state = self.board.state();
        self.agent
            .select_move(&state.board, state.current_player, difficulty)
            .map(|index| index as i32)
            .unwrap_or(-1)
    }

    /// 异步版本：可选地先等待 `delay_ms` 毫秒模拟“思考”，
    /// 再返回带诊断信息的决策 JSON。决策本身仍是同步计算。
    pub fn think_ai(&self, difficulty: Option<String>, delay_ms: Option<u32>) -> Promise {
        let difficulty =
            parse_difficulty(difficulty.as_deref(), self.players.settings.ai_difficulty);
        let state = self.board.state();
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new();
            let decision = agent.decide(&state.board, state.current_player, difficulty);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 返回一个全新的空局状态，方便前端初始化。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::new()).map_err(JsValue::from)
}

/// 将传入的游戏状态深拷贝后返回。
#[wasm_bindgen(js_name = "cloneGameState")]
pub fn clone_game_state(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let cloned = state.clone();
    to_value(&cloned).map_err(JsValue::from)
}

/// 无状态落子：在传入的状态上落一子并返回结果，不持有任何内部状态。
#[wasm_bindgen(js_name = "applyMove")]
pub fn apply_move(state: JsValue, index: usize) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let mut engine = BoardEngine::new();
    engine.restore(Some(GameSnapshot {
        state,
        move_history: Vec::new(),
    }));
    to_value(&engine.apply_move(index)).map_err(JsValue::from)
}

#[derive(Serialize)]
struct WinnerReport {
    winner: Mark,
    win_pattern: [usize; 3],
}

/// 判定棋盘胜负：有人成线时返回 {winner, win_pattern}，否则返回 null。
#[wasm_bindgen(js_name = "checkWinner")]
pub fn check_winner_js(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let report = game::check_winner(&board).map(|(winner, win_pattern)| WinnerReport {
        winner,
        win_pattern,
    });
    to_value(&report).map_err(JsValue::from)
}

/// 无状态的 AI 决策入口。棋盘已满时返回 -1。
#[wasm_bindgen(js_name = "selectAiMove")]
pub fn select_ai_move(
    board: JsValue,
    mark: &str,
    difficulty: Option<String>,
) -> Result<i32, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let mark = parse_mark(mark)?;
    let difficulty = parse_difficulty(difficulty.as_deref(), AiDifficulty::Easy);
    let mut agent = AiAgent::new();
    Ok(agent
        .select_move(&board, mark, difficulty)
        .map(|index| index as i32)
        .unwrap_or(-1))
}
