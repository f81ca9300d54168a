//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::EngineError;

/// One engine process shared by all requests; `None` when it failed to start
/// or has died.
pub type SharedEngine = Arc<Mutex<Option<StockfishEngine>>>;

/// A single PV line from multi-PV analysis. Scores are from the side to
/// move's point of view, as UCI reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PvLine {
    /// Principal variation in UCI notation
    pub pv: Vec<String>,
    /// Centipawn score
    pub cp: Option<i32>,
    /// Mate in N
    pub mate: Option<i32>,
}

pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: String,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &str, threads: u32, hash_mb: u32) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(e.to_string()))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("stdin not captured".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("stdout not captured".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: "stockfish".to_string(),
        };

        engine.send("uci").await?;
        loop {
            let line = engine.read_line().await?;
            if let Some(name) = line.strip_prefix("id name ") {
                engine.name = name.trim().to_string();
            } else if line == "uciok" {
                break;
            }
        }

        engine.send(&format!("setoption name Threads value {threads}")).await?;
        engine.send(&format!("setoption name Hash value {hash_mb}")).await?;
        engine.send("setoption name UCI_AnalyseMode value true").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    /// Engine name as reported by `id name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| EngineError::Io(format!("write failed: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| EngineError::Io(format!("flush failed: {e}")))?;
        Ok(())
    }

    /// Next trimmed output line; EOF means the process is gone.
    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| EngineError::Io(format!("read failed: {e}")))?;
        if n == 0 {
            return Err(EngineError::Terminated);
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(trimmed)
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    /// Search `fen` to a fixed depth and return up to `multipv` lines, best
    /// first. Lines the engine never filled in come back with an empty PV.
    pub async fn analyse(
        &mut self,
        fen: &str,
        depth: u32,
        multipv: u32,
    ) -> Result<Vec<PvLine>, EngineError> {
        // An abandoned search may still be running or have left its output in
        // the pipe. Everything before `readyok` belongs to it.
        self.send("stop").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await?;

        self.send(&format!("setoption name MultiPV value {multipv}")).await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut lines = vec![PvLine::default(); multipv as usize];

        loop {
            let line = self.read_line().await?;
            if line.starts_with("info") && line.contains(" pv ") {
                let pv_idx = parse_multipv_index(&line).unwrap_or(1).saturating_sub(1) as usize;
                if let Some(entry) = lines.get_mut(pv_idx) {
                    entry.cp = parse_cp(&line);
                    entry.mate = parse_mate(&line);
                    entry.pv = parse_pv(&line);
                }
            } else if line.starts_with("bestmove") {
                break;
            }
        }

        Ok(lines)
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

/// Lines plus the engine name, as produced by [`spawn_analysis`].
pub type AnalysisRun = Result<(Vec<PvLine>, String), EngineError>;

/// Runs one search on its own task, holding the engine lock until the engine
/// has answered. Dropping the returned handle does not cancel the search. A
/// process that dies mid-search is cleared from the slot.
pub fn spawn_analysis(
    mut slot: OwnedMutexGuard<Option<StockfishEngine>>,
    fen: String,
    depth: u32,
    multipv: u32,
) -> JoinHandle<AnalysisRun> {
    tokio::spawn(async move {
        let Some(sf) = slot.as_mut() else {
            return Err(EngineError::Terminated);
        };
        let result = sf
            .analyse(&fen, depth, multipv)
            .await
            .map(|lines| (lines, sf.name().to_string()));
        if matches!(result, Err(EngineError::Terminated)) {
            warn!("Stockfish exited during analysis; marking engine unavailable");
            *slot = None;
        }
        result
    })
}

/// Value following `key` in an info line.
fn parse_field(line: &str, key: &str) -> Option<i32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    parts
        .windows(2)
        .find(|w| w[0] == key)
        .and_then(|w| w[1].parse().ok())
}

fn parse_cp(line: &str) -> Option<i32> {
    parse_field(line, "cp")
}

fn parse_mate(line: &str) -> Option<i32> {
    parse_field(line, "mate")
}

fn parse_multipv_index(line: &str) -> Option<u32> {
    parse_field(line, "multipv").and_then(|v| u32::try_from(v).ok())
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|part| *part != "pv")
        .skip(1)
        .take_while(|part| !part.starts_with("bmc") && *part != "string")
        .map(str::to_string)
        .collect()
}
