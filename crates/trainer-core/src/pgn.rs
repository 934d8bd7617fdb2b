//! Move-list extraction from PGN text.
//!
//! The game text is read with `pgn-reader` and every main-line SAN is replayed
//! with shakmaty, so the returned list is known to be legal from its start
//! position. Only the first game of the text is used.

use std::io::Cursor;
use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, CastlingMode, Chess, Color, Position};

use crate::error::TrainerError;
use crate::game_data::GameHeaders;

/// Ordered main-line moves of one game, with its start position and headers.
#[derive(Debug, Clone)]
pub struct MoveList {
    headers: GameHeaders,
    start: Chess,
    moves: Vec<SanPlus>,
}

impl MoveList {
    /// Build a list without replaying it.
    ///
    /// Precondition: every move is legal in sequence from `start`. Lists from
    /// [`extract_moves`] always satisfy it; a list that does not will surface
    /// as `SequenceCorrupt` once the session reaches the bad ply.
    pub fn new(start: Chess, moves: Vec<SanPlus>) -> Self {
        Self {
            headers: GameHeaders::default(),
            start,
            moves,
        }
    }

    pub fn with_headers(mut self, headers: GameHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn headers(&self) -> &GameHeaders {
        &self.headers
    }

    pub fn start(&self) -> &Chess {
        &self.start
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, ply: usize) -> Option<&SanPlus> {
        self.moves.get(ply)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SanPlus> {
        self.moves.iter()
    }

    /// SAN strings of the first `plies` moves.
    pub fn san_prefix(&self, plies: usize) -> Vec<String> {
        self.moves
            .iter()
            .take(plies)
            .map(|san| san.to_string())
            .collect()
    }

    /// Side that plays the move at `ply`.
    pub fn side_at(&self, ply: usize) -> Color {
        let first = self.start.turn();
        if ply % 2 == 0 {
            first
        } else {
            first.other()
        }
    }

    /// Position after the first `plies` moves, rebuilt from the start.
    pub fn replay(&self, plies: usize) -> Result<Chess, TrainerError> {
        let mut pos = self.start.clone();
        for (ply, san_plus) in self.moves.iter().take(plies).enumerate() {
            let mv = san_plus
                .san
                .to_move(&pos)
                .map_err(|_| TrainerError::SequenceCorrupt {
                    ply,
                    san: san_plus.to_string(),
                })?;
            pos.play_unchecked(mv);
        }
        Ok(pos)
    }
}

/// Parse a PGN game into its ordered main-line moves.
///
/// Fails with `Parse` when the text holds no game, carries a bad `FEN` tag,
/// contains a move that is illegal where it is played, or has main-line
/// tokens that are not moves at all.
pub fn extract_moves(pgn: &str) -> Result<MoveList, TrainerError> {
    if pgn.trim().is_empty() {
        return Err(TrainerError::parse("empty PGN"));
    }

    let mut reader = Reader::new(Cursor::new(pgn.as_bytes()));
    let mut builder = MoveListBuilder;

    let list = match reader.read_game(&mut builder) {
        Ok(Some(result)) => result?,
        Ok(None) => return Err(TrainerError::parse("no game found")),
        Err(e) => return Err(TrainerError::parse(format!("read error: {e}"))),
    };

    // pgn-reader skips tokens it cannot read as SAN without telling the
    // visitor, so every main-line token must be accounted for.
    let tokens = mainline_tokens(pgn);
    if tokens.len() != list.len() {
        let reason = match tokens.iter().find(|t| t.parse::<SanPlus>().is_err()) {
            Some(token) => format!("unreadable move {token:?}"),
            None => format!("read {} of {} moves", list.len(), tokens.len()),
        };
        return Err(TrainerError::Parse { reason });
    }

    Ok(list)
}

/// Move tokens of the first game's main line, as written.
///
/// Tags, comments, escapes, variations, move numbers, NAGs and annotation
/// glyphs are skipped. Stops at the game result or the next game's tags.
fn mainline_tokens(pgn: &str) -> Vec<&str> {
    let bytes = pgn.as_bytes();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut in_movetext = false;
    let mut i = 0;

    while i < bytes.len() {
        let line_start = i == 0 || bytes[i - 1] == b'\n';
        match bytes[i] {
            b'%' if line_start => i = skip_until(bytes, i, b'\n'),
            b';' => i = skip_until(bytes, i, b'\n'),
            b'{' => i = skip_until(bytes, i, b'}') + 1,
            b'[' if depth == 0 => {
                if in_movetext {
                    break;
                }
                i = skip_tag(bytes, i);
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < bytes.len() && !is_delimiter(bytes[i]) {
                    i += 1;
                }
                if i == start {
                    // Stray `]` or `}`
                    i += 1;
                    continue;
                }
                in_movetext = true;
                if depth > 0 {
                    continue;
                }
                // Delimiters are ASCII, so the slice sits on char boundaries
                let token = &pgn[start..i];
                if matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*") {
                    break;
                }
                if let Some(san) = move_part(token) {
                    tokens.push(san);
                }
            }
        }
    }

    tokens
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'(' | b')' | b'[' | b']' | b';')
}

/// Index of the next `end` byte after `from`, or the end of input.
fn skip_until(bytes: &[u8], from: usize, end: u8) -> usize {
    bytes[from + 1..]
        .iter()
        .position(|&b| b == end)
        .map_or(bytes.len(), |offset| from + 1 + offset)
}

/// Index just past a `[Name "value"]` tag, honouring quoted `]`.
fn skip_tag(bytes: &[u8], from: usize) -> usize {
    let mut quoted = false;
    let mut i = from + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quoted => i += 1,
            b'"' => quoted = !quoted,
            b']' if !quoted => return i + 1,
            _ => {}
        }
        i += 1;
    }
    i
}

/// The move in a token like `12.e4!?`, or `None` for a bare move number,
/// NAG or glyph.
fn move_part(token: &str) -> Option<&str> {
    let after_number = token.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = if after_number.is_empty() || after_number.starts_with('.') {
        after_number.trim_start_matches('.')
    } else {
        token
    };
    let rest = rest.trim_end_matches(['!', '?']);

    if rest.is_empty() || rest.starts_with('$') || rest.chars().all(|c| matches!(c, '+' | '-' | '=')) {
        None
    } else {
        Some(rest)
    }
}

/// Tags collected during header parsing.
#[derive(Default)]
struct GameTags {
    seen: bool,
    headers: GameHeaders,
    start: Option<Chess>,
    error: Option<String>,
}

/// State during movetext parsing.
struct GameMoves {
    seen_tags: bool,
    headers: GameHeaders,
    start: Chess,
    board: Chess,
    moves: Vec<SanPlus>,
}

/// Visitor that replays the main line and keeps canonical SAN.
struct MoveListBuilder;

impl Visitor for MoveListBuilder {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = Result<MoveList, TrainerError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, GameTags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut GameTags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        tags.seen = true;
        let value = value.decode_utf8_lossy().to_string();

        if name == b"FEN" {
            let start = value
                .parse::<Fen>()
                .map_err(|e| e.to_string())
                .and_then(|fen| {
                    fen.into_position::<Chess>(CastlingMode::Standard)
                        .map_err(|e| e.to_string())
                });
            match start {
                Ok(pos) => tags.start = Some(pos),
                Err(e) => tags.error = Some(format!("bad FEN tag {value:?}: {e}")),
            }
        } else {
            tags.headers.set(name, value);
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: GameTags) -> ControlFlow<Self::Output, GameMoves> {
        if let Some(reason) = tags.error {
            return ControlFlow::Break(Err(TrainerError::Parse { reason }));
        }

        let start = tags.start.unwrap_or_default();
        ControlFlow::Continue(GameMoves {
            seen_tags: tags.seen,
            headers: tags.headers,
            board: start.clone(),
            start,
            moves: Vec::new(),
        })
    }

    fn san(&mut self, state: &mut GameMoves, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        match san_plus.san.to_move(&state.board) {
            Ok(mv) => {
                // Re-render from the legal move so disambiguation and check
                // suffixes are canonical.
                let canonical = SanPlus::from_move_and_play_unchecked(&mut state.board, mv);
                state.moves.push(canonical);
                ControlFlow::Continue(())
            }
            Err(e) => ControlFlow::Break(Err(TrainerError::parse(format!(
                "illegal move {} at ply {}: {e}",
                san_plus,
                state.moves.len() + 1
            )))),
        }
    }

    fn begin_variation(&mut self, _state: &mut GameMoves) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true)) // stay in the mainline
    }

    fn end_game(&mut self, state: GameMoves) -> Self::Output {
        if state.moves.is_empty() && !state.seen_tags {
            return Err(TrainerError::parse("no tags or moves"));
        }

        Ok(MoveList::new(state.start, state.moves).with_headers(state.headers))
    }
}
