use crate::api::Fetched;
use crate::error::FetchError;

/// Identity of one fetch attempt. A completion only lands on a stage whose
/// pending token still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Token(u64);

#[derive(Debug, Default)]
pub(crate) struct TokenSource {
    last: u64,
}

impl TokenSource {
    pub(crate) fn issue(&mut self) -> Token {
        self.last += 1;
        Token(self.last)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StageState<T> {
    Idle,
    Loading,
    Success { http_status: u16, body: T },
    Error(FetchError),
}

impl<T> StageState<T> {
    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub(crate) fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub(crate) fn success(&self) -> Option<&T> {
        match self {
            Self::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success { .. } => "success",
            Self::Error(_) => "error",
        }
    }
}

#[derive(Debug)]
pub(crate) struct Stage<T> {
    state: StageState<T>,
    pending: Option<Token>,
}

impl<T> Default for Stage<T> {
    fn default() -> Self {
        Self {
            state: StageState::Idle,
            pending: None,
        }
    }
}

impl<T> Stage<T> {
    pub(crate) fn state(&self) -> &StageState<T> {
        &self.state
    }

    /// Back to idle; whatever is in flight can no longer land.
    pub(crate) fn reset(&mut self) {
        self.state = StageState::Idle;
        self.pending = None;
    }

    pub(crate) fn begin(&mut self, token: Token) {
        self.state = StageState::Loading;
        self.pending = Some(token);
    }

    /// Returns `false` (and changes nothing) for a superseded attempt.
    pub(crate) fn complete(&mut self, token: Token, result: Result<Fetched<T>, FetchError>) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        self.state = match result {
            Ok(Fetched { http_status, body }) => StageState::Success { http_status, body },
            Err(err) => StageState::Error(err),
        };
        true
    }
}
