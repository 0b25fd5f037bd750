//! Dependent-query controller for the Genre → Title → Service drill-down.
//!
//! Every stage holds a [`StageState`] plus the token of its in-flight fetch.
//! User actions return the [`FetchRequest`]s that must be executed; their
//! results come back as [`FetchOutcome`]s and are applied through
//! [`Cascade::apply`], which drops anything issued before the latest reset.

use crate::api::models::{
    AvailabilityAssessment, AvailabilityNow, AvailabilityResponse, Confidence, PlanRequest,
    PlanResponse, ProviderCategory,
};
use crate::api::{EpisodesEnvelope, Fetched, GenresEnvelope, ProvidersEnvelope, TitlesEnvelope};
use crate::config::Config;
use crate::error::FetchError;

use super::plan::{PlanInputs, build_plan_request, effective_country};
use super::stage::{Stage, StageState, Token, TokenSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum StageId {
    Genres,
    Titles,
    Availability,
    Providers,
    Episodes,
    Plan,
}

impl StageId {
    pub(crate) const ALL: [StageId; 6] = [
        Self::Genres,
        Self::Titles,
        Self::Availability,
        Self::Providers,
        Self::Episodes,
        Self::Plan,
    ];

    /// Position in the dependency chain. Stages sharing a depth are siblings.
    pub(crate) fn depth(self) -> u8 {
        match self {
            Self::Genres => 0,
            Self::Titles => 1,
            Self::Availability | Self::Providers => 2,
            Self::Episodes | Self::Plan => 3,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Genres => "genres",
            Self::Titles => "titles",
            Self::Availability => "availability",
            Self::Providers => "providers",
            Self::Episodes => "episodes",
            Self::Plan => "plan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GenreSelection {
    pub(crate) id: u64,
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TitleSelection {
    pub(crate) tmdb_id: u64,
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServiceSelection {
    pub(crate) service_id: String,
    pub(crate) category: ProviderCategory,
    pub(crate) availability_now: AvailabilityNow,
    pub(crate) confidence: Confidence,
}

impl From<&AvailabilityAssessment> for ServiceSelection {
    fn from(assessment: &AvailabilityAssessment) -> Self {
        Self {
            service_id: assessment.service_id.clone(),
            category: assessment.provider_category,
            availability_now: assessment.availability_now,
            confidence: assessment.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FetchRequest {
    Genres { token: Token, language: String },
    Titles { token: Token, genre_id: u64 },
    Availability { token: Token, title_id: u64, country: String },
    Providers { token: Token, title_id: u64, country: String },
    Episodes { token: Token, title_name: String },
    Plan { token: Token, request: PlanRequest },
}

impl FetchRequest {
    pub(crate) fn stage(&self) -> StageId {
        match self {
            Self::Genres { .. } => StageId::Genres,
            Self::Titles { .. } => StageId::Titles,
            Self::Availability { .. } => StageId::Availability,
            Self::Providers { .. } => StageId::Providers,
            Self::Episodes { .. } => StageId::Episodes,
            Self::Plan { .. } => StageId::Plan,
        }
    }

    pub(crate) fn token(&self) -> Token {
        match self {
            Self::Genres { token, .. }
            | Self::Titles { token, .. }
            | Self::Availability { token, .. }
            | Self::Providers { token, .. }
            | Self::Episodes { token, .. }
            | Self::Plan { token, .. } => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Completion<T> {
    pub(crate) token: Token,
    pub(crate) result: Result<Fetched<T>, FetchError>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FetchOutcome {
    Genres(Completion<GenresEnvelope>),
    Titles(Completion<TitlesEnvelope>),
    Availability(Completion<AvailabilityResponse>),
    Providers(Completion<ProvidersEnvelope>),
    Episodes(Completion<EpisodesEnvelope>),
    Plan(Completion<PlanResponse>),
}

impl FetchOutcome {
    pub(crate) fn stage(&self) -> StageId {
        match self {
            Self::Genres(_) => StageId::Genres,
            Self::Titles(_) => StageId::Titles,
            Self::Availability(_) => StageId::Availability,
            Self::Providers(_) => StageId::Providers,
            Self::Episodes(_) => StageId::Episodes,
            Self::Plan(_) => StageId::Plan,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Cascade {
    language: String,
    tokens: TokenSource,
    country: String,
    horizon_days: String,
    permanent_service_ids: String,

    genre: Option<GenreSelection>,
    title: Option<TitleSelection>,
    service: Option<ServiceSelection>,

    genres: Stage<GenresEnvelope>,
    titles: Stage<TitlesEnvelope>,
    availability: Stage<AvailabilityResponse>,
    providers: Stage<ProvidersEnvelope>,
    episodes: Stage<EpisodesEnvelope>,
    plan: Stage<PlanResponse>,
}

impl Cascade {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            language: config.language.clone(),
            tokens: TokenSource::default(),
            country: config.country.clone(),
            horizon_days: config.horizon_days.clone(),
            permanent_service_ids: config.permanent_service_ids.clone(),
            genre: None,
            title: None,
            service: None,
            genres: Stage::default(),
            titles: Stage::default(),
            availability: Stage::default(),
            providers: Stage::default(),
            episodes: Stage::default(),
            plan: Stage::default(),
        }
    }

    pub(crate) fn genres(&self) -> &StageState<GenresEnvelope> {
        self.genres.state()
    }

    pub(crate) fn titles(&self) -> &StageState<TitlesEnvelope> {
        self.titles.state()
    }

    pub(crate) fn availability(&self) -> &StageState<AvailabilityResponse> {
        self.availability.state()
    }

    pub(crate) fn providers(&self) -> &StageState<ProvidersEnvelope> {
        self.providers.state()
    }

    pub(crate) fn episodes(&self) -> &StageState<EpisodesEnvelope> {
        self.episodes.state()
    }

    pub(crate) fn plan(&self) -> &StageState<PlanResponse> {
        self.plan.state()
    }

    pub(crate) fn selected_genre(&self) -> Option<&GenreSelection> {
        self.genre.as_ref()
    }

    pub(crate) fn selected_title(&self) -> Option<&TitleSelection> {
        self.title.as_ref()
    }

    pub(crate) fn selected_service(&self) -> Option<&ServiceSelection> {
        self.service.as_ref()
    }

    pub(crate) fn country(&self) -> &str {
        &self.country
    }

    pub(crate) fn plan_inputs(&self) -> PlanInputs {
        PlanInputs {
            country: self.country.clone(),
            horizon_days: self.horizon_days.clone(),
            permanent_service_ids: self.permanent_service_ids.clone(),
        }
    }

    /// Root stage: loads once, the first time it is asked to.
    pub(crate) fn start(&mut self) -> Option<FetchRequest> {
        if !self.genres.state().is_idle() {
            return None;
        }
        Some(self.begin_genres())
    }

    /// Manual retry of a failed root load.
    pub(crate) fn retry_genres(&mut self) -> Option<FetchRequest> {
        self.genres.state().error()?;
        Some(self.begin_genres())
    }

    fn begin_genres(&mut self) -> FetchRequest {
        let token = self.tokens.issue();
        self.genres.begin(token);
        tracing::info!(stage = "genres", language = %self.language, "loading");
        FetchRequest::Genres {
            token,
            language: self.language.clone(),
        }
    }

    /// Resets every stage at `depth` or deeper and clears the selections
    /// made on those stages.
    fn invalidate_from(&mut self, depth: u8) {
        for stage in StageId::ALL {
            if stage.depth() >= depth {
                self.reset_stage(stage);
            }
        }
        if depth <= StageId::Titles.depth() {
            self.title = None;
        }
        if depth <= StageId::Availability.depth() {
            self.service = None;
        }
        if depth <= StageId::Genres.depth() {
            self.genre = None;
        }
    }

    fn reset_stage(&mut self, stage: StageId) {
        match stage {
            StageId::Genres => self.genres.reset(),
            StageId::Titles => self.titles.reset(),
            StageId::Availability => self.availability.reset(),
            StageId::Providers => self.providers.reset(),
            StageId::Episodes => self.episodes.reset(),
            StageId::Plan => self.plan.reset(),
        }
    }

    pub(crate) fn select_genre(&mut self, genre: GenreSelection) -> Vec<FetchRequest> {
        self.invalidate_from(StageId::Titles.depth());
        let genre_id = genre.id;
        tracing::info!(stage = "titles", genre_id, genre = %genre.name, "loading");
        self.genre = Some(genre);

        let token = self.tokens.issue();
        self.titles.begin(token);
        vec![FetchRequest::Titles { token, genre_id }]
    }

    pub(crate) fn select_title(&mut self, title: TitleSelection) -> Vec<FetchRequest> {
        self.invalidate_from(StageId::Availability.depth());
        self.title = Some(title);
        self.begin_availability()
    }

    /// Country feeds the availability/provider stages; only a change of the
    /// effective value invalidates them.
    pub(crate) fn set_country(&mut self, raw: &str) -> Vec<FetchRequest> {
        let previous = effective_country(&self.country);
        self.country = raw.to_string();
        if previous.eq_ignore_ascii_case(&effective_country(raw)) {
            return Vec::new();
        }

        self.invalidate_from(StageId::Availability.depth());
        if self.title.is_none() {
            return Vec::new();
        }
        self.begin_availability()
    }

    fn begin_availability(&mut self) -> Vec<FetchRequest> {
        let Some(title) = self.title.as_ref() else {
            return Vec::new();
        };
        let title_id = title.tmdb_id;
        let country = effective_country(&self.country);
        tracing::info!(stage = "availability", title_id, country = %country, "loading");

        let availability_token = self.tokens.issue();
        self.availability.begin(availability_token);
        let providers_token = self.tokens.issue();
        self.providers.begin(providers_token);

        vec![
            FetchRequest::Availability {
                token: availability_token,
                title_id,
                country: country.clone(),
            },
            FetchRequest::Providers {
                token: providers_token,
                title_id,
                country: country.to_uppercase(),
            },
        ]
    }

    pub(crate) fn select_service(&mut self, service: ServiceSelection) -> Vec<FetchRequest> {
        let Some(title_name) = self.title.as_ref().map(|title| title.name.clone()) else {
            return Vec::new();
        };
        self.invalidate_from(StageId::Episodes.depth());
        tracing::info!(stage = "episodes", service = %service.service_id, title = %title_name, "loading");
        self.service = Some(service);

        let token = self.tokens.issue();
        self.episodes.begin(token);
        vec![FetchRequest::Episodes { token, title_name }]
    }

    pub(crate) fn set_horizon_days(&mut self, raw: &str) {
        self.horizon_days = raw.to_string();
    }

    pub(crate) fn set_permanent_service_ids(&mut self, raw: &str) {
        self.permanent_service_ids = raw.to_string();
    }

    pub(crate) fn horizon_days(&self) -> &str {
        &self.horizon_days
    }

    pub(crate) fn permanent_service_ids(&self) -> &str {
        &self.permanent_service_ids
    }

    /// Needs loaded availability; otherwise nothing happens.
    pub(crate) fn generate_plan(&mut self) -> Option<FetchRequest> {
        let assessments = &self.availability.state().success()?.assessments;
        let request = build_plan_request(&self.plan_inputs(), assessments);
        tracing::info!(
            stage = "plan",
            country = %request.country,
            horizon_days = request.horizon_days,
            assessments = request.assessments.len(),
            "generating"
        );

        let token = self.tokens.issue();
        self.plan.begin(token);
        Some(FetchRequest::Plan { token, request })
    }

    /// Applies a completion if it is still current. Returns whether it landed.
    pub(crate) fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let stage = outcome.stage();
        let (token, failure) = match &outcome {
            FetchOutcome::Genres(done) => (done.token, done.result.as_ref().err().cloned()),
            FetchOutcome::Titles(done) => (done.token, done.result.as_ref().err().cloned()),
            FetchOutcome::Availability(done) => (done.token, done.result.as_ref().err().cloned()),
            FetchOutcome::Providers(done) => (done.token, done.result.as_ref().err().cloned()),
            FetchOutcome::Episodes(done) => (done.token, done.result.as_ref().err().cloned()),
            FetchOutcome::Plan(done) => (done.token, done.result.as_ref().err().cloned()),
        };

        let applied = match outcome {
            FetchOutcome::Genres(done) => self.genres.complete(done.token, done.result),
            FetchOutcome::Titles(done) => self.titles.complete(done.token, done.result),
            FetchOutcome::Availability(done) => self.availability.complete(done.token, done.result),
            FetchOutcome::Providers(done) => self.providers.complete(done.token, done.result),
            FetchOutcome::Episodes(done) => self.episodes.complete(done.token, done.result),
            FetchOutcome::Plan(done) => self.plan.complete(done.token, done.result),
        };

        if !applied {
            tracing::debug!(stage = stage.label(), ?token, "discarding stale completion");
            return false;
        }
        match failure {
            Some(err) => tracing::warn!(
                stage = stage.label(),
                http_status = ?err.http_status,
                error = %err.message,
                "stage failed"
            ),
            None => tracing::info!(stage = stage.label(), "loaded"),
        }
        true
    }
}
