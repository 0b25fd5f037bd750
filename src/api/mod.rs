pub(crate) mod models;

use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse, build_agent, fetch_json};

use self::models::{
    AvailabilityResponse, DiscoverPage, Envelope, GenreList, PlanRequest, PlanResponse,
    SearchHit, ShowWithEpisodes, WatchProviders,
};

const PROVIDER_FACADE: &str = "/providers/tmdb";
const AVAILABILITY_FACADE: &str = "/availability/v1/tmdb";
const EPISODE_FACADE: &str = "/providers/tvmaze";
const PLAN_GENERATE: &str = "/plan/v1/generate";

pub(crate) const DEFAULT_SORT_BY: &str = "popularity.desc";

/// A successfully decoded 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fetched<T> {
    pub(crate) http_status: u16,
    pub(crate) body: T,
}

pub(crate) type GenresEnvelope = Envelope<GenreList>;
pub(crate) type TitlesEnvelope = Envelope<DiscoverPage>;
pub(crate) type ProvidersEnvelope = Envelope<WatchProviders>;
pub(crate) type SearchEnvelope = Envelope<Vec<SearchHit>>;
pub(crate) type EpisodesEnvelope = Envelope<ShowWithEpisodes>;

#[derive(Debug, Clone)]
pub(crate) struct FacadeClient {
    agent: ureq::Agent,
    base_url: String,
}

impl FacadeClient {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            agent: build_agent(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn fetch<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<Fetched<T>> {
        let response = fetch_json(&self.agent, &request)?;
        Ok(decode(response)?)
    }

    pub(crate) fn genres(&self, language: &str) -> Result<Fetched<GenresEnvelope>> {
        self.fetch(
            HttpRequest::get(self.url(&format!("{PROVIDER_FACADE}/genre/tv/list")))
                .query("language", language),
        )
    }

    pub(crate) fn titles_by_genre(
        &self,
        genre_id: u64,
        sort_by: &str,
        page: u32,
    ) -> Result<Fetched<TitlesEnvelope>> {
        self.fetch(
            HttpRequest::get(self.url(&format!("{PROVIDER_FACADE}/discover/tv/by-genre")))
                .query("genre_id", genre_id.to_string())
                .query("sort_by", sort_by)
                .query("page", page.to_string()),
        )
    }

    pub(crate) fn availability(
        &self,
        title_id: u64,
        country: &str,
    ) -> Result<Fetched<AvailabilityResponse>> {
        self.fetch(
            HttpRequest::get(self.url(&format!("{AVAILABILITY_FACADE}/tv/{title_id}")))
                .query("country", country),
        )
    }

    pub(crate) fn watch_providers(
        &self,
        title_id: u64,
        country: &str,
    ) -> Result<Fetched<ProvidersEnvelope>> {
        self.fetch(
            HttpRequest::get(self.url(&format!(
                "{PROVIDER_FACADE}/tv/{title_id}/watch/providers"
            )))
            .query("country", country),
        )
    }

    pub(crate) fn show_with_episodes(&self, show_id: u64) -> Result<Fetched<EpisodesEnvelope>> {
        self.fetch(
            HttpRequest::get(self.url(&format!("{EPISODE_FACADE}/shows/{show_id}")))
                .query("embed", "episodes"),
        )
    }

    /// Search by display name, then load the top-ranked match with its
    /// episode list. Zero matches is reported as a 404 carrying the search body.
    pub(crate) fn episodes_for_title(&self, title_name: &str) -> Result<Fetched<EpisodesEnvelope>> {
        let response = fetch_json(
            &self.agent,
            &HttpRequest::get(self.url(&format!("{EPISODE_FACADE}/search/shows")))
                .query("q", title_name),
        )?;
        let raw_body = response.body.clone();
        let search: Fetched<SearchEnvelope> = decode(response)?;

        let Some(first) = search.body.data.first() else {
            return Err(FetchError::new("No TVmaze match found")
                .with_status(404)
                .with_body(raw_body)
                .into());
        };
        tracing::debug!(
            title = title_name,
            show_id = first.show.id,
            score = first.score,
            "episode search matched"
        );
        self.show_with_episodes(first.show.id)
    }

    pub(crate) fn generate_plan(&self, request: &PlanRequest) -> Result<Fetched<PlanResponse>> {
        let body = serde_json::to_value(request)?;
        self.fetch(HttpRequest::post_json(self.url(PLAN_GENERATE), body))
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<Fetched<T>, FetchError> {
    let HttpResponse { http_status, body } = response;
    match serde_json::from_value::<T>(body.clone()) {
        Ok(decoded) => Ok(Fetched {
            http_status,
            body: decoded,
        }),
        Err(err) => Err(FetchError::new(format!("Unexpected response shape: {err}"))
            .with_status(http_status)
            .with_body(body)),
    }
}
