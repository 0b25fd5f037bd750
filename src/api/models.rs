use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Attribution {
    #[serde(default = "attribution_required_default")]
    pub(crate) required: bool,
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) url: Option<String>,
}

fn attribution_required_default() -> bool {
    true
}

/// Common wrapper around every provider façade response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) provider: String,
    pub(crate) retrieved_at: String,
    #[serde(default)]
    pub(crate) attribution: Option<Attribution>,
    #[serde(default)]
    pub(crate) request: Value,
    pub(crate) data: T,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Genre {
    pub(crate) id: u64,
    pub(crate) name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct GenreList {
    #[serde(default)]
    pub(crate) genres: Vec<Genre>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct DiscoverTitle {
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) original_name: Option<String>,
    #[serde(default)]
    pub(crate) first_air_date: Option<String>,
}

impl DiscoverTitle {
    pub(crate) fn display_name(&self) -> String {
        self.name
            .as_deref()
            .or(self.original_name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("TMDB {}", self.id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct DiscoverPage {
    #[serde(default)]
    pub(crate) page: Option<u32>,
    #[serde(default)]
    pub(crate) results: Vec<DiscoverTitle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ProviderCategory {
    Svod,
    Avod,
    Tvod,
    LiveBundle,
    Unknown,
}

impl ProviderCategory {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Svod => "svod",
            Self::Avod => "avod",
            Self::Tvod => "tvod",
            Self::LiveBundle => "live_bundle",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum AvailabilityNow {
    #[serde(rename = "true")]
    Yes,
    #[serde(rename = "false")]
    No,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AvailabilityNow {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Yes => "true",
            Self::No => "false",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// One (title, country, service) availability judgement. Round-trips into
/// the plan request unchanged, so optional fields are only written back when
/// the server sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AvailabilityAssessment {
    pub(crate) title_id: String,
    pub(crate) country: String,
    pub(crate) service_id: String,
    pub(crate) provider_category: ProviderCategory,
    pub(crate) availability_now: AvailabilityNow,
    pub(crate) confidence: Confidence,
    #[serde(default)]
    pub(crate) reason_codes: Vec<String>,
    #[serde(default)]
    pub(crate) evidence: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) availability_window: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) planning_hints: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct AvailabilityResponse {
    pub(crate) retrieved_at: String,
    #[serde(default)]
    pub(crate) assessments: Vec<AvailabilityAssessment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PlanRequest {
    pub(crate) country: String,
    pub(crate) horizon_days: i64,
    pub(crate) permanent_service_ids: Vec<String>,
    pub(crate) assessments: Vec<AvailabilityAssessment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PlanAction {
    Subscribe,
    Unsubscribe,
}

impl PlanAction {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct PlanEvent {
    pub(crate) action: PlanAction,
    pub(crate) service_id: String,
    pub(crate) effective_at: String,
    #[serde(default)]
    pub(crate) reason_codes: Vec<String>,
    #[serde(default)]
    pub(crate) title_ids: Vec<String>,
    #[serde(default)]
    pub(crate) assumptions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct PlanQuestion {
    pub(crate) id: String,
    pub(crate) key: String,
    pub(crate) prompt: String,
    pub(crate) required: bool,
    #[serde(default)]
    pub(crate) service_id: Option<String>,
    #[serde(default)]
    pub(crate) title_ids: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) answer_schema: Option<Value>,
    #[serde(default)]
    pub(crate) rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct PlanResponse {
    pub(crate) generated_at: String,
    pub(crate) country: String,
    pub(crate) horizon_days: i64,
    #[serde(default)]
    pub(crate) events: Vec<PlanEvent>,
    #[serde(default)]
    pub(crate) questions: Option<Vec<PlanQuestion>>,
}

impl PlanResponse {
    pub(crate) fn questions(&self) -> &[PlanQuestion] {
        self.questions.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct SearchShow {
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct SearchHit {
    #[serde(default)]
    pub(crate) score: f64,
    pub(crate) show: SearchShow,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct EpisodeRecord {
    #[serde(default)]
    pub(crate) id: Option<u64>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) season: Option<u32>,
    #[serde(default)]
    pub(crate) number: Option<u32>,
    #[serde(default)]
    pub(crate) airstamp: Option<String>,
    #[serde(default)]
    pub(crate) airdate: Option<String>,
    #[serde(default)]
    pub(crate) airtime: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct EmbeddedEpisodes {
    #[serde(default)]
    pub(crate) episodes: Vec<EpisodeRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ShowWithEpisodes {
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(rename = "_embedded", default)]
    pub(crate) embedded: Option<EmbeddedEpisodes>,
}

impl ShowWithEpisodes {
    pub(crate) fn episodes(&self) -> &[EpisodeRecord] {
        self.embedded
            .as_ref()
            .map(|embedded| embedded.episodes.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct WatchProvider {
    pub(crate) provider_id: u64,
    #[serde(default)]
    pub(crate) provider_name: Option<String>,
    #[serde(default)]
    pub(crate) display_priority: Option<u32>,
    #[serde(default)]
    pub(crate) logo_path: Option<String>,
}

impl WatchProvider {
    pub(crate) fn display_name(&self) -> String {
        self.provider_name
            .clone()
            .unwrap_or_else(|| format!("provider {}", self.provider_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct RegionProviders {
    #[serde(default)]
    pub(crate) link: Option<String>,
    #[serde(default)]
    pub(crate) flatrate: Option<Vec<WatchProvider>>,
    #[serde(default)]
    pub(crate) free: Option<Vec<WatchProvider>>,
    #[serde(default)]
    pub(crate) ads: Option<Vec<WatchProvider>>,
    #[serde(default)]
    pub(crate) rent: Option<Vec<WatchProvider>>,
    #[serde(default)]
    pub(crate) buy: Option<Vec<WatchProvider>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct WatchProviders {
    #[serde(default)]
    pub(crate) id: Option<u64>,
    #[serde(default)]
    pub(crate) country: Option<String>,
    #[serde(default)]
    pub(crate) result: Option<RegionProviders>,
}
