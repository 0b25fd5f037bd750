use std::collections::HashSet;
use std::hash::Hash;

use crate::api::models::{RegionProviders, WatchProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ProviderBucket {
    Flatrate,
    Free,
    Ads,
    Rent,
    Buy,
}

impl ProviderBucket {
    /// Declared iteration order for flattening.
    pub(crate) const ORDER: [ProviderBucket; 5] = [
        Self::Flatrate,
        Self::Free,
        Self::Ads,
        Self::Rent,
        Self::Buy,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Flatrate => "subscription",
            Self::Free => "free",
            Self::Ads => "ads",
            Self::Rent => "rent",
            Self::Buy => "buy",
        }
    }

    fn entries(self, region: &RegionProviders) -> &[WatchProvider] {
        let list = match self {
            Self::Flatrate => &region.flatrate,
            Self::Free => &region.free,
            Self::Ads => &region.ads,
            Self::Rent => &region.rent,
            Self::Buy => &region.buy,
        };
        list.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ListedProvider {
    pub(crate) bucket: ProviderBucket,
    pub(crate) provider: WatchProvider,
}

/// Keeps the first item seen for each key, preserving input order.
pub(crate) fn dedupe_first_wins<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

pub(crate) fn flatten_providers(region: &RegionProviders) -> Vec<ListedProvider> {
    let listed = ProviderBucket::ORDER.into_iter().flat_map(|bucket| {
        bucket
            .entries(region)
            .iter()
            .map(move |provider| ListedProvider {
                bucket,
                provider: provider.clone(),
            })
    });
    dedupe_first_wins(listed, |item| item.provider.provider_id)
}
