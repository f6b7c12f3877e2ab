use parking_lot::RwLock;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::providers::repo_types::{NewProvider, Provider};

/// Search filters for the provider listing. All matching is lowercase
/// substring matching; there is no ranking model.
#[derive(Debug, Default)]
pub struct ProviderFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

/// In-memory provider directory. Starts empty; listings come in through the
/// API.
#[derive(Default)]
pub struct ProviderDirectory {
    providers: RwLock<Vec<Provider>>,
}

impl ProviderDirectory {
    pub fn create(&self, new: NewProvider) -> Provider {
        let provider = Provider {
            id: Uuid::new_v4(),
            name: new.name,
            category: new.category,
            description: new.description,
            location: new.location,
            rating: 0.0,
            review_count: 0,
            pricing: new.pricing,
            created_at: OffsetDateTime::now_utc(),
            user_id: new.user_id,
        };
        let mut providers = self.providers.write();
        providers.push(provider.clone());
        debug!(provider_id = %provider.id, total = providers.len(), "provider created");
        provider
    }

    pub fn get(&self, id: Uuid) -> Option<Provider> {
        self.providers.read().iter().find(|p| p.id == id).cloned()
    }

    pub fn search(&self, filter: &ProviderFilter) -> Vec<Provider> {
        let q = filter.q.as_deref().map(str::to_lowercase);
        let category = filter.category.as_deref().map(str::to_lowercase);
        let location = filter.location.as_deref().map(str::to_lowercase);

        self.providers
            .read()
            .iter()
            .filter(|p| {
                let matches_q = q.as_deref().map_or(true, |q| {
                    let haystack = format!(
                        "{} {} {} {}",
                        p.name, p.description, p.category, p.location
                    )
                    .to_lowercase();
                    // Either direction: "emergency plumbing" finds the
                    // category, "plumb" finds the listing text.
                    haystack.contains(q) || q.contains(&p.category.to_lowercase())
                });
                let matches_category = category
                    .as_deref()
                    .map_or(true, |c| p.category.to_lowercase().contains(c));
                let matches_location = location
                    .as_deref()
                    .map_or(true, |l| p.location.to_lowercase().contains(l));
                matches_q && matches_category && matches_location
            })
            .cloned()
            .collect()
    }

    /// Fold a new rating into the provider's running average.
    pub fn add_review(&self, provider_id: Uuid, rating: u8) -> Option<Provider> {
        let mut providers = self.providers.write();
        let provider = providers.iter_mut().find(|p| p.id == provider_id)?;
        provider.review_count += 1;
        let count = provider.review_count as f64;
        provider.rating = (provider.rating * (count - 1.0) + rating as f64) / count;
        Some(provider.clone())
    }
}
