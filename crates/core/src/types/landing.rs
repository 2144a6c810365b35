//! Campaign landing pages and the testimonial picker.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{LandingPageId, ProductId};
use crate::types::price;
use crate::types::product::Product;

/// Number of testimonials shown on a landing page.
pub const REVIEWS_SHOWN: usize = 3;

/// A backend-configured marketing page for one ad campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPage {
    #[serde(rename = "_id", alias = "id")]
    pub id: LandingPageId,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRef>,
    #[serde(
        default,
        with = "price::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub regular_price: Option<Decimal>,
    #[serde(
        default,
        with = "price::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub offer_price: Option<Decimal>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub is_active: bool,
}

impl LandingPage {
    /// Price the campaign sells at: the offer price, else the product's price.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.offer_price.unwrap_or_else(|| {
            self.product
                .as_ref()
                .and_then(ProductRef::populated)
                .map_or(Decimal::ZERO, Product::unit_price)
        })
    }

    /// Strike-through price, shown only when higher than what the customer pays.
    #[must_use]
    pub fn compare_at_price(&self) -> Option<Decimal> {
        let effective = self.effective_price();
        self.regular_price.filter(|regular| *regular > effective)
    }

    /// Pick the testimonials this campaign displays.
    ///
    /// Uses the page's own reviews, or `fallback` when it has none.
    #[must_use]
    pub fn featured_reviews(&self, fallback: &[Review]) -> Vec<Review> {
        let pool = if self.reviews.is_empty() {
            fallback
        } else {
            &self.reviews
        };
        select_reviews(&self.id, pool)
    }
}

/// A product reference that may or may not have been populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(ProductId),
    Populated(Box<Product>),
}

impl ProductRef {
    /// The referenced product id.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Id(id) => id,
            Self::Populated(product) => &product.id,
        }
    }

    /// The product document, when populated.
    #[must_use]
    pub fn populated(&self) -> Option<&Product> {
        match self {
            Self::Id(_) => None,
            Self::Populated(product) => Some(product),
        }
    }
}

/// A selling point on a landing page: either a bare line or a titled block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Feature {
    Text(String),
    Detailed {
        title: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl Feature {
    /// Headline text of the feature.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Detailed { title, .. } => title,
        }
    }
}

/// A customer testimonial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Pick [`REVIEWS_SHOWN`] reviews in an order fixed by the landing page id.
///
/// The same campaign always shows the same reviews in the same order, so
/// every visitor from one ad sees identical social proof. Not random in any
/// cryptographic sense.
#[must_use]
pub fn select_reviews(landing_page_id: &LandingPageId, pool: &[Review]) -> Vec<Review> {
    let mut picked = seeded_shuffle(pool, landing_page_id.as_str());
    picked.truncate(REVIEWS_SHOWN);
    picked
}

/// Permute `items` deterministically from a string seed.
///
/// A 32-bit FNV-1a hash of the seed drives a mulberry32 generator, which
/// feeds a Fisher-Yates shuffle.
#[must_use]
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: &str) -> Vec<T> {
    let mut out = items.to_vec();
    let mut rng = Mulberry32::new(fnv1a_32(seed));

    for i in (1..out.len()).rev() {
        let bound = u32::try_from(i + 1).unwrap_or(u32::MAX);
        let j = usize::try_from(rng.next_u32() % bound).unwrap_or_default();
        out.swap(i, j);
    }

    out
}

/// 32-bit FNV-1a.
#[must_use]
pub fn fnv1a_32(input: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    input.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(PRIME)
    })
}

/// mulberry32: tiny, fast, good enough for picking testimonials.
struct Mulberry32(u32);

impl Mulberry32 {
    const fn new(seed: u32) -> Self {
        Self(seed)
    }

    const fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_add(0x6d2b_79f5);
        let mut t = self.0;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pool(n: usize) -> Vec<Review> {
        (0..n)
            .map(|i| Review {
                name: format!("Customer {i}"),
                text: format!("Review {i}"),
                rating: Some(5),
                location: None,
            })
            .collect()
    }

    #[test]
    fn test_fnv1a_known_vectors() {
        assert_eq!(fnv1a_32(""), 0x811c_9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c_292c);
        assert_eq!(fnv1a_32("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_select_reviews_is_deterministic() {
        let reviews = pool(8);
        let id = LandingPageId::new("65a1b2c3d4e5f60718293a4b");
        let first = select_reviews(&id, &reviews);
        let second = select_reviews(&id, &reviews);
        assert_eq!(first.len(), REVIEWS_SHOWN);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_ids_usually_differ() {
        let reviews = pool(8);
        let picks: std::collections::HashSet<Vec<String>> = (0..10)
            .map(|i| {
                select_reviews(&LandingPageId::new(format!("campaign-{i}")), &reviews)
                    .into_iter()
                    .map(|r| r.name)
                    .collect()
            })
            .collect();
        assert!(picks.len() > 1);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let items: Vec<u32> = (0..20).collect();
        let mut shuffled = seeded_shuffle(&items, "seed");
        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn test_small_pools() {
        let id = LandingPageId::new("lp1");
        assert!(select_reviews(&id, &[]).is_empty());
        assert_eq!(select_reviews(&id, &pool(2)).len(), 2);
    }

    #[test]
    fn test_pricing_overrides() {
        let page: LandingPage = serde_json::from_value(json!({
            "_id": "lp1",
            "slug": "summer-mango",
            "product": {"_id": "p1", "name": "Mango", "basePrice": 1500},
            "regularPrice": 1500,
            "offerPrice": 1200,
            "features": ["Fresh", {"title": "Fast delivery", "description": "24h in Dhaka"}],
            "isActive": true
        }))
        .unwrap();

        assert_eq!(page.effective_price(), Decimal::from(1200));
        assert_eq!(page.compare_at_price(), Some(Decimal::from(1500)));
        assert_eq!(page.features[1].title(), "Fast delivery");
    }

    #[test]
    fn test_effective_price_without_offer_uses_product() {
        let page: LandingPage = serde_json::from_value(json!({
            "_id": "lp1",
            "slug": "honey",
            "product": {"_id": "p1", "basePrice": 800},
            "regularPrice": 800
        }))
        .unwrap();

        assert_eq!(page.effective_price(), Decimal::from(800));
        assert_eq!(page.compare_at_price(), None);
        assert!(!page.is_active);
    }

    #[test]
    fn test_featured_reviews_uses_fallback_pool() {
        let page: LandingPage =
            serde_json::from_value(json!({"_id": "lp1", "slug": "x"})).unwrap();
        let fallback = pool(5);
        let picked = page.featured_reviews(&fallback);
        assert_eq!(picked.len(), REVIEWS_SHOWN);
        assert!(picked.iter().all(|r| fallback.contains(r)));
    }
}
