use crate::models::RecommendationResult;

/// Removes the reference favorite from its own recommendation list.
///
/// The recommender seeds its candidates from one of the user's favorites and
/// happily includes that favorite among them; a restaurant must never be
/// suggested as similar to itself. Matching is by exact, case-sensitive
/// name, and the bridge's ordering is preserved. A result with no reference
/// favorite passes through untouched.
pub fn reconcile(mut result: RecommendationResult) -> RecommendationResult {
    if let Some(reference) = &result.reference_favorite {
        let seed = reference.name.clone();
        result.recommendations.retain(|r| r.name != seed);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RestaurantSnapshot;

    fn snapshot(name: &str) -> RestaurantSnapshot {
        serde_json::from_value(serde_json::json!({ "name": name })).unwrap()
    }

    #[test]
    fn test_reference_favorite_excluded_from_list() {
        let result = reconcile(RecommendationResult {
            reference_favorite: Some(snapshot("Taco Hut")),
            recommendations: vec![snapshot("Taco Hut"), snapshot("Burger Barn")],
        });

        assert_eq!(result.reference_favorite.unwrap().name, "Taco Hut");
        assert_eq!(result.recommendations, vec![snapshot("Burger Barn")]);
    }

    #[test]
    fn test_missing_reference_passes_through() {
        let result = reconcile(RecommendationResult {
            reference_favorite: None,
            recommendations: vec![snapshot("Taco Hut"), snapshot("Burger Barn")],
        });

        assert_eq!(result.recommendations.len(), 2);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let result = reconcile(RecommendationResult {
            reference_favorite: Some(snapshot("Taco Hut")),
            recommendations: vec![snapshot("taco hut"), snapshot("TACO HUT")],
        });

        assert_eq!(result.recommendations.len(), 2);
    }

    #[test]
    fn test_every_duplicate_of_the_seed_is_removed() {
        let result = reconcile(RecommendationResult {
            reference_favorite: Some(snapshot("Taco Hut")),
            recommendations: vec![
                snapshot("Taco Hut"),
                snapshot("Burger Barn"),
                snapshot("Taco Hut"),
            ],
        });

        assert_eq!(result.recommendations, vec![snapshot("Burger Barn")]);
    }

    #[test]
    fn test_ordering_preserved() {
        let result = reconcile(RecommendationResult {
            reference_favorite: Some(snapshot("Seed")),
            recommendations: vec![snapshot("C"), snapshot("A"), snapshot("B")],
        });

        assert_eq!(
            result.recommendations,
            vec![snapshot("C"), snapshot("A"), snapshot("B")]
        );
    }
}
