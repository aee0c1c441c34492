//! Prompt text for the intent and narrative model calls.

use serde_json::Value;

use crate::geo::model::Poi;
use crate::geo::route::Route;

/// Fixed tour-guide persona for narrative generation.
pub const TOUR_SYSTEM_PROMPT: &str = "\
You are GeoExplore-AI, an expert tour guide and travel planner.
You create personalized walking/driving tours for cities using real
geographic data. For every stop you suggest, provide:
  - Name & address
  - A 2-3 sentence narrative with a fun historical or cultural fact
  - Estimated time to spend there

Always consider the user's preferences (interests, time constraints,
accessibility needs). Be enthusiastic but concise.";

/// System turn for intent extraction.
pub const INTENT_SYSTEM_PROMPT: &str = "Extract the tour intent from the user message. \
Return JSON with keys: tour_type, categories (list), num_stops (int), time_budget_min (int or null).";

/// Render preferences for a prompt; `none` when absent.
pub fn format_preferences(preferences: Option<&Value>) -> String {
    match preferences {
        None | Some(Value::Null) => "none".to_string(),
        Some(value) => value.to_string(),
    }
}

pub fn build_intent_user_prompt(message: &str, city: &str, preferences: Option<&Value>) -> String {
    format!(
        "{message}\nCity: {city}\nPreferences: {}",
        format_preferences(preferences)
    )
}

/// `- name (category)` per POI, one per line.
pub fn format_stops(pois: &[Poi]) -> String {
    pois.iter()
        .map(|p| format!("- {} ({})", p.name, p.category))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_narrative_user_prompt(
    pois: &[Poi],
    route: &Route,
    preferences: Option<&Value>,
) -> String {
    let mut prompt = format!(
        "Create an engaging tour narrative for these stops:\n{}\n\nUser preferences: {}",
        format_stops(pois),
        format_preferences(preferences)
    );
    if !route.is_fallback() {
        prompt.push_str(&format!(
            "\n\nRoute: {} miles, about {} minutes of travel.",
            route.total_distance_miles, route.total_time_min
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::geo::model::Location;

    fn poi(name: &str, category: &str) -> Poi {
        Poi {
            name: name.to_string(),
            category: category.to_string(),
            location: Location::new(40.0, -74.0),
            address: String::new(),
            description: String::new(),
            rating: None,
            image_url: None,
        }
    }

    #[test]
    fn stops_are_bulleted_name_and_category() {
        let text = format_stops(&[poi("Federal Hall", "Historic Sites"), poi("MoMA", "Museums")]);
        assert_eq!(text, "- Federal Hall (Historic Sites)\n- MoMA (Museums)");
    }

    #[test]
    fn intent_prompt_includes_city_and_preferences() {
        let prefs = json!({"interests": ["food"]});
        let prompt = build_intent_user_prompt("show me food", "nyc", Some(&prefs));
        assert_eq!(
            prompt,
            "show me food\nCity: nyc\nPreferences: {\"interests\":[\"food\"]}"
        );
        assert!(build_intent_user_prompt("x", "sf", None).ends_with("Preferences: none"));
    }

    #[test]
    fn narrative_prompt_skips_route_summary_on_fallback() {
        let pois = [poi("A", "Museums")];
        let prompt = build_narrative_user_prompt(&pois, &Route::fallback(&pois), None);
        assert!(prompt.starts_with("Create an engaging tour narrative for these stops:\n- A (Museums)"));
        assert!(prompt.ends_with("User preferences: none"));
    }

    #[test]
    fn narrative_prompt_mentions_route_metrics() {
        let pois = [poi("A", "Museums"), poi("B", "Parks and Gardens")];
        let route = Route {
            total_distance_miles: 2.5,
            total_time_min: 31.2,
            solved: true,
            ..Route::fallback(&pois)
        };
        let prompt = build_narrative_user_prompt(&pois, &route, None);
        assert!(prompt.contains("Route: 2.5 miles, about 31.2 minutes"));
    }

    #[test]
    fn narrative_prompt_mentions_solved_route_with_zero_metrics() {
        let pois = [poi("A", "Museums"), poi("B", "Museums")];
        let route = Route {
            solved: true,
            ..Route::fallback(&pois)
        };
        let prompt = build_narrative_user_prompt(&pois, &route, None);
        assert!(prompt.ends_with("Route: 0 miles, about 0 minutes of travel."));
    }

    #[test]
    fn persona_names_the_guide() {
        assert!(TOUR_SYSTEM_PROMPT.starts_with("You are GeoExplore-AI"));
        assert!(INTENT_SYSTEM_PROMPT.contains("num_stops"));
    }
}
