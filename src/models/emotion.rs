/// Genres queried for emotions the built-in mapping does not know.
pub const DEFAULT_GENRES: &[&str] = &["Drama"];

/// Static emotion-to-genre table.
///
/// Lookup is case-insensitive; an unrecognized label resolves to
/// [`DEFAULT_GENRES`]. Callers cap consumption at three genres.
pub fn genres_for(emotion: &str) -> &'static [&'static str] {
    match emotion.to_ascii_lowercase().as_str() {
        "happy" => &["Comedy", "Romance", "Adventure"],
        "sad" => &["Family", "Animation", "Drama"],
        "angry" => &["Action", "Thriller"],
        "neutral" => &["Drama", "Mystery"],
        "surprise" => &["Sci-Fi", "Fantasy"],
        "fear" => &["Horror", "Thriller"],
        _ => DEFAULT_GENRES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_emotions_map_to_genres() {
        assert_eq!(genres_for("happy"), &["Comedy", "Romance", "Adventure"]);
        assert_eq!(genres_for("fear"), &["Horror", "Thriller"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(genres_for("HAPPY"), genres_for("happy"));
        assert_eq!(genres_for("Surprise"), genres_for("surprise"));
    }

    #[test]
    fn test_unknown_emotion_uses_default() {
        assert_eq!(genres_for("ecstatic"), DEFAULT_GENRES);
        assert_eq!(genres_for(""), DEFAULT_GENRES);
    }

    #[test]
    fn test_no_mapping_exceeds_three_genres() {
        for emotion in ["happy", "sad", "angry", "neutral", "surprise", "fear", "other"] {
            assert!(genres_for(emotion).len() <= 3);
        }
    }
}
