//! Human-readable formatting for CLI output.

/// Format a [0,1] similarity score as a percentage.
pub fn format_score(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Format tempo with its classical tempo marking.
pub fn format_tempo(bpm: f64) -> String {
    let marking = if bpm < 60.0 {
        "Larghissimo"
    } else if bpm < 66.0 {
        "Largo"
    } else if bpm < 76.0 {
        "Adagio"
    } else if bpm < 108.0 {
        "Andante"
    } else if bpm < 132.0 {
        "Allegro"
    } else if bpm < 168.0 {
        "Vivace"
    } else {
        "Presto"
    };
    format!("{bpm:.0} BPM ({marking})")
}

/// Qualitative description of a bounded feature value, for the breakdown
/// view. Unknown feature names fall back to the bare number.
pub fn describe_feature(feature: &str, value: f64) -> String {
    let levels: Option<[&str; 3]> = match feature {
        "danceability" => Some([
            "Not very danceable",
            "Moderately danceable",
            "Very danceable",
        ]),
        "energy" => Some(["Low energy, calm", "Moderate energy", "High energy, intense"]),
        "valence" => Some(["Sad, negative mood", "Neutral mood", "Happy, positive mood"]),
        "acousticness" => Some([
            "Electronic",
            "Mixed acoustic/electronic",
            "Acoustic, natural",
        ]),
        "instrumentalness" => Some([
            "Contains vocals",
            "Mixed vocals/instrumental",
            "Instrumental only",
        ]),
        "liveness" => Some(["Studio recording", "Mixed live/studio", "Live performance"]),
        "speechiness" => Some(["Musical content", "Mixed speech/music", "Spoken word content"]),
        _ => None,
    };

    match levels {
        Some(levels) => {
            let level = if value < 0.33 {
                0
            } else if value < 0.67 {
                1
            } else {
                2
            };
            levels[level].to_string()
        }
        None => format!("{value:.2}"),
    }
}
