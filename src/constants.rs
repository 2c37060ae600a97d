pub mod cache {

    pub const AVAILABILITY_TTL_DAYS: i64 = 7;
}

pub mod limits {

    pub const DEFAULT_MOOD_LIMIT: u64 = 30;

    pub const MAX_MOOD_LIMIT: u64 = 100;

    /// Upstream error bodies are cut to this many characters before logging.
    pub const DIAGNOSTIC_BODY_CHARS: usize = 400;
}

pub mod discovery {

    pub const TRAILER_CONCURRENCY: usize = 5;

    pub const MAX_TRAILER_ENRICHMENT: usize = 20;
}

pub mod moods {

    /// Mood → trigger substrings, scanned in order. The first mood with a
    /// trigger contained in the input wins.
    pub const SYNONYMS: &[(&str, &[&str])] = &[
        (
            "happy",
            &["happy", "cheerful", "joy", "glad", "upbeat", "good mood", "great day"],
        ),
        (
            "sad",
            &["sad", "down", "blue", "depressed", "heartbroken", "cry", "lonely"],
        ),
        (
            "excited",
            &["excited", "hyped", "pumped", "energetic", "adrenaline", "thrill"],
        ),
        (
            "romantic",
            &["romantic", "love", "date night", "crush", "in love", "valentine"],
        ),
        (
            "scared",
            &["scared", "spooky", "creepy", "horror", "fright", "halloween"],
        ),
        (
            "relaxed",
            &["relaxed", "chill", "calm", "lazy", "cozy", "unwind", "tired"],
        ),
        (
            "curious",
            &["curious", "learn", "think", "mind-bending", "mystery", "puzzle"],
        ),
        (
            "adventurous",
            &["adventurous", "explore", "journey", "travel", "epic", "quest"],
        ),
        (
            "nostalgic",
            &["nostalgic", "childhood", "old times", "classic", "retro", "memories"],
        ),
        ("angry", &["angry", "mad", "furious", "frustrated", "rage"]),
    ];

    /// Built-in mood → genre names, used when the mapping table has no rows.
    pub const GENRES: &[(&str, &[&str])] = &[
        ("happy", &["Comedy", "Family", "Animation", "Music"]),
        ("sad", &["Drama", "Romance"]),
        ("excited", &["Action", "Adventure", "Thriller"]),
        ("romantic", &["Romance", "Drama", "Comedy"]),
        ("scared", &["Horror", "Thriller", "Mystery"]),
        ("relaxed", &["Comedy", "Animation", "Family", "Documentary"]),
        ("curious", &["Mystery", "Science Fiction", "Documentary"]),
        ("adventurous", &["Adventure", "Fantasy", "Action"]),
        ("nostalgic", &["Family", "Animation", "History"]),
        ("angry", &["Action", "Crime", "Thriller"]),
    ];
}
