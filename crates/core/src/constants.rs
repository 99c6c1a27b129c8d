/// Default number of results kept in memory by the ring store.
pub const DEFAULT_STORE_CAPACITY: usize = 25;

/// Number of recently handled result ids the display sequencer remembers.
pub const DEFAULT_SEEN_WINDOW: usize = 256;

/// Event name used on the push channel for a newly accepted result.
pub const ANALYSIS_NEW_EVENT: &str = "analysis:new";

/// `meta.source` value stamped on results built by the fallback path.
pub const FALLBACK_SOURCE: &str = "fallback";

// Placeholders used when the fallback path cannot recover a field.
pub const PLACEHOLDER_COMPANY_NAME: &str = "Onbekend Bedrijf";
pub const PLACEHOLDER_VACANCY_TITLE: &str = "Vacature";
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://via.placeholder.com/400x300/2563eb/ffffff?text=Ideal+Candidate";

/// Lowest and highest score a result may carry.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;
