use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Score breakpoints for the gamification levels. Level and level name are
/// always derived from the score on read, never stored.
const SCORE_LEVELS: [(i64, i64, i64, &str); 5] = [
    (51, 65, 1, "Getting Started"),
    (65, 78, 2, "Building Momentum"),
    (78, 87, 3, "Strong Foundation"),
    (87, 95, 4, "Financial Pro"),
    (95, 100, 5, "Master"),
];

/// Resolve a score to its (level, level_name). Scores outside the table
/// fall back to level 1.
pub fn level_for_score(score: i64) -> (i64, &'static str) {
    SCORE_LEVELS
        .iter()
        .find(|(min, max, _, _)| score >= *min && score <= *max)
        .or(SCORE_LEVELS.first())
        .map(|(_, _, level, name)| (*level, *name))
        .expect("level table is non-empty")
}

/// Gamification starting values for a fresh account, named so they can be
/// tested independently of the create path.
#[derive(Debug, Clone)]
pub struct SignupDefaults {
    pub score: i64,
    pub streak: i64,
}

impl Default for SignupDefaults {
    fn default() -> Self {
        Self { score: 51, streak: 0 }
    }
}

/// One user row as stored, password hash included. Never leaves the
/// persistence boundary except through the raw login-flow accessor.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: String,
    pub cover_photo_url: String,
    /// JSON array of strings, parsed on sanitization
    pub interests: String,
    pub score: i64,
    pub streak: i64,
    pub is_online: bool,
    pub location: String,
    pub occupation: String,
    /// JSON array of strings, parsed on sanitization
    pub financial_goals: String,
    pub joined_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, name: String, defaults: &SignupDefaults) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            display_name: name.clone(),
            name,
            bio: String::new(),
            avatar_url: String::new(),
            cover_photo_url: String::new(),
            interests: "[]".to_string(),
            score: defaults.score,
            streak: defaults.streak,
            is_online: false,
            location: String::new(),
            occupation: String::new(),
            financial_goals: "[]".to_string(),
            joined_date: now.date_naive(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The client-facing user record: the row minus the password hash, with the
/// JSON columns expanded and level fields derived from the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: String,
    pub cover_photo_url: String,
    pub interests: Vec<String>,
    pub level: i64,
    pub level_name: String,
    pub score: i64,
    pub streak: i64,
    pub is_online: bool,
    pub location: String,
    pub occupation: String,
    pub financial_goals: Vec<String>,
    pub joined_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Malformed stored JSON becomes an empty list rather than a failed read
fn parse_string_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        let (level, level_name) = level_for_score(user.score);
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            cover_photo_url: user.cover_photo_url,
            interests: parse_string_list(&user.interests),
            level,
            level_name: level_name.to_string(),
            score: user.score,
            streak: user.streak,
            is_online: user.is_online,
            location: user.location,
            occupation: user.occupation,
            financial_goals: parse_string_list(&user.financial_goals),
            joined_date: user.joined_date,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial profile update. Every field is named and optional; unset fields
/// keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub financial_goals: Option<Vec<String>>,
}
