//! Password strength rules applied at signup.

pub const MIN_LENGTH: usize = 8;
/// Longer input is refused before any comparison or hashing.
pub const MAX_LENGTH: usize = 4096;
const MAX_SIMILARITY: f64 = 0.7;

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "123456789", "12345678", "password", "qwerty", "qwerty123", "1234567890",
    "111111", "1234567", "password1", "password123", "abc123", "iloveyou", "letmein",
    "welcome", "welcome1", "admin", "admin123", "monkey", "dragon", "football", "baseball",
    "sunshine", "princess", "superman", "batman", "trustno1", "master", "shadow", "michael",
    "charlie", "jennifer", "hunter2", "whatever", "freedom", "starwars", "computer",
    "qwertyuiop", "asdfghjkl", "zxcvbnm", "1q2w3e4r", "1qaz2wsx", "passw0rd", "p@ssw0rd",
    "changeme", "secret", "access", "login", "hello123", "loveyou", "liverpool", "arsenal",
    "chelsea", "manchester", "teacher", "teacher1", "student", "school", "tutoring",
    "london", "england", "summer", "autumn", "winter", "spring", "flower", "cookie",
    "chocolate", "pokemon", "minecraft", "internet", "samsung", "google", "mustang",
    "harley", "jordan23", "killer", "soccer", "hockey", "ranger", "buster", "thomas",
    "robert", "daniel", "andrew", "joshua", "matthew", "jessica", "ashley", "amanda",
    "nicole", "letmein1", "trustme", "default", "guest", "test1234", "testing",
    "00000000", "11111111", "12341234", "87654321", "abcd1234", "aa123456", "q1w2e3r4",
];

/// The user attributes a password is compared against.
pub struct UserAttributes<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Returns every rule the password breaks, in a stable order.
pub fn password_problems(password: &str, user: &UserAttributes<'_>) -> Vec<String> {
    let mut problems = Vec::new();

    let length = password.chars().count();
    if length > MAX_LENGTH {
        problems.push(format!(
            "Ensure this value has at most {} characters (it has {}).",
            MAX_LENGTH, length
        ));
        return problems;
    }

    if length < MIN_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_LENGTH
        ));
    }

    if let Some(label) = similar_attribute(password, user) {
        problems.push(format!("The password is too similar to the {}.", label));
    }

    let lowered = password.trim().to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}

fn similar_attribute(password: &str, user: &UserAttributes<'_>) -> Option<&'static str> {
    let password = password.to_lowercase();
    let attributes = [
        ("email address", user.email),
        ("first name", user.first_name),
        ("last name", user.last_name),
    ];

    attributes.into_iter().find_map(|(label, value)| {
        let value = value.to_lowercase();
        if value.is_empty() {
            return None;
        }
        let mut candidates = vec![value.as_str()];
        candidates.extend(
            value
                .split(|c: char| !c.is_alphanumeric())
                .filter(|part| !part.is_empty()),
        );
        candidates
            .into_iter()
            .filter(|candidate| similarity_bound(&password, candidate) >= MAX_SIMILARITY)
            .any(|candidate| similarity(&password, candidate) >= MAX_SIMILARITY)
            .then_some(label)
    })
}

/// Upper bound of `similarity` from the lengths alone.
fn similarity_bound(a: &str, b: &str) -> f64 {
    let (a, b) = (a.chars().count(), b.chars().count());
    if a + b == 0 {
        return 1.0;
    }
    2.0 * a.min(b) as f64 / (a + b) as f64
}

/// Ratio in `0.0..=1.0` of shared characters, in order, between two strings.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let mut previous = vec![0usize; b.len() + 1];
    for ca in &a {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        previous = current;
    }

    2.0 * previous[b.len()] as f64 / (a.len() + b.len()) as f64
}
