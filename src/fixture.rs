//! Seeded random input generation.
//!
//! Every generator takes an explicit seed and uses `ChaCha8Rng`, so the same
//! seed always reproduces the same strings.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_LENGTH: usize = 1_000_000;

const ASCII_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Non-empty set of characters, de-duplicated, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// `a-z` followed by `A-Z`.
    pub fn ascii_letters() -> Alphabet {
        Alphabet { chars: ASCII_LETTERS.chars().collect() }
    }

    pub fn ascii_lowercase() -> Alphabet {
        Alphabet { chars: ASCII_LETTERS.chars().take(26).collect() }
    }

    pub fn from_chars(s: &str) -> Result<Alphabet, ConfigError> {
        let mut chars: Vec<char> = Vec::new();
        for c in s.chars() {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }
        if chars.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        Ok(Alphabet { chars })
    }

    /// The first `n` of [`Alphabet::ascii_letters`], clamped to `1..=52`.
    pub fn first_n(n: usize) -> Alphabet {
        let n = n.clamp(1, ASCII_LETTERS.len());
        Alphabet { chars: ASCII_LETTERS.chars().take(n).collect() }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    fn pick(&self, rng: &mut impl Rng) -> char {
        self.chars[rng.gen_range(0..self.chars.len())]
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::ascii_letters()
    }
}

impl TryFrom<String> for Alphabet {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Alphabet::from_chars(&s)
    }
}

impl From<Alphabet> for String {
    fn from(a: Alphabet) -> String {
        a.chars.into_iter().collect()
    }
}

/// Description of the input a comparison run is measured on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub length: usize,
    pub alphabet: Alphabet,
    /// `None` draws a fresh seed from the OS; the chosen seed is reported.
    pub seed: Option<u64>,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            length: DEFAULT_LENGTH,
            alphabet: Alphabet::default(),
            seed: None,
        }
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length == 0 {
            return Err(ConfigError::ZeroLength);
        }
        if self.alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        Ok(())
    }

    /// Parse a JSON config; missing fields fall back to the defaults.
    pub fn from_json(text: &str) -> Result<InputConfig, ConfigError> {
        let cfg: InputConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// The seed to generate with: the configured one, or a fresh random one.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// Generate `length` chars drawn uniformly from `alphabet` with `seed`.
pub fn generate(seed: u64, length: usize, alphabet: &Alphabet) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut s = String::with_capacity(length);
    for _ in 0..length {
        s.push(alphabet.pick(&mut rng));
    }
    s
}

/// Generate the input described by `cfg`, returning it with the seed used.
pub fn generate_input(cfg: &InputConfig) -> (String, u64) {
    let seed = cfg.resolve_seed();
    tracing::debug!(seed, length = cfg.length, alphabet = cfg.alphabet.len(), "generating input");
    (generate(seed, cfg.length, &cfg.alphabet), seed)
}

/// Seeded corpus of `count` strings with lengths in `0..=max_len` and alphabet
/// sizes in `1..=52`. Roughly one case in eight uses a single-char alphabet.
pub fn random_cases(seed: u64, count: usize, max_len: usize) -> Vec<(Alphabet, String)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cases = Vec::with_capacity(count);
    for _ in 0..count {
        let size = if rng.gen_bool(0.125) { 1 } else { rng.gen_range(1..=ASCII_LETTERS.len()) };
        let alphabet = Alphabet::first_n(size);
        let len = rng.gen_range(0..=max_len);
        let s: String = (0..len).map(|_| alphabet.pick(&mut rng)).collect();
        cases.push((alphabet, s));
    }
    cases
}
