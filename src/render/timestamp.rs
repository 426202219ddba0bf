use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };

/// Random `HH:MM` on a 24-hour clock.
pub fn random_timestamp<R: Rng>(rng: &mut R) -> String {
    let hour: u32 = rng.random_range(0..24);
    let minute: u32 = rng.random_range(0..60);
    format!("{:02}:{:02}", hour, minute)
}

/// Source of the time shown above each conversation.
pub enum TimestampSource {
    Fixed(String),
    Random(StdRng),
}

impl TimestampSource {
    /// An explicit time wins; otherwise times are drawn from `seed`, or from
    /// OS entropy when there is no seed.
    pub fn new(fixed: Option<&str>, seed: Option<u64>) -> Result<Self, String> {
        if let Some(time) = fixed {
            let parsed = NaiveTime::parse_from_str(time.trim(), "%H:%M").map_err(|e|
                format!("Invalid timestamp '{}': {} (expected HH:MM)", time, e)
            )?;
            return Ok(TimestampSource::Fixed(parsed.format("%H:%M").to_string()));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(TimestampSource::Random(rng))
    }

    pub fn next_timestamp(&mut self) -> String {
        match self {
            TimestampSource::Fixed(time) => time.clone(),
            TimestampSource::Random(rng) => random_timestamp(rng),
        }
    }
}
