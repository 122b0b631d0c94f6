use chrono::{DateTime, Utc};
use rand::Rng;

pub const PREFIX: &str = "INV";
pub const SUFFIX_LEN: usize = 9;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `INV-YYYYMMDD-XXXXXXXXX`, the suffix drawn from uppercase base 36.
pub fn generate<R: Rng + ?Sized>(at: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", PREFIX, at.format("%Y%m%d"), suffix)
}

pub fn next_number() -> String {
    generate(Utc::now(), &mut rand::thread_rng())
}

pub fn is_valid(number: &str) -> bool {
    let mut parts = number.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    prefix == PREFIX
        && date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn embeds_issue_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let n = generate(at, &mut StdRng::seed_from_u64(7));
        assert!(n.starts_with("INV-20240307-"));
        assert_eq!(n.len(), "INV-20240307-".len() + SUFFIX_LEN);
        assert!(is_valid(&n));
    }

    #[test]
    fn seeded_rng_is_repeatable() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = generate(at, &mut StdRng::seed_from_u64(42));
        let b = generate(at, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_ne!(next_number(), next_number());
    }

    #[test]
    fn rejects_malformed() {
        assert!(!is_valid("INV-2024030-ABCDEFGHI"));
        assert!(!is_valid("INV-20240307-abcdefghi"));
        assert!(!is_valid("BILL-20240307-ABCDEFGHI"));
        assert!(!is_valid("INV-20240307-ABCDEFGHI-X"));
    }
}
