// ww3nml/src/fingerprint.rs

use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

/// Deterministic hex fingerprint of any hashable value.
///
/// Seeded XxHash64, so the same rendered text gives the same fingerprint
/// across runs and machines.
pub fn fingerprint<T: Hash + ?Sized>(data: &T) -> String {
    let mut hasher = XxHash64::with_seed(0);
    data.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Fingerprint of a set of parts, independent of their order.
pub fn combined_fingerprint<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parts: Vec<String> = parts
        .into_iter()
        .map(|part| fingerprint(part.as_ref()))
        .collect();
    parts.sort();
    fingerprint(&parts.join("-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint("&DOMAIN_NML\n/\n"), fingerprint("&DOMAIN_NML\n/\n"));
        assert_ne!(fingerprint("a"), fingerprint("b"));
    }

    #[test]
    fn test_fingerprint_is_fixed_width_hex() {
        let fp = fingerprint("x");
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_combined_ignores_order() {
        assert_eq!(
            combined_fingerprint(["a", "b", "c"]),
            combined_fingerprint(["c", "a", "b"])
        );
        assert_ne!(combined_fingerprint(["a"]), combined_fingerprint(["a", "b"]));
    }
}
