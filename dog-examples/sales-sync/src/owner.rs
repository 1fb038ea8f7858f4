//! Owner identifiers and the organized key layout.
//!
//! A file named `sr7_jan.csv` belongs to owner `sr7` and is organized under
//! `<prefix>sr7/sr7_jan.csv`. The owner is always derived from the key and
//! never stored on its own.

/// Separates the owner identifier from the rest of a key
pub const OWNER_DELIMITER: char = '_';

/// Owner identifier of a key: everything before the first delimiter, or the whole key
pub fn owner_of(key: &str) -> &str {
    key.split_once(OWNER_DELIMITER).map_or(key, |(owner, _)| owner)
}

/// Key a file or object ends up at once organized under `prefix`
pub fn organized_key(prefix: &str, key: &str) -> String {
    format!("{}{}/{}", prefix, owner_of(key), key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn owner_is_text_before_first_delimiter() {
        assert_eq!(owner_of("sr1_cust_01.csv"), "sr1");
        assert_eq!(owner_of("sr7_jan.csv"), "sr7");
    }

    #[test]
    fn key_without_delimiter_is_its_own_owner() {
        assert_eq!(owner_of("summary.csv"), "summary.csv");
    }

    #[test]
    fn organized_key_nests_under_owner() {
        assert_eq!(organized_key("dct-sales/", "sr7_jan.csv"), "dct-sales/sr7/sr7_jan.csv");
    }

    proptest! {
        #[test]
        fn keys_without_delimiter_own_themselves(key in "[a-zA-Z0-9./-]{1,40}") {
            prop_assert_eq!(owner_of(&key), key.as_str());
        }

        #[test]
        fn organized_key_keeps_original_key_as_leaf(
            owner in "[a-z0-9]{1,8}",
            rest in "[a-z0-9_.]{0,20}",
            prefix in "[a-z-]{1,12}/",
        ) {
            let key = format!("{}_{}", owner, rest);
            let organized = organized_key(&prefix, &key);
            prop_assert_eq!(organized, format!("{}{}/{}", prefix, owner, key));
        }
    }
}
