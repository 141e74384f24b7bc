use fleet_dashboard_model::Environment;

/// Length of the environment tag in a host name
const TAG_LEN: usize = 3;
/// Number of characters after the tag, the node number, e.g. `101` in `adsysprd101`
const SUFFIX_LEN: usize = 3;

/// Derive the environment of a host from its visible name.
///
/// Host names end in `<tag><nnn>` where the tag is one of `prd`, `stg`, `tst` or `dev`. Names that
/// are too short or carry any other tag are [Environment::Unknown].
pub fn classify(display_name: &str) -> Environment {
    let chars = display_name.chars().collect::<Vec<_>>();
    if chars.len() < TAG_LEN + SUFFIX_LEN {
        return Environment::Unknown;
    }

    let end = chars.len() - SUFFIX_LEN;
    let tag = chars[end - TAG_LEN..end].iter().collect::<String>();

    Environment::from_tag(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_at_fixed_offset() {
        assert_eq!(Environment::Production, classify("adsysprd101"));
        assert_eq!(Environment::Staging, classify("webrootsstg003"));
        assert_eq!(Environment::Testing, classify("tst001"));
        assert_eq!(Environment::Development, classify("dbdev042"));
    }

    #[test]
    fn unknown_tags() {
        assert_eq!(Environment::Unknown, classify("jumpbox"));
        assert_eq!(Environment::Unknown, classify("adsysqa0101"));
        // The tag has to sit right before the three character suffix
        assert_eq!(Environment::Unknown, classify("prd101x"));
    }

    #[test]
    fn short_names_are_unknown() {
        assert_eq!(Environment::Unknown, classify(""));
        assert_eq!(Environment::Unknown, classify("prd10"));
    }

    #[test]
    fn offsets_count_characters() {
        assert_eq!(Environment::Production, classify("sérvprd101"));
        assert_eq!(Environment::Unknown, classify("ééééé"));
    }
}
