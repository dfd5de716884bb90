use crate::models::Asn;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// The origin of an advertised prefix.
///
/// Usually a single AS; routes formed by aggregation instead carry an
/// AS_SET whose surviving members are all plausible origins. The set is
/// non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginAs {
    Single(Asn),
    Set(Vec<Asn>),
}

impl OriginAs {
    /// One ASN standing in for the origin: the scalar itself, or the
    /// smallest member of a set. Deterministic for a given input.
    pub fn representative(&self) -> Asn {
        match self {
            OriginAs::Single(asn) => *asn,
            OriginAs::Set(asns) => *asns
                .iter()
                .min()
                .expect("origin sets are non-empty by construction"),
        }
    }

    pub fn contains(&self, asn: Asn) -> bool {
        match self {
            OriginAs::Single(a) => *a == asn,
            OriginAs::Set(asns) => asns.contains(&asn),
        }
    }
}

impl From<Asn> for OriginAs {
    fn from(asn: Asn) -> Self {
        OriginAs::Single(asn)
    }
}

impl Display for OriginAs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginAs::Single(asn) => write!(f, "{asn}"),
            OriginAs::Set(asns) => {
                write!(f, "{{{}}}", asns.iter().sorted_unstable().join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representative() {
        assert_eq!(Asn::new(15169), OriginAs::Single(Asn::new(15169)).representative());
        let set = OriginAs::Set(vec![Asn::new(50923), Asn::new(31200)]);
        assert_eq!(Asn::new(31200), set.representative());
    }

    #[test]
    fn test_display() {
        assert_eq!("15169", OriginAs::Single(Asn::new(15169)).to_string());
        let set = OriginAs::Set(vec![Asn::new(38266)]);
        assert_eq!("{38266}", set.to_string());
        let set = OriginAs::Set(vec![Asn::new(3), Asn::new(1), Asn::new(2)]);
        assert_eq!("{1,2,3}", set.to_string());
    }
}
