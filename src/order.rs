use crate::error::CidrError;
use crate::ipv4::binary_representation;
use std::cmp::Ordering;

pub trait HasCidr {
    fn cidr(&self) -> &str;
}

impl HasCidr for str {
    fn cidr(&self) -> &str {
        self
    }
}

impl HasCidr for String {
    fn cidr(&self) -> &str {
        self.as_str()
    }
}

impl<T: HasCidr + ?Sized> HasCidr for &T {
    fn cidr(&self) -> &str {
        (**self).cidr()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Bit string read as a base-2 integer.
    #[default]
    Binary,
    /// Bit string read as a base-10 float. Addresses sharing their first 15 or
    /// so bits collapse to the same key.
    LegacyDecimal,
}

pub fn binary_key(cidr: &str) -> Result<u32, CidrError> {
    let bits = binary_representation(cidr)?;
    u32::from_str_radix(&bits, 2)
        .map_err(|e| CidrError::InvalidCidrFormat(format!("{}: {}", cidr, e)))
}

pub fn legacy_decimal_key(cidr: &str) -> Result<f64, CidrError> {
    let bits = binary_representation(cidr)?;
    bits.parse::<f64>()
        .map_err(|e| CidrError::InvalidCidrFormat(format!("{}: {}", cidr, e)))
}

// Records that do not parse sort after all valid ones and tie with each other.
fn compare_keys<K>(
    a: Result<K, CidrError>,
    b: Result<K, CidrError>,
    cmp: impl Fn(&K, &K) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Ok(x), Ok(y)) => cmp(&x, &y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

pub fn compare_by_binary<A, B>(a: &A, b: &B) -> Ordering
where
    A: HasCidr + ?Sized,
    B: HasCidr + ?Sized,
{
    compare_by_binary_with(SortKey::default(), a, b)
}

pub fn compare_by_binary_with<A, B>(key: SortKey, a: &A, b: &B) -> Ordering
where
    A: HasCidr + ?Sized,
    B: HasCidr + ?Sized,
{
    match key {
        SortKey::Binary => compare_keys(binary_key(a.cidr()), binary_key(b.cidr()), u32::cmp),
        SortKey::LegacyDecimal => compare_keys(
            legacy_decimal_key(a.cidr()),
            legacy_decimal_key(b.cidr()),
            f64::total_cmp,
        ),
    }
}

/// Stable in-place sort of `records` by binary value.
pub fn sort_by_binary<T: HasCidr>(records: &mut [T], key: SortKey) {
    log::debug!("sorting {} records by {:?} key", records.len(), key);
    records.sort_by(|a, b| compare_by_binary_with(key, a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use std::net::Ipv4Addr;

    struct Subnet {
        name: &'static str,
        cidr: String,
    }

    impl HasCidr for Subnet {
        fn cidr(&self) -> &str {
            &self.cidr
        }
    }

    fn subnet(name: &'static str, cidr: &str) -> Subnet {
        Subnet {
            name,
            cidr: cidr.to_string(),
        }
    }

    #[test]
    fn some_tests() {
        assert_eq!(binary_key("192.168.1.1").unwrap(), 0xC0A80101);
        assert_eq!(binary_key("11.1").unwrap(), 2817);
        assert_eq!(legacy_decimal_key("11.1").unwrap(), 101100000001.0);
        assert!(binary_key("300.1.1.1").is_err());
        assert!(legacy_decimal_key("a.b").is_err());

        assert_eq!(compare_by_binary("10.0.0.1", "10.0.0.2"), Ordering::Less);
        assert_eq!(compare_by_binary("10.0.0.0/8", "10.0.0.0/24"), Ordering::Equal);
        assert_eq!(compare_by_binary("11.0.0.0", "10.255.255.255"), Ordering::Greater);
    }

    #[test]
    fn legacy_key_loses_close_addresses() {
        for (a, b) in [
            ("192.168.1.1", "192.168.1.2"),
            ("10.0.0.1", "10.0.0.2"),
            ("255.255.255.254", "255.255.255.255"),
        ] {
            assert_eq!(compare_by_binary_with(SortKey::Binary, a, b), Ordering::Less);
            assert_eq!(
                compare_by_binary_with(SortKey::LegacyDecimal, a, b),
                Ordering::Equal
            );
        }
    }

    #[test]
    fn legacy_key_agrees_on_distant_addresses() {
        for key in [SortKey::Binary, SortKey::LegacyDecimal] {
            assert_eq!(
                compare_by_binary_with(key, "255.255.255.255", "1.0.0.0"),
                Ordering::Greater
            );
        }
    }

    #[test]
    fn invalid_records_sort_last() {
        let mut nets = vec!["x.y", "10.0.0.1", "1.2.3.400", "9.0.0.0"];
        sort_by_binary(&mut nets, SortKey::Binary);
        assert_eq!(nets, vec!["9.0.0.0", "10.0.0.1", "x.y", "1.2.3.400"]);
    }

    #[test]
    fn sort_is_stable_over_records() {
        let mut subnets = vec![
            subnet("b", "10.1.0.0/16"),
            subnet("a", "10.0.0.0/8"),
            subnet("c", "10.0.0.0/16"),
            subnet("d", "9.255.0.0/16"),
        ];
        sort_by_binary(&mut subnets, SortKey::Binary);
        let names: Vec<&str> = subnets.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["d", "a", "c", "b"]);
    }

    fn ip(v: u32) -> String {
        Ipv4Addr::from(v).to_string()
    }

    #[quickcheck]
    fn binary_order_matches_u32(a: u32, b: u32) -> bool {
        compare_by_binary(&ip(a), &ip(b)) == a.cmp(&b)
    }

    #[quickcheck]
    fn ordering_is_transitive(a: u32, b: u32, c: u32) -> bool {
        let (a, b, c) = (ip(a), ip(b), ip(c));
        let le = |x: &String, y: &String| compare_by_binary(x, y) != Ordering::Greater;
        !(le(&a, &b) && le(&b, &c)) || le(&a, &c)
    }

    #[quickcheck]
    fn legacy_never_inverts_binary(a: u32, b: u32) -> bool {
        let (a, b) = (ip(a), ip(b));
        match compare_by_binary_with(SortKey::LegacyDecimal, &a, &b) {
            Ordering::Equal => true,
            o => o == compare_by_binary(&a, &b),
        }
    }
}
