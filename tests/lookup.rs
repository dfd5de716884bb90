//! End-to-end lookup behavior over loaded IPASN databases.

use ipasn::error::IpasnError;
use ipasn::models::Afi;
use ipasn::{Asn, IpAsnDb, RadixTree};
use ipnet::IpNet;
use std::str::FromStr;

const FAKE_DB: &str = "\
; IP-ASN32-DAT file
; Original source: fixture
; Converted on  : Fri May 23 06:00:00 2014
; Prefixes-v4   : 5
; Prefixes-v6   : 0
;
1.0.0.0/30\t1
1.0.0.0/24\t2
2.0.0.0/24\t3
3.0.0.0/8\t4
3.0.0.0/9\t5
";

const FAKE_DB6: &str = "\
2001:41d0::/32\t16276
2607:f8b0:4006::/48\t15169
2a02:2770::/32\t196752
";

fn lookup(db: &IpAsnDb, ip: &str) -> (Option<u32>, Option<String>) {
    match db.lookup(ip).unwrap() {
        Some(found) => (Some(found.asn.to_u32()), Some(found.prefix.to_string())),
        None => (None, None),
    }
}

#[test]
fn nested_prefixes_resolve_most_specific() {
    let db = IpAsnDb::from_text(FAKE_DB).unwrap();
    assert_eq!(
        (Some(1), Some("1.0.0.0/30".to_string())),
        lookup(&db, "1.0.0.3")
    );
    assert_eq!(
        (Some(2), Some("1.0.0.0/24".to_string())),
        lookup(&db, "1.0.0.4")
    );
    assert_eq!((None, None), lookup(&db, "5.0.0.0"));
}

#[test]
fn ipv6_lookup() {
    let db = IpAsnDb::from_text(FAKE_DB6).unwrap();
    assert_eq!(
        (Some(16276), Some("2001:41d0::/32".to_string())),
        lookup(&db, "2001:41d0:2:7a6::1")
    );
    assert_eq!(
        (Some(15169), Some("2607:f8b0:4006::/48".to_string())),
        lookup(&db, "2607:f8b0:4006:80f::200e")
    );
    assert_eq!((None, None), lookup(&db, "d::d"));
}

#[test]
fn malformed_literals_are_classified_by_family() {
    let db = IpAsnDb::from_text(FAKE_DB).unwrap();
    match db.lookup("8.8.8.800") {
        Err(IpasnError::MalformedAddress { family, .. }) => assert_eq!(Afi::Ipv4, family),
        other => panic!("expected v4 kind, got {other:?}"),
    }
    match db.lookup("2001:500g:88:200::8") {
        Err(IpasnError::MalformedAddress { family, .. }) => assert_eq!(Afi::Ipv6, family),
        other => panic!("expected v6 kind, got {other:?}"),
    }
    match db.lookup("") {
        Err(IpasnError::MalformedAddress { family, .. }) => assert_eq!(Afi::Ipv4, family),
        other => panic!("expected v4 kind, got {other:?}"),
    }
}

#[test]
fn v6_default_route_cannot_shadow_v4() {
    let db = IpAsnDb::from_text(FAKE_DB).unwrap();
    let before: Vec<(Option<u32>, Option<String>)> = ["1.0.0.1", "2.0.0.9", "9.9.9.9"]
        .iter()
        .map(|ip| lookup(&db, ip))
        .collect();

    let mut with_v6 = String::from(FAKE_DB);
    with_v6.push_str("::/0\t6939\n");
    let db = IpAsnDb::from_text(&with_v6).unwrap();
    let after: Vec<(Option<u32>, Option<String>)> = ["1.0.0.1", "2.0.0.9", "9.9.9.9"]
        .iter()
        .map(|ip| lookup(&db, ip))
        .collect();

    assert_eq!(before, after);
    assert_eq!(
        (Some(6939), Some("::/0".to_string())),
        lookup(&db, "2001:db8::1")
    );
}

#[test]
fn exact_match_recovers_every_loaded_prefix() {
    let db = IpAsnDb::from_text(FAKE_DB).unwrap();
    for prefix in db.prefixes().collect::<Vec<_>>() {
        let found = db.radix().search_exact(prefix).unwrap();
        assert_eq!(prefix, found.prefix);
    }
}

#[test]
fn any_two_nested_prefixes_split_the_address_space() {
    // For p1 ⊂ p2, search_best returns p1's AS inside p1 and p2's AS on
    // the rest of p2, across the whole host range.
    let db = IpAsnDb::from_text("10.0.0.0/14\t100\n10.1.0.0/16\t200\n").unwrap();
    let inner = IpNet::from_str("10.1.0.0/16").unwrap();
    for third in [0u8, 1, 77, 255] {
        for fourth in [0u8, 128] {
            for second in [0u8, 1, 2, 3] {
                let ip = format!("10.{second}.{third}.{fourth}");
                let addr: std::net::IpAddr = ip.parse().unwrap();
                let expected = if inner.contains(&addr) { 200 } else { 100 };
                assert_eq!(Some(expected), lookup(&db, &ip).0, "for {ip}");
            }
        }
    }
}

#[test]
fn dump_reload_preserves_entry_multiset() {
    use ipasn::models::OriginAs;
    use ipasn::parser::PrefixOriginMap;

    let db = IpAsnDb::from_text(FAKE_DB).unwrap();
    let mut map = PrefixOriginMap::new();
    for (prefix, asn) in db.entries() {
        map.insert(prefix, OriginAs::Single(asn));
    }
    let mut emitted = Vec::new();
    ipasn::dump_prefixes_to_writer(&mut emitted, &map, "round-trip", false).unwrap();
    let reloaded = IpAsnDb::from_text(&String::from_utf8(emitted).unwrap()).unwrap();

    let mut original = db.entries();
    let mut rebuilt = reloaded.entries();
    original.sort();
    rebuilt.sort();
    assert_eq!(original, rebuilt);
}

#[test]
fn persistence_round_trip_via_entries() {
    let db = IpAsnDb::from_text(FAKE_DB).unwrap();
    let restored = IpAsnDb::from_entries(db.entries());
    for ip in ["1.0.0.2", "1.0.0.100", "2.0.0.50", "3.10.0.0", "3.200.0.0", "5.0.0.0"] {
        assert_eq!(lookup(&db, ip), lookup(&restored, ip));
    }
}

#[test]
fn radix_accepts_direct_insertion_after_load() {
    // The restore path adds entries one at a time onto a fresh tree.
    let mut tree = RadixTree::new();
    for (prefix, asn) in [("8.8.8.0/24", 15169u32), ("8.8.0.0/16", 3356)] {
        tree.insert(IpNet::from_str(prefix).unwrap(), Asn::new(asn));
    }
    let found = tree.search_best("8.8.8.8".parse().unwrap()).unwrap();
    assert_eq!(Asn::new(15169), found.asn);
    let found = tree.search_best("8.8.4.4".parse().unwrap()).unwrap();
    assert_eq!(Asn::new(3356), found.asn);
}

#[test]
fn gzip_database_file_loads() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ipasn_20140513.dat.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(FAKE_DB.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let db = IpAsnDb::from_file(&path).unwrap();
    assert_eq!(5, db.record_count());
    assert_eq!(
        (Some(2), Some("1.0.0.0/24".to_string())),
        lookup(&db, "1.0.0.200")
    );
}

#[test]
fn concurrent_readers_share_the_db() {
    let db = IpAsnDb::from_text(FAKE_DB).unwrap();
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(Some(1), db.lookup_asn("1.0.0.1").unwrap().map(|asn| asn.to_u32()));
                    assert_eq!(None, db.lookup_asn("5.0.0.0").unwrap());
                }
            });
        }
    });
}
