/*!
AS-name table extraction from the cidr-report `autnums.html` listing.
*/
use crate::error::IpasnError;
use crate::models::Asn;
use log::warn;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::Read;

pub const ASNAMES_URL: &str = "https://www.cidr-report.org/as2.0/autnums.html";

/// Extract `{asn: name}` from the autnums listing.
///
/// Entry lines look like `<a href="...">AS15169</a> GOOGLE, US`; the
/// registry also prints four-octet ASNs in ASDOT form, which parse the
/// same way. Non-entry lines and unparsable codes are skipped.
pub fn parse_autnums_html(html: &str) -> BTreeMap<Asn, String> {
    let entry_line = Regex::new(r"<a [^>]+>\s*AS(?<code>\S+?)\s*</a>\s*(?<name>.*)")
        .expect("static pattern compiles");

    let mut names = BTreeMap::new();
    for line in html.lines() {
        if !line.starts_with("<a") {
            continue;
        }
        let Some(captures) = entry_line.captures(line) else {
            continue;
        };
        let code = &captures["code"];
        let parsed = match code.parse::<u32>() {
            Ok(plain) => Some(Asn::new(plain)),
            Err(_) => Asn::from_asdot(&format!("AS{code}")).ok(),
        };
        match parsed {
            Some(asn) => {
                names.insert(asn, captures["name"].trim().to_string());
            }
            None => warn!("skipping autnums line with unparsable ASN 'AS{code}'"),
        }
    }
    names
}

/// Fetch the autnums listing from the cidr-report site.
pub fn fetch_autnums_html() -> Result<String, IpasnError> {
    let mut reader = oneio::get_reader(ASNAMES_URL)?;
    let mut html = String::new();
    reader.read_to_string(&mut html)?;
    Ok(html)
}

/// Serialize a name table to the JSON object consumed by
/// [crate::IpAsnDb::load_as_names].
pub fn names_to_json(names: &BTreeMap<Asn, String>) -> Result<String, IpasnError> {
    serde_json::to_string(names)
        .map_err(|e| IpasnError::ParseError(format!("cannot serialize AS names: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<html><head><title>autnums</title></head>
<pre>
<a href="/cgi-bin/as-report?as=AS1&view=2.0">AS1    </a> LVLT-1, US
<a href="/cgi-bin/as-report?as=AS15169&view=2.0">AS15169</a> GOOGLE, US
<a href="/cgi-bin/as-report?as=AS2.321&view=2.0">AS2.321</a> EXAMPLE-FOUR-OCTET
not an entry line
<a href="/cgi-bin/as-report?as=ASbroken&view=2.0">ASbroken</a> JUNK
</pre></html>"#;

    #[test]
    fn test_parse_sample() {
        let names = parse_autnums_html(SAMPLE);
        assert_eq!(3, names.len());
        assert_eq!("LVLT-1, US", names[&Asn::new(1)]);
        assert_eq!("GOOGLE, US", names[&Asn::new(15169)]);
        assert_eq!("EXAMPLE-FOUR-OCTET", names[&Asn::new(131393)]);
    }

    #[test]
    fn test_json_output_keys_are_decimal_strings() {
        let names = parse_autnums_html(SAMPLE);
        let json = names_to_json(&names).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!("GOOGLE, US", value["15169"]);
        assert_eq!("EXAMPLE-FOUR-OCTET", value["131393"]);
    }

    #[test]
    fn test_round_trip_through_db_loader() {
        use crate::db::IpAsnDb;
        let names = parse_autnums_html(SAMPLE);
        let json = names_to_json(&names).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asnames.json");
        std::fs::write(&path, json).unwrap();

        let mut db = IpAsnDb::from_text("8.8.8.0/24\t15169\n").unwrap();
        db.load_as_names(&path).unwrap();
        assert_eq!(Some("GOOGLE, US"), db.as_name(Asn::new(15169)).unwrap());
    }
}
