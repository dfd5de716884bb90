/*!
The loaded IP-to-ASN database: text-table ingest, longest-prefix queries,
and the derived per-AS views.
*/
use crate::error::IpasnError;
use crate::io::open_archive;
use crate::models::{Afi, Asn};
use crate::radix::{Found, RadixTree};
use itertools::Itertools;
use ipnet::IpNet;
use log::warn;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

/// Parse an IP literal, classifying the failure by the family the string
/// is shaped like: anything with a colon is judged as v6, the rest as v4.
pub fn parse_ip_literal(input: &str) -> Result<IpAddr, IpasnError> {
    if input.contains(':') {
        Ipv6Addr::from_str(input)
            .map(IpAddr::V6)
            .map_err(|_| IpasnError::MalformedAddress {
                family: Afi::Ipv6,
                input: input.to_string(),
            })
    } else {
        Ipv4Addr::from_str(input)
            .map(IpAddr::V4)
            .map_err(|_| IpasnError::MalformedAddress {
                family: Afi::Ipv4,
                input: input.to_string(),
            })
    }
}

/// An IPASN database loaded into the radix tree, read-mostly after
/// construction. Queries borrow `&self` and are safe to issue from many
/// threads; the per-AS prefix index is built once on first use.
pub struct IpAsnDb {
    tree: RadixTree,
    records: usize,
    as_names: Option<HashMap<Asn, Option<String>>>,
    as_prefix_index: OnceLock<HashMap<Asn, Vec<IpNet>>>,
}

impl IpAsnDb {
    /// Load from a text table file, gzip- or bzip2-framed or plain.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IpasnError> {
        Self::from_reader(open_archive(path.as_ref())?)
    }

    /// Load from an in-memory text body.
    pub fn from_text(text: &str) -> Result<Self, IpasnError> {
        Self::from_reader(text.as_bytes())
    }

    /// Load `PREFIX/LEN<TAB>ASN` lines from a reader.
    ///
    /// Blank lines and `;`/`#` comments are skipped. A malformed line is
    /// diagnosed and skipped; the rest of the file still loads. A prefix
    /// repeated later in the file overwrites the earlier entry.
    pub fn from_reader(reader: impl Read) -> Result<Self, IpasnError> {
        let mut tree = RadixTree::new();
        let mut records = 0usize;

        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let entry = match (fields.next(), fields.next(), fields.next()) {
                (Some(prefix), Some(asn), None) => {
                    IpNet::from_str(prefix).ok().zip(asn.parse::<u32>().ok())
                }
                _ => None,
            };
            match entry {
                Some((prefix, asn)) => {
                    tree.insert(prefix, Asn::new(asn));
                    records += 1;
                }
                None => warn!("rejecting malformed IPASN line {}: '{line}'", index + 1),
            }
        }

        Ok(IpAsnDb {
            tree,
            records,
            as_names: None,
            as_prefix_index: OnceLock::new(),
        })
    }

    /// Rebuild a database from exported `(prefix, asn)` entries, the
    /// persistence round-trip counterpart of [IpAsnDb::entries].
    pub fn from_entries<I: IntoIterator<Item = (IpNet, Asn)>>(entries: I) -> Self {
        let tree = RadixTree::from_entries(entries);
        let records = tree.len();
        IpAsnDb {
            tree,
            records,
            as_names: None,
            as_prefix_index: OnceLock::new(),
        }
    }

    /// Number of entry lines applied during the load.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// The ASN holding this address and the most-specific prefix it was
    /// advertised under. `Ok(None)` means the address is not routed.
    pub fn lookup(&self, ip: &str) -> Result<Option<Found>, IpasnError> {
        let addr = parse_ip_literal(ip)?;
        Ok(self.tree.search_best(addr))
    }

    /// Like [IpAsnDb::lookup], returning only the ASN.
    pub fn lookup_asn(&self, ip: &str) -> Result<Option<Asn>, IpasnError> {
        Ok(self.lookup(ip)?.map(|found| found.asn))
    }

    /// Direct access to the underlying tree for add/search beyond the
    /// lookup API.
    pub fn radix(&self) -> &RadixTree {
        &self.tree
    }

    pub fn prefixes(&self) -> impl Iterator<Item = IpNet> + '_ {
        self.tree.prefixes()
    }

    /// Every origin AS present in the database, ascending.
    pub fn all_asns(&self) -> Vec<Asn> {
        self.as_prefix_index().keys().copied().sorted().collect()
    }

    /// Export the database as `(prefix, asn)` pairs.
    pub fn entries(&self) -> Vec<(IpNet, Asn)> {
        self.tree.entries()
    }

    /// The prefixes a given AS originates, ascending.
    ///
    /// The index is recovered with exact-match lookups, one per stored
    /// prefix. A best-match here would mis-attribute a covering prefix
    /// whenever a more-specific entry of another AS exists inside it.
    pub fn as_prefixes(&self, asn: Asn) -> &[IpNet] {
        self.as_prefix_index()
            .get(&asn)
            .map(|prefixes| prefixes.as_slice())
            .unwrap_or(&[])
    }

    fn as_prefix_index(&self) -> &HashMap<Asn, Vec<IpNet>> {
        self.as_prefix_index.get_or_init(|| {
            let mut index: HashMap<Asn, Vec<IpNet>> = HashMap::new();
            for prefix in self.tree.prefixes() {
                if let Some(found) = self.tree.search_exact(prefix) {
                    index.entry(found.asn).or_default().push(prefix);
                }
            }
            for prefixes in index.values_mut() {
                prefixes.sort();
            }
            index
        })
    }

    /// The AS's prefixes with overlapping and adjacent ranges collapsed,
    /// per family.
    pub fn as_prefixes_effective(&self, asn: Asn) -> Vec<IpNet> {
        IpNet::aggregate(&self.as_prefixes(asn).to_vec())
    }

    /// Total address count over the effective prefixes. A v6 holding can
    /// exceed 64 bits of addresses; a (nonsensical but representable)
    /// `::/0` saturates.
    pub fn as_size(&self, asn: Asn) -> u128 {
        self.as_prefixes_effective(asn)
            .iter()
            .map(|net| {
                let width: u8 = match net {
                    IpNet::V4(_) => 32,
                    IpNet::V6(_) => 128,
                };
                let host_bits = (width - net.prefix_len()) as u32;
                if host_bits >= 128 {
                    u128::MAX
                } else {
                    1u128 << host_bits
                }
            })
            .fold(0u128, u128::saturating_add)
    }

    /// Load the AS-names JSON table (`{"15169": "GOOGLE, US", ...}`),
    /// gzip-framed or plain. Returns the number of names loaded.
    pub fn load_as_names(&mut self, path: impl AsRef<Path>) -> Result<usize, IpasnError> {
        let reader = open_archive(path.as_ref())?;
        let raw: HashMap<String, Option<String>> = serde_json::from_reader(reader)
            .map_err(|e| IpasnError::ParseError(format!("invalid AS-names JSON: {e}")))?;

        let mut names: HashMap<Asn, Option<String>> = HashMap::with_capacity(raw.len());
        for (key, name) in raw {
            match key.parse::<u32>() {
                Ok(asn) => {
                    names.insert(Asn::new(asn), name);
                }
                Err(_) => warn!("ignoring AS-names entry with non-numeric key '{key}'"),
            }
        }
        let count = names.len();
        self.as_names = Some(names);
        Ok(count)
    }

    /// The registered name of an AS. `Ok(None)` for an unknown ASN or a
    /// null name; an error only when no names table was loaded at all.
    pub fn as_name(&self, asn: Asn) -> Result<Option<&str>, IpasnError> {
        let names = self.as_names.as_ref().ok_or(IpasnError::AsNamesNotLoaded)?;
        Ok(names.get(&asn).and_then(|name| name.as_deref()))
    }
}
