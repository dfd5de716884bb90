/*!
`ipasn` answers one question offline: which autonomous system announced
the route covering this IP address, as of a given RIB snapshot?

Two halves make that work:

- **Conversion** decodes an MRT/RIB table dump (TABLE_DUMP and
  TABLE_DUMP_V2, RFC 6396), derives each prefix's originating AS from the
  first table entry's AS_PATH (RFC 4271), and writes a compact
  `prefix<TAB>asn` text table.
- **Lookup** ingests that table into a binary patricia trie and serves
  longest-prefix matches for v4 and v6 addresses.

# Examples

Converting a RIB archive (bzip2/gzip framing detected automatically):

```no_run
use ipasn::{dump_prefixes_to_file, parse_rib_dump, ConvertOptions, MrtDumpReader};

let reader = MrtDumpReader::open("rib.20140523.0600.bz2").unwrap();
let prefixes = parse_rib_dump(reader, &ConvertOptions::default()).unwrap();
dump_prefixes_to_file(&prefixes, "ipasn_20140523.dat", "rib.20140523.0600.bz2", false).unwrap();
```

Looking up addresses:

```no_run
use ipasn::IpAsnDb;

let db = IpAsnDb::from_file("ipasn_20140523.dat").unwrap();
match db.lookup("8.8.8.8").unwrap() {
    Some(found) => println!("AS{} via {}", found.asn, found.prefix),
    None => println!("not routed"),
}
```

Iterating raw records:

```no_run
use ipasn::MrtDumpReader;

let reader = MrtDumpReader::open("rib.20140523.0600.bz2").unwrap();
for record in reader.records() {
    println!("{}", record.unwrap());
}
```
*/

pub mod asnames;
pub mod db;
pub mod download;
pub mod dump;
pub mod error;
pub mod io;
pub mod models;
pub mod parser;
pub mod radix;

pub use crate::db::IpAsnDb;
pub use crate::dump::{dump_prefixes_to_file, dump_prefixes_to_writer, dump_screen};
pub use crate::error::IpasnError;
pub use crate::models::{Asn, BogusAsnPolicy, OriginAs};
pub use crate::parser::{parse_rib_dump, ConvertOptions, MrtDumpReader, ParseMode};
pub use crate::radix::{Found, RadixTree};
