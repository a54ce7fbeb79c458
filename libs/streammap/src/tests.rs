use super::*;

use crate::parse::Parser;
use crate::resolve::{AliasResolver, LayerNameResolver, LppResolver, NameResolver, Policy};
use crate::write::write_layer_map;

pub const STREAM_MAP: &str = r#"
# layer purpose stream# dataType
M1 drawing 99 0 0.0 # M1
M1 net 99 23 0.0 # M1_NET
M1 net2 99 23 0.0 # M1_NET
1Layer drawing 123 99 0.0 # 1Layer
"#;

#[test]
fn alias_resolver_prefers_alias() {
    let r = AliasResolver;
    assert_eq!(r.resolve(Some("M1_NET"), "M1", "net"), "M1_NET");
    assert_eq!(r.resolve(None, "M1", "drawing"), "M1");
    assert_eq!(r.resolve(Some(""), "M1", "drawing"), "M1");
}

#[test]
fn layer_name_resolver_ignores_alias() {
    let r = LayerNameResolver;
    assert_eq!(r.resolve(Some("M1_NET"), "M1", "net"), "M1");
}

#[test]
fn lpp_resolver_folds_purpose() {
    let r = LppResolver;
    assert_eq!(r.resolve(Some("M1_NET"), "M1", "net"), "M1.net");
}

#[test]
fn parse_policy_from_str() {
    assert_eq!("alias".parse::<Policy>().unwrap(), Policy::Alias);
    assert_eq!("Layer".parse::<Policy>().unwrap(), Policy::Layer);
    assert_eq!("lpp".parse::<Policy>().unwrap(), Policy::Lpp);
    assert!("dynamic".parse::<Policy>().is_err());
}

#[test]
fn parse_groups_by_alias() {
    let map = Parser::new(AliasResolver).parse_str(STREAM_MAP);
    assert_eq!(map.len(), 3);
    assert_eq!(
        map.keys().collect::<Vec<_>>(),
        vec!["M1", "M1_NET", "1Layer"]
    );

    let m1 = map.get("M1").unwrap();
    assert_eq!(m1.len(), 1);
    assert_eq!(m1[0].gds, GdsLayer(99, 0));
    assert_eq!(m1[0].purpose, "drawing");

    let m1_net = map.get("M1_NET").unwrap();
    assert_eq!(m1_net.len(), 2);
    assert_eq!(m1_net[0].gds, GdsLayer(99, 23));
    assert_eq!(m1_net[1].gds, GdsLayer(99, 23));
    assert_eq!(m1_net[0].purpose, "net");
    assert_eq!(m1_net[1].purpose, "net2");

    let digit = map.get("1Layer").unwrap();
    assert_eq!(digit.len(), 1);
    assert_eq!(digit[0].gds, GdsLayer(123, 99));
}

#[test]
fn parse_reader_matches_parse_str() {
    let parser = Parser::new(AliasResolver);
    let from_str = parser.parse_str(STREAM_MAP);
    let from_reader = parser.parse(STREAM_MAP.as_bytes()).unwrap();
    assert_eq!(from_str, from_reader);
}

#[test]
fn record_without_alias_groups_by_layer_name() {
    let map = Parser::new(AliasResolver).parse_str("M2 drawing 50 0\nM2 net 50 23 0.0 #\n");
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["M2"]);
    assert_eq!(map.get("M2").unwrap().len(), 2);
}

#[test]
fn malformed_lines_are_skipped() {
    let map = Parser::new(AliasResolver).parse_str(
        "M1 drawing 99 0\n\
         M2 drawing\n\
         M3 drawing ninetynine 0\n\
         M4 drawing -1 0\n\
         M5 drawing 5 0\n",
    );
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["M1", "M5"]);
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let map = Parser::new(AliasResolver).parse_str("# a comment\n\n   \n  # indented comment\n");
    assert!(map.is_empty());
}

#[test]
fn extra_fields_before_comment_are_ignored() {
    let map = Parser::new(AliasResolver).parse_str("M1 pin 99 5 0.0 0.0 j # M1_PIN extra");
    let group = map.get("M1_PIN").unwrap();
    assert_eq!(group[0].gds, GdsLayer(99, 5));
    assert_eq!(group[0].alias.as_deref(), Some("M1_PIN"));
}

#[test]
fn sorted_orders_by_first_record_gds_layer() {
    let map = Parser::new(AliasResolver).parse_str(
        "M3 drawing 101 0 # M3\n\
         M1 drawing 99 0 # M1\n\
         POLY drawing 15 0 # POLY\n\
         M1 net 99 23 # M1\n",
    );
    let sorted = map.sorted();
    let keys: Vec<_> = sorted.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["POLY", "M1", "M3"]);
}

#[test]
fn sorted_is_stable_for_equal_layers() {
    // Both groups sit on GDS layer 99; insertion order must be preserved.
    let map = Parser::new(AliasResolver).parse_str(
        "M1 net 99 23 # M1_NET\n\
         M1 drawing 99 0 # M1\n\
         PO drawing 15 0 # PO\n",
    );
    let keys: Vec<_> = map.sorted().iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["PO", "M1_NET", "M1"]);
}

#[test]
fn sorting_a_sorted_map_is_a_noop() {
    let map = Parser::new(AliasResolver).parse_str(STREAM_MAP);
    let once: Vec<_> = map.sorted().iter().map(|(k, _)| k.clone()).collect();
    let mut resorted = LayerMap::new();
    for (key, group) in map.sorted().iter() {
        for record in group.iter() {
            resorted.insert(key.clone(), record.clone());
        }
    }
    let twice: Vec<_> = resorted.sorted().iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(once, twice);
}

#[test]
fn write_layer_map_emits_one_line_per_record() {
    let map = Parser::new(AliasResolver).parse_str(STREAM_MAP);
    let mut buf: Vec<u8> = Vec::new();
    write_layer_map(&map.sorted(), &mut buf).unwrap();
    let s = String::from_utf8(buf).unwrap();
    assert_eq!(
        s,
        "M1 99 0\n\
         M1_NET 99 23\n\
         M1_NET 99 23\n\
         1Layer 123 99\n"
    );
}
