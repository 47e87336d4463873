use barcode_contract::{
    DecodeRecord, DecodeResponse, ResultEntry, ScanConfiguration, SpecificConfig, SymbologyKind,
    aggregate,
};
use proptest::prelude::*;

fn decoder_kind() -> impl Strategy<Value = SymbologyKind> {
    let kinds: Vec<_> = SymbologyKind::ALL
        .into_iter()
        .filter(|k| k.is_decoder())
        .collect();
    proptest::sample::select(kinds)
}

fn any_kind() -> impl Strategy<Value = SymbologyKind> {
    proptest::sample::select(SymbologyKind::ALL.to_vec())
}

fn entry() -> impl Strategy<Value = ResultEntry> {
    (
        any_kind(),
        ".{0,24}",
        proptest::sample::select(vec!["", "ASCII", "UTF-8"]),
        proptest::collection::btree_map("x[A-Z][a-z]{0,6}", ".{0,8}", 0..3),
    )
        .prop_map(|(kind, text, charset, extra)| ResultEntry {
            barcode_type_name: kind.type_name().to_string(),
            textual_data: text,
            character_set: charset.to_string(),
            // x-prefixed keys never collide with reserved names
            extra,
        })
}

proptest! {
    #[test]
    fn roi_accepts_exactly_the_percent_range(
        left in -50.0f32..150.0,
        top in -50.0f32..150.0,
        width in -50.0f32..150.0,
        height in -50.0f32..150.0
    ) {
        let mut config = ScanConfiguration::new();
        let in_range = |v: f32| (0.0..=100.0).contains(&v);
        let expected = in_range(left) && in_range(top) && in_range(width) && in_range(height);
        let before = config.region_of_interest();
        let result = config.set_region_of_interest(left, top, width, height);
        prop_assert_eq!(result.is_ok(), expected);
        if !expected {
            prop_assert_eq!(config.region_of_interest(), before);
        }
    }

    #[test]
    fn length_range_for_every_decoder(kind in decoder_kind(), min in -5i32..80, max in -5i32..80) {
        let mut config = SpecificConfig::new(kind).unwrap();
        let before = config.clone();
        let valid = min >= 0 && max >= 0 && (min == 0 || max == 0 || min <= max);
        let result = config.set_length_range(min, max);
        prop_assert_eq!(result.is_ok(), valid);
        if valid {
            prop_assert_eq!(config.minimum_length(), min as u32);
            prop_assert_eq!(config.maximum_length(), max as u32);
        } else {
            prop_assert_eq!(config, before);
        }
    }

    #[test]
    fn aggregation_preserves_count_and_order(
        texts in proptest::collection::vec(("[ -~]{0,16}", any_kind()), 0..12)
    ) {
        let records: Vec<_> = texts
            .iter()
            .map(|(text, kind)| DecodeRecord::new(*kind, text.as_str()))
            .collect();
        let response = aggregate(records).unwrap();
        prop_assert_eq!(response.results_count(), texts.len());
        for (entry, (text, kind)) in response.entries().iter().zip(&texts) {
            prop_assert_eq!(&entry.textual_data, text);
            prop_assert_eq!(entry.barcode_type_name.as_str(), kind.type_name());
        }
        match response.results_count() {
            0 => prop_assert_eq!(&response, &DecodeResponse::Empty),
            1 => prop_assert!(matches!(response, DecodeResponse::Single(_))),
            _ => prop_assert!(matches!(response, DecodeResponse::Multiple(_))),
        }
    }

    #[test]
    fn wire_text_round_trips(entries in proptest::collection::vec(entry(), 0..6)) {
        let response = DecodeResponse::from_entries(entries);
        let json = response.to_json().unwrap();
        prop_assert_eq!(DecodeResponse::from_json(&json).unwrap(), response);
    }

    #[test]
    fn enabled_set_matches_stored_flags(ids in proptest::collection::vec(0i32..40, 0..10)) {
        let mut config = ScanConfiguration::new();
        config.set_enabled_decoders(&ids).unwrap();
        for kind in SymbologyKind::ALL {
            let stored = config.get_specific_config(kind);
            prop_assert_eq!(stored.enabled(), config.is_enabled(kind));
        }
        prop_assert!(config.validate().is_ok());
    }
}
