use barcode_contract::{ScanConfiguration, SpecificConfigPatch, SymbologyKind};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn all_decoders() -> Vec<SymbologyKind> {
    SymbologyKind::ALL
        .into_iter()
        .filter(|k| k.is_decoder())
        .collect()
}

fn bench_enable_all(c: &mut Criterion) {
    let kinds = all_decoders();
    c.bench_function("enable_all_decoders", |b| {
        b.iter(|| {
            let mut config = ScanConfiguration::new();
            config.set_enabled_symbologies(black_box(&kinds)).unwrap();
            config
        })
    });
}

fn bench_patch(c: &mut Criterion) {
    let mut config = ScanConfiguration::new();
    config.set_enabled_symbologies(&all_decoders()).unwrap();
    let patch =
        SpecificConfigPatch::from_json(r#"{"minimumLength":4,"maximumLength":32,"checksumType":"Mod1010"}"#)
            .unwrap();
    c.bench_function("update_specific_config_msi", |b| {
        b.iter(|| config.update_specific_config(SymbologyKind::Msi, black_box(&patch)))
    });
}

fn bench_persist(c: &mut Criterion) {
    let mut config = ScanConfiguration::new();
    config.set_enabled_symbologies(&all_decoders()).unwrap();
    let json = config.to_json().unwrap();

    c.bench_function("configuration_to_json", |b| {
        b.iter(|| black_box(&config).to_json())
    });
    c.bench_function("configuration_from_json", |b| {
        b.iter(|| ScanConfiguration::from_json(black_box(&json)))
    });
}

criterion_group!(benches, bench_enable_all, bench_patch, bench_persist);
criterion_main!(benches);
