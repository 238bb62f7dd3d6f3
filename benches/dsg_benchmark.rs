use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use socat_dsg::processors::{
    records_from_std_array, DataColumn, StandardUnitConverter, StdDataArray,
};
use socat_dsg::types::{standard, TypeRegistry};

// Create a raw upload table for benchmarking
fn create_test_table(rows: usize) -> (Vec<DataColumn>, Vec<Vec<String>>) {
    let columns = vec![
        DataColumn::new(standard::longitude()),
        DataColumn::new(standard::latitude()),
        DataColumn::new(standard::sst()),
        DataColumn::new(standard::salinity()),
        DataColumn::new(standard::region_id()),
    ];

    let mut table = Vec::with_capacity(rows);
    for row in 0..rows {
        let lon = -23.5 - (row as f64) * 0.001;
        let lat = 48.25 + (row as f64) * 0.001;
        let sst = 12.0 + (row as f64) * 0.0001;
        let sal = 35.0 - (row as f64) * 0.0001;
        table.push(vec![
            format!("{:.4}", lon),
            format!("{:.4}", lat),
            format!("{:.4}", sst),
            format!("{:.4}", sal),
            "N".to_string(),
        ]);
    }
    (columns, table)
}

fn benchmark_standardization(c: &mut Criterion) {
    let mut group = c.benchmark_group("standardization");
    for rows in [100, 1_000, 10_000] {
        let (columns, table) = create_test_table(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| {
                let array =
                    StdDataArray::from_table(columns.clone(), table, &StandardUnitConverter)
                        .unwrap();
                black_box(array)
            })
        });
    }
    group.finish();
}

fn benchmark_record_building(c: &mut Criterion) {
    let registry = TypeRegistry::for_data_files().unwrap();
    let (columns, table) = create_test_table(1_000);
    let array = StdDataArray::from_table(columns, &table, &StandardUnitConverter).unwrap();

    c.bench_function("records_from_std_array_1000", |b| {
        b.iter(|| {
            let records = records_from_std_array(&registry, &array).unwrap();
            black_box(records)
        })
    });
}

fn benchmark_registry_lookup(c: &mut Criterion) {
    let registry = TypeRegistry::for_data_files().unwrap();
    let names = ["Longitude", "LATITUDE", "xCO2_water_SST_dry", "temp", "sal"];

    c.bench_function("registry_lookup", |b| {
        b.iter(|| {
            for name in names {
                black_box(registry.lookup(black_box(name)));
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_standardization,
    benchmark_record_building,
    benchmark_registry_lookup
);
criterion_main!(benches);
