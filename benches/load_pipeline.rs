use std::fmt::Write as _;

use criterion::{Criterion, criterion_group, criterion_main};
use inventory_normalizer::{
    Field, Schema, aggregate::aggregate_by, filter::Criteria, filter::filter, load,
};

fn generate_sueltos(rows: usize) -> Vec<u8> {
    let mut payload = String::from("PRODUCTO,MARCA,CAJAS,UNID X CAJA,UNIDADES,UBICACION\n");
    for i in 0..rows {
        let brand = match i % 3 {
            0 => "Acme",
            1 => "Globex",
            _ => "Initech",
        };
        let loose = if i % 17 == 0 {
            "N/A".to_string()
        } else {
            (i % 11).to_string()
        };
        writeln!(
            payload,
            "Product {},{brand},{},{},{loose},Camara {}",
            i % 250,
            i % 40,
            (i % 12) + 1,
            i % 5
        )
        .expect("row");
    }
    payload.into_bytes()
}

fn bench_load(c: &mut Criterion) {
    let schema = Schema::preset("sueltos").expect("preset");
    let payload = generate_sueltos(20_000);
    c.bench_function("load_sueltos_20k", |b| {
        b.iter(|| load(&payload, &schema).expect("load"))
    });

    let records = load(&payload, &schema).expect("load");
    c.bench_function("filter_and_aggregate_20k", |b| {
        b.iter(|| {
            let filtered = filter(&records, &Criteria::new().with(Field::Brand, "Acme"));
            aggregate_by(&filtered, Field::Location, Field::TotalUnits).expect("aggregate")
        })
    });
}

criterion_group!(benches, bench_load);
criterion_main!(benches);
