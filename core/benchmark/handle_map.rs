use criterion::{black_box, criterion_group, criterion_main, Criterion};

use handle_map_core::HandleMap;

#[allow(clippy::many_single_char_names)]
pub fn handle_map(c: &mut Criterion) {
    c.bench_function("handle map insertion", |b| {
        b.iter(|| {
            let mut map = HandleMap::new(0, 0);
            let map = black_box(&mut map);
            map.insert(());
        })
    });
    c.bench_function("handle map re-insertion", |b| {
        let mut map = HandleMap::new(0, 0);
        b.iter(|| {
            let map = black_box(&mut map);
            let a = map.insert(());
            let b = map.insert(());
            let c = map.insert(());
            let d = map.insert(());
            let e = map.insert(());

            let (a, b, c, d, e) = black_box((a, b, c, d, e));

            map.erase(b);
            map.erase(d);
            map.erase(a);
            map.erase(c);
            map.erase(e);
        })
    });
    c.bench_function("handle map lookup", |b| {
        let mut map = HandleMap::new(0, 1000);
        let handles = (0..1000).map(|i| map.insert(i)).collect::<Vec<_>>();

        b.iter(|| handles.iter().map(|&handle| black_box(&map)[handle]).sum::<i32>())
    });
    c.bench_function("handle map iteration after removal", |b| {
        let mut map = HandleMap::new(0, 1000);
        let handles = (0..1000).map(|i| map.insert(i)).collect::<Vec<_>>();

        for i in (0..1000).filter(|&i| i % 2 == 0 || i % 11 == 0) {
            map.erase(handles[i]);
        }

        b.iter(|| black_box(&map).iter().sum::<i32>())
    });
    c.bench_function("handle map defragment", |b| {
        let mut map = HandleMap::new(0, 1000);
        let handles = (0..1000).map(|i| map.insert(i)).collect::<Vec<_>>();

        for i in (0..1000).filter(|&i| i % 3 == 0) {
            map.erase(handles[i]);
        }

        b.iter(|| {
            let mut map = map.clone();
            black_box(map.defragment(|a, b| a.cmp(b), 0))
        })
    });
}

criterion_group!(benches, handle_map);
criterion_main!(benches);
