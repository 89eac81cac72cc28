use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use webcache::cookies::canonicalcookie::CanonicalCookie;
use webcache::cookies::datastore::MemoryDataStore;
use webcache::cookies::domain;
use webcache::cookies::staging::{MemoryStagingStore, StagingStore};
use webcache::manager::WebCacheManager;
use webcache::policy::PreserveLogins;

fn benchmark_domain_match(c: &mut Criterion) {
    let domains: Vec<String> = (0..50).map(|i| format!("site{}.example.com", i)).collect();

    c.bench_function("domain_first_match", |b| {
        b.iter(|| {
            black_box(domain::first_match(black_box(".example.com"), &domains));
            black_box(domain::first_match(black_box("unrelated.org"), &domains));
        })
    });
}

fn benchmark_clear(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let manager = WebCacheManager::new();
    let logins = PreserveLogins::from_domains((0..20).map(|i| format!("login{}.com", i)));

    c.bench_function("fire_button_clear_1000", |b| {
        b.to_async(&runtime).iter(|| async {
            let data_store = MemoryDataStore::new();
            let jar = data_store.cookie_jar().unwrap();
            for i in 0..1000 {
                let domain = if i % 10 == 0 {
                    format!("login{}.com", i % 20)
                } else {
                    format!("tracker{}.com", i)
                };
                jar.set_canonical_cookie(CanonicalCookie::session("c", "v", &domain));
            }
            let staging = Arc::new(MemoryStagingStore::new());
            manager.clear(&data_store, staging.clone(), &logins).await;
            black_box(staging.cookies().len());
        })
    });
}

criterion_group!(benches, benchmark_domain_match, benchmark_clear);
criterion_main!(benches);
