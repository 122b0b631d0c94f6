use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::domain::{LoginContext, LoginInput, RegisterInput};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::payments::fees;

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo, AuthConfig::with_secret("bench-secret"));

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(svc.register(RegisterInput {
        name: "Bench".into(),
        email: "bench@example.com".into(),
        password: "Benchmark1".into(),
        role: None,
        business_name: None,
        business_category: None,
        phone: None,
    }))
    .unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let session = rt
                .block_on(svc.login(
                    LoginInput { email: "bench@example.com".into(), password: "Benchmark1".into() },
                    LoginContext::default(),
                ))
                .unwrap();
            svc.verify_token(&session.token).unwrap();
        });
    });
}

fn bench_fee_split(c: &mut Criterion) {
    c.bench_function("fee_split", |b| {
        b.iter(|| {
            let mut acc = 0i64;
            for amount in (0..10_000).step_by(7) {
                acc += fees::split(criterion::black_box(amount), 1000).platform_fee_cents;
            }
            acc
        });
    });
}

criterion_group!(benches, bench_login, bench_fee_split);
criterion_main!(benches);
