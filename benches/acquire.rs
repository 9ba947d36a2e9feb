use std::{convert::Infallible, fmt::Display, io, time::Duration};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::time::Instant;

//const ITERATIONS: usize = 1_048_576;
const ITERATIONS: usize = 1 << 15;

struct Conn(Instant);

impl genpool::Poolable for Conn {
    fn close(self) -> io::Result<()> {
        Ok(())
    }

    fn active_at(&self) -> Instant {
        self.0
    }
}

struct Factory;

#[async_trait::async_trait]
impl genpool::Factory for Factory {
    type Resource = Conn;
    type Error = Infallible;

    async fn create(&self) -> Result<Conn, Infallible> {
        Ok(Conn(Instant::now()))
    }
}

type Pool = genpool::Pool<Factory>;

#[derive(Copy, Clone, Debug)]
struct Config {
    pool_size: usize,
    workers: usize,
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "w{}s{}", self.workers, self.pool_size)
    }
}

impl Config {
    fn operations_per_worker(&self) -> usize {
        ITERATIONS / self.workers
    }

    async fn run(self, pool: Pool) {
        for _ in 0..self.operations_per_worker() {
            if let Ok(conn) = pool.acquire().await {
                let _ = pool.release(conn);
            }
        }
    }
}

#[rustfmt::skip]
const CONFIGS: &[Config] = &[
    // 8 workers
    Config { workers:  8, pool_size:  2 },
    Config { workers:  8, pool_size:  4 },
    Config { workers:  8, pool_size:  8 },
    // 16 workers
    Config { workers: 16, pool_size:  4 },
    Config { workers: 16, pool_size:  8 },
    Config { workers: 16, pool_size: 16 },
    // 32 workers
    Config { workers: 32, pool_size:  8 },
    Config { workers: 32, pool_size: 16 },
    Config { workers: 32, pool_size: 32 },
];

fn bench_acquire(cfg: Config) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let pool = runtime
        .block_on(Pool::new(0, cfg.pool_size, Duration::ZERO, Factory))
        .unwrap();

    std::thread::scope(|s| {
        for _ in 0..cfg.workers {
            s.spawn(|| {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap();

                runtime.block_on(cfg.run(pool.clone()));
            });
        }
    });
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquire");
    for &config in CONFIGS {
        group.bench_function(BenchmarkId::new("acquire_release", config), |b| {
            b.iter(|| bench_acquire(config))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
