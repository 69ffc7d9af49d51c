//! Bounded queue throughput and latency benchmark.
//!
//! Usage:
//!     cargo run --release --bin queue_bench
//!
//! Environment variables:
//!     PRODUCERS=1        Producer threads for the throughput run (default: 1)
//!     CONSUMERS=1        Consumer threads for the throughput run (default: 1)
//!     QUEUE_CAPACITY=1024
//!     PRODUCER_CPU=0     Pin producer to CPU 0 (default: 0)
//!     CONSUMER_CPU=2     Pin consumer to CPU 2 (default: 2)
//!
//! Only the first producer and consumer are pinned; extra threads float.

use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use boundq::{ConfigError, IntQueue};

const ITERATIONS: u64 = 1 << 22;
const RTT_ITERATIONS: u64 = 1 << 16;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Clamps the producer count so every producer sends at least one element,
/// returning `(producers, per_producer)`.
fn split_work(producers: u64) -> (u64, u64) {
    let producers = producers.clamp(1, ITERATIONS);
    (producers, ITERATIONS / producers)
}

fn get_cpu_affinity() -> (Option<usize>, Option<usize>) {
    let producer_cpu = env::var("PRODUCER_CPU")
        .ok()
        .and_then(|s| s.parse().ok())
        .or(Some(0));
    let consumer_cpu = env::var("CONSUMER_CPU")
        .ok()
        .and_then(|s| s.parse().ok())
        .or(Some(2));
    (producer_cpu, consumer_cpu)
}

fn pin_to_cpu(cpu: Option<usize>) {
    if let Some(id) = cpu {
        core_affinity::set_for_current(core_affinity::CoreId { id });
    }
}

fn bench_throughput(
    capacity: usize,
    producers: u64,
    consumers: u64,
    producer_cpu: Option<usize>,
    consumer_cpu: Option<usize>,
) -> Result<(), ConfigError> {
    let queue = Arc::new(IntQueue::new(capacity)?);
    let (producers, per_producer) = split_work(producers);
    let total = per_producer * producers;
    let remaining = Arc::new(AtomicU64::new(total));
    let checksum = Arc::new(AtomicU64::new(0));
    let start_line = Arc::new(Barrier::new((producers + consumers + 1) as usize));

    let mut handles = Vec::new();

    for c in 0..consumers {
        let queue = Arc::clone(&queue);
        let remaining = Arc::clone(&remaining);
        let checksum = Arc::clone(&checksum);
        let start_line = Arc::clone(&start_line);
        handles.push(thread::spawn(move || {
            if c == 0 {
                pin_to_cpu(consumer_cpu);
            }
            start_line.wait();

            let mut local = 0u64;
            // Claim a unit of work before blocking so no consumer waits for
            // an element that will never be produced.
            while remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok()
            {
                local = local.wrapping_add(queue.dequeue() as u64);
            }
            checksum.fetch_add(local, Ordering::Relaxed);
        }));
    }

    for p in 0..producers {
        let queue = Arc::clone(&queue);
        let start_line = Arc::clone(&start_line);
        handles.push(thread::spawn(move || {
            if p == 0 {
                pin_to_cpu(producer_cpu);
            }
            start_line.wait();

            let base = p * per_producer;
            for i in 0..per_producer {
                queue.enqueue((base + i) as i64);
            }
        }));
    }

    start_line.wait();
    let start = Instant::now();

    for handle in handles {
        handle.join().expect("benchmark thread panicked");
    }

    let elapsed = start.elapsed();

    let expected = total * (total - 1) / 2;
    let got = checksum.load(Ordering::Relaxed);
    if got != expected {
        panic!("Data corruption: checksum expected {}, got {}", expected, got);
    }

    let ops_per_ms = total as u128 * 1_000_000 / elapsed.as_nanos().max(1);
    println!(
        "{}p/{}c: {} ops/ms ({})",
        producers,
        consumers,
        ops_per_ms,
        queue
    );
    Ok(())
}

fn bench_rtt(
    capacity: usize,
    producer_cpu: Option<usize>,
    consumer_cpu: Option<usize>,
) -> Result<(), ConfigError> {
    let ping = Arc::new(IntQueue::new(capacity)?);
    let pong = Arc::new(IntQueue::new(capacity)?);
    let start_line = Arc::new(Barrier::new(2));

    // Responder thread
    let responder = {
        let ping = Arc::clone(&ping);
        let pong = Arc::clone(&pong);
        let start_line = Arc::clone(&start_line);
        thread::spawn(move || {
            pin_to_cpu(consumer_cpu);
            start_line.wait();

            for _ in 0..RTT_ITERATIONS {
                pong.enqueue(ping.dequeue());
            }
        })
    };

    pin_to_cpu(producer_cpu);
    start_line.wait();

    let start = Instant::now();

    for i in 0..RTT_ITERATIONS as i64 {
        ping.enqueue(i);
        let value = pong.dequeue();
        if value != i {
            panic!("Data corruption: expected {}, got {}", i, value);
        }
    }

    let elapsed = start.elapsed();
    responder.join().expect("responder thread panicked");

    let rtt_ns = elapsed.as_nanos() / RTT_ITERATIONS as u128;
    println!("{} ns RTT", rtt_ns);
    Ok(())
}

fn main() {
    boundq::init_tracing();

    let capacity: usize = env_or("QUEUE_CAPACITY", 1024);
    let producers: u64 = env_or("PRODUCERS", 1);
    let consumers: u64 = env_or("CONSUMERS", 1).max(1);
    let (producer_cpu, consumer_cpu) = get_cpu_affinity();

    println!("boundq (capacity={}, iters={}):", capacity, ITERATIONS);

    let result = bench_throughput(capacity, producers, consumers, producer_cpu, consumer_cpu)
        .and_then(|()| bench_rtt(capacity, producer_cpu, consumer_cpu));

    if let Err(e) = result {
        eprintln!("queue_bench: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_work_never_empty() {
        assert_eq!(split_work(0), (1, ITERATIONS));
        assert_eq!(split_work(4), (4, ITERATIONS / 4));
        assert_eq!(split_work(ITERATIONS + 1), (ITERATIONS, 1));
        assert_eq!(split_work(u64::MAX), (ITERATIONS, 1));
    }
}
