//! Queue contract tests.
//! Covers FIFO delivery, truncation, the capacity bound, the first-read
//! blocking behaviour, pool reuse under load, and property-based round trips.

#![cfg(not(loom))]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use byte_queue::{ByteQueue, ByteStream, FullPolicy, QueueConfig, QueueError};
use proptest::collection::vec;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn queue(buffer_size: usize, capacity: usize) -> ByteQueue {
    ByteQueue::with_buffer_size(buffer_size, Some(capacity)).expect("valid queue config")
}

fn prime(queue: &ByteQueue) {
    queue.write(&[]).expect("prime write");
    queue.read(&mut [0u8; 0]).expect("prime read");
}

fn read_vec(queue: &ByteQueue, max: usize) -> Result<Vec<u8>, QueueError> {
    let mut dest = vec![0u8; max];
    let n = queue.read(&mut dest)?;
    dest.truncate(n);
    Ok(dest)
}

#[test]
fn fifo_delivery_of_whole_chunks() {
    init_logging();
    let queue = queue(16, 32);
    let payloads: Vec<Vec<u8>> = (0..20u8).map(|i| vec![i; (i % 7) as usize + 1]).collect();
    for payload in &payloads {
        assert_eq!(queue.write(payload).unwrap(), payload.len());
    }
    for payload in &payloads {
        assert_eq!(&read_vec(&queue, 16).unwrap(), payload);
    }
    assert_eq!(read_vec(&queue, 16).unwrap_err(), QueueError::Empty);
}

#[test]
fn capacity_bound_then_recovery() {
    init_logging();
    const CAP: usize = 16;
    let queue = queue(8, CAP);
    for i in 0..CAP {
        queue.write(&[i as u8]).unwrap();
    }
    let err = queue.write(b"lost").unwrap_err();
    assert_eq!(err, QueueError::Full { written: 4 });
    assert_eq!(queue.len(), CAP);

    // Nothing from the rejected write is retained.
    let drained: Vec<_> = (0..CAP).map(|_| read_vec(&queue, 8).unwrap()).collect();
    assert!(drained.iter().all(|chunk| chunk.len() == 1));
    assert_eq!(read_vec(&queue, 8).unwrap_err(), QueueError::Empty);

    // The queue is usable again after both error kinds.
    queue.write(b"back").unwrap();
    assert_eq!(read_vec(&queue, 8).unwrap(), b"back");
}

#[test]
fn only_the_gate_winner_blocks() {
    init_logging();
    const READERS: usize = 6;
    let queue = Arc::new(queue(32, 8));
    let barrier = Arc::new(Barrier::new(READERS));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                read_vec(&queue, 32)
            })
        })
        .collect();

    // Every loser returns Empty on its own; only the winner stays parked.
    let deadline = Instant::now() + Duration::from_secs(5);
    while readers.iter().filter(|r| r.is_finished()).count() < READERS - 1 {
        assert!(Instant::now() < deadline, "losing readers must not block");
        thread::sleep(Duration::from_millis(1));
    }
    thread::sleep(Duration::from_millis(20));
    assert_eq!(readers.iter().filter(|r| r.is_finished()).count(), READERS - 1);

    queue.write(b"release").unwrap();

    let mut delivered = 0;
    let mut empty = 0;
    for reader in readers {
        match reader.join().unwrap() {
            Ok(bytes) => {
                assert_eq!(bytes, b"release");
                delivered += 1;
            }
            Err(QueueError::Empty) => empty += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(delivered, 1);
    assert_eq!(empty, READERS - 1);
}

#[test]
fn concurrent_writers_and_readers_deliver_each_chunk_once() {
    init_logging();
    const WRITERS: u32 = 4;
    const PER_WRITER: u32 = 2_000;
    let queue = Arc::new(queue(8, 64));
    prime(&queue);

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_WRITER {
                    let id = w * PER_WRITER + i;
                    loop {
                        match queue.write(&id.to_le_bytes()) {
                            Ok(_) => break,
                            Err(QueueError::Full { .. }) => thread::yield_now(),
                            Err(other) => panic!("unexpected error: {other}"),
                        }
                    }
                }
            })
        })
        .collect();

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen = Vec::new();
                loop {
                    match read_vec(&queue, 8) {
                        Ok(bytes) => {
                            let mut raw = [0u8; 4];
                            raw.copy_from_slice(&bytes);
                            seen.push(u32::from_le_bytes(raw));
                        }
                        Err(QueueError::Empty) => {
                            if done.load(Ordering::Acquire) && queue.is_empty() {
                                break;
                            }
                            thread::yield_now();
                        }
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
                seen
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Release);

    let mut all = HashSet::new();
    let mut total = 0usize;
    for reader in readers {
        for id in reader.join().unwrap() {
            assert!(all.insert(id), "chunk {id} delivered twice");
            total += 1;
        }
    }
    assert_eq!(total, (WRITERS * PER_WRITER) as usize);
    assert_eq!(queue.pool_stats().outstanding(), 0);
}

#[test]
fn pool_population_stabilizes_under_load() {
    init_logging();
    const CAP: usize = 32;
    let queue = queue(256, CAP);
    prime(&queue);
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED);
    let mut payload = vec![0u8; 256];

    let mut run_round = |rng: &mut rand::rngs::StdRng| {
        let burst = rng.gen_range(1..=CAP);
        for _ in 0..burst {
            let len = rng.gen_range(0..=payload.len());
            rng.fill(&mut payload[..len]);
            queue.write(&payload[..len]).unwrap();
        }
        for _ in 0..burst {
            read_vec(&queue, 256).unwrap();
        }
    };

    for _ in 0..50 {
        run_round(&mut rng);
    }
    let warm = queue.pool_stats().allocated;
    assert!(warm <= CAP + 1, "allocated {warm} buffers for {CAP} slots");

    for _ in 0..500 {
        run_round(&mut rng);
    }
    let stats = queue.pool_stats();
    assert!(stats.allocated <= CAP + 1);
    assert_eq!(stats.outstanding(), 0);
    assert_eq!(stats.idle, stats.allocated);
}

#[test]
fn dropped_buffers_are_replaced_by_fresh_allocations() {
    init_logging();
    let queue = queue(8, 2);
    prime(&queue);
    for _ in 0..10 {
        queue.write(b"x").unwrap();
        queue.write(b"y").unwrap();
        assert!(queue.write(b"z").unwrap_err().is_full());
        read_vec(&queue, 8).unwrap();
        read_vec(&queue, 8).unwrap();
    }
    let stats = queue.pool_stats();
    assert_eq!(stats.discarded, 10);
    assert_eq!(stats.outstanding(), 0);
    assert!(stats.allocated >= 10, "each dropped buffer forces a new allocation");
}

#[test]
fn recycle_policy_keeps_allocations_flat() {
    init_logging();
    let config = QueueConfig::default()
        .with_buffer_size(8)
        .with_queue_capacity(2)
        .with_full_policy(FullPolicy::Recycle);
    let queue = ByteQueue::from_config(config).unwrap();
    prime(&queue);
    for _ in 0..10 {
        queue.write(b"x").unwrap();
        queue.write(b"y").unwrap();
        assert!(queue.write(b"z").unwrap_err().is_full());
        read_vec(&queue, 8).unwrap();
        read_vec(&queue, 8).unwrap();
    }
    let stats = queue.pool_stats();
    assert_eq!(stats.discarded, 0);
    assert_eq!(stats.allocated, 3);
}

#[test]
fn stats_track_operations() {
    init_logging();
    let queue = queue(8, 1);
    queue.write(b"a").unwrap();
    queue.write(b"b").unwrap_err();
    read_vec(&queue, 8).unwrap();
    read_vec(&queue, 8).unwrap_err();

    let stats = queue.stats();
    assert_eq!(stats.writes, 1);
    assert_eq!(stats.full_rejections, 1);
    assert_eq!(stats.reads, 1);
    assert_eq!(stats.empty_reads, 1);
    assert_eq!(stats.depth, 0);
    assert_eq!(stats.capacity, 1);

    assert_eq!(queue.shrink_pool(), 1);
    assert_eq!(queue.stats().pool.idle, 0);
}

#[test]
fn shared_stream_through_arc() {
    init_logging();
    let stream: Arc<dyn ByteStream> = Arc::new(queue(16, 4));
    let writer = {
        let stream = Arc::clone(&stream);
        thread::spawn(move || stream.write(b"via arc"))
    };
    assert_eq!(writer.join().unwrap().unwrap(), 7);

    let mut dest = [0u8; 16];
    let n = stream.read(&mut dest).unwrap();
    assert_eq!(&dest[..n], b"via arc");
}

proptest! {
    #[test]
    fn round_trip_within_buffer_size(payload in vec(any::<u8>(), 0..=64)) {
        let queue = queue(64, 4);
        prop_assert_eq!(queue.write(&payload).unwrap(), payload.len());
        let mut dest = vec![0u8; 64];
        let n = queue.read(&mut dest).unwrap();
        prop_assert_eq!(n, payload.len());
        prop_assert_eq!(&dest[..n], &payload[..]);
    }

    #[test]
    fn oversized_writes_keep_prefix(payload in vec(any::<u8>(), 17..=80)) {
        let queue = queue(16, 4);
        prop_assert_eq!(queue.write(&payload).unwrap(), 16);
        let mut dest = vec![0u8; 80];
        let n = queue.read(&mut dest).unwrap();
        prop_assert_eq!(&dest[..n], &payload[..16]);
    }

    #[test]
    fn fifo_for_any_sequence(payloads in vec(vec(any::<u8>(), 0..=32), 1..=16)) {
        let queue = queue(32, 16);
        for payload in &payloads {
            queue.write(payload).unwrap();
        }
        for payload in &payloads {
            let got = read_vec(&queue, 32).unwrap();
            prop_assert_eq!(&got, payload);
        }
    }
}
