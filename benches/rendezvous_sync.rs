// benches/rendezvous_sync.rs

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use filament::Channel;
use std::thread;

const ITEMS: u64 = 1_000;

fn bench_rendezvous_handoff(c: &mut Criterion) {
  let mut group = c.benchmark_group("rendezvous_handoff");
  group.throughput(Throughput::Elements(ITEMS));
  group.bench_function("single_pair", |b| {
    b.iter(|| {
      let channel = Channel::new(0);
      let producer = {
        let channel = channel.clone();
        thread::spawn(move || {
          for i in 0..ITEMS {
            channel.send(i).unwrap();
          }
        })
      };
      for _ in 0..ITEMS {
        channel.recv().unwrap();
      }
      producer.join().unwrap();
    });
  });
  group.finish();
}

criterion_group!(benches, bench_rendezvous_handoff);
criterion_main!(benches);
