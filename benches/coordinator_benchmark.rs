use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use duet::signaling::{Coordinator, PeerId, RoomName};

fn registered(n: u32) -> (Coordinator<()>, Vec<PeerId>) {
    let mut coordinator = Coordinator::new();
    let ids: Vec<PeerId> = (0..n)
        .map(|i| PeerId::from(format!("peer_{:08x}", i).as_str()))
        .collect();
    for id in &ids {
        coordinator.register(*id, ());
    }
    (coordinator, ids)
}

/// join, activate and tear down one room
fn bench_room_cycle(c: &mut Criterion) {
    let (mut coordinator, ids) = registered(2);
    let room = RoomName::from("bench-room");

    let mut group = c.benchmark_group("RoomCycle");
    group.throughput(Throughput::Elements(1));

    group.bench_function("join_join_leave_leave", |b| {
        b.iter(|| {
            coordinator.join_room(ids[0], room.clone(), Value::Null);
            let effects = coordinator.join_room(ids[1], room.clone(), Value::Null);
            black_box(&effects);
            coordinator.leave_room(ids[0], &room);
            black_box(coordinator.leave_room(ids[1], &room));
        })
    });

    group.finish();
}

/// relay a candidate between two registered peers
fn bench_relay(c: &mut Criterion) {
    let (coordinator, ids) = registered(2);
    let candidate = json!({
        "candidate": "candidate:1 1 udp 2122260223 192.168.1.100 54321 typ host",
        "sdpMid": "0",
        "sdpMLineIndex": 0
    });

    let mut group = c.benchmark_group("Relay");
    group.throughput(Throughput::Elements(1));

    group.bench_function("ice_candidate", |b| {
        b.iter(|| black_box(coordinator.relay_candidate(ids[0], ids[1], candidate.clone())))
    });

    group.finish();
}

/// rejected joins against a full room
fn bench_room_full(c: &mut Criterion) {
    let (mut coordinator, ids) = registered(3);
    let room = RoomName::from("full-room");
    coordinator.join_room(ids[0], room.clone(), Value::Null);
    coordinator.join_room(ids[1], room.clone(), Value::Null);

    let mut group = c.benchmark_group("RoomFull");
    group.throughput(Throughput::Elements(1));

    group.bench_function("rejected_join", |b| {
        b.iter(|| black_box(coordinator.join_room(ids[2], room.clone(), Value::Null)))
    });

    group.finish();
}

criterion_group!(benches, bench_room_cycle, bench_relay, bench_room_full);
criterion_main!(benches);
