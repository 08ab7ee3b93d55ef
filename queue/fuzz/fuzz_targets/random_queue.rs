#![no_main]

use arbitrary::Arbitrary;
use commonware_codec::{Decode, Encode};
use libfuzzer_sys::fuzz_target;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use random_queue::{Queue, QueueView, RandomQueue, SequenceMut};
use std::collections::VecDeque;

const MAX_OPERATIONS: usize = 256;

#[derive(Arbitrary, Debug)]
enum Operation {
    Enqueue(u16),
    EnqueueAll(Vec<u16>),
    Dequeue,
    Set {
        index: u8,
        value: u16,
    },
    Insert {
        index: u8,
        value: u16,
    },
    Remove {
        index: u8,
    },
    RemoveRange {
        start: u8,
        end: u8,
    },
    Splice {
        start: u8,
        end: u8,
        values: Vec<u16>,
    },
    RemoveFirstN(u8),
    RemoveLastN(u8),
    RemoveAll {
        keep_capacity: bool,
    },
    Reserve(u8),
    Snapshot,
    View {
        start: u8,
        end: u8,
        value: u16,
    },
    Codec,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    seed: u64,
    operations: Vec<Operation>,
}

/// Mirrors the head randomization performed after every enqueue.
fn randomize_head(model: &mut VecDeque<u16>, rng: &mut StdRng) {
    let len = model.len();
    if len < 2 {
        return;
    }
    let index = rng.gen_range(0..len);
    if index != 0 {
        model.swap(0, index);
    }
}

fn bounds(start: u8, end: u8, len: usize) -> (usize, usize) {
    let a = start as usize % (len + 1);
    let b = end as usize % (len + 1);
    (a.min(b), a.max(b))
}

fn check(queue: &RandomQueue<u16>, model: &VecDeque<u16>) {
    assert_eq!(queue.len(), model.len());
    assert!(queue.iter().eq(model.iter()));
    assert_eq!(queue.peek(), model.front());
    if queue.is_empty() {
        assert_eq!(queue.residual_capacity(), queue.capacity());
    }
}

fn fuzz(input: FuzzInput) {
    let mut queue_rng = StdRng::seed_from_u64(input.seed);
    let mut model_rng = StdRng::seed_from_u64(input.seed);
    let mut queue = RandomQueue::new();
    let mut model = VecDeque::new();
    let mut snapshots = Vec::new();

    for operation in input.operations.into_iter().take(MAX_OPERATIONS) {
        match operation {
            Operation::Enqueue(value) => {
                queue.enqueue_with(value, &mut queue_rng);
                model.push_back(value);
                randomize_head(&mut model, &mut model_rng);
            }

            Operation::EnqueueAll(mut values) => {
                queue.enqueue_all_with(values.clone(), &mut queue_rng);
                if !values.is_empty() {
                    values.shuffle(&mut model_rng);
                    model.extend(values);
                    randomize_head(&mut model, &mut model_rng);
                }
            }

            Operation::Dequeue => {
                assert_eq!(queue.dequeue(), model.pop_front());
            }

            Operation::Set { index, value } => {
                if !model.is_empty() {
                    let index = index as usize % model.len();
                    queue.set(index, value);
                    model[index] = value;
                }
            }

            Operation::Insert { index, value } => {
                let index = index as usize % (model.len() + 1);
                queue.insert(index, value);
                model.insert(index, value);
            }

            Operation::Remove { index } => {
                if !model.is_empty() {
                    let index = index as usize % model.len();
                    assert_eq!(Some(queue.remove(index)), model.remove(index));
                }
            }

            Operation::RemoveRange { start, end } => {
                let (start, end) = bounds(start, end, model.len());
                queue.remove_range(start..end);
                model.drain(start..end);
            }

            Operation::Splice { start, end, values } => {
                let (start, end) = bounds(start, end, model.len());
                let removed = queue.splice(start..end, values.clone());
                let expected: Vec<u16> = model.drain(start..end).collect();
                assert_eq!(removed, expected);
                for (offset, value) in values.into_iter().enumerate() {
                    model.insert(start + offset, value);
                }
            }

            Operation::RemoveFirstN(k) => {
                let k = k as usize % (model.len() + 1);
                queue.remove_first_n(k);
                model.drain(..k);
            }

            Operation::RemoveLastN(k) => {
                let k = k as usize % (model.len() + 1);
                queue.remove_last_n(k);
                model.truncate(model.len() - k);
            }

            Operation::RemoveAll { keep_capacity } => {
                let capacity = queue.capacity();
                queue.remove_all(keep_capacity);
                model.clear();
                if keep_capacity {
                    assert!(queue.capacity() >= capacity);
                } else {
                    assert_eq!(queue.capacity(), 0);
                }
            }

            Operation::Reserve(additional) => {
                queue.reserve(additional as usize);
                assert!(queue.residual_capacity() >= additional as usize);
            }

            Operation::Snapshot => {
                snapshots.push((queue.clone(), model.clone()));
            }

            Operation::View { start, end, value } => {
                let (start, end) = bounds(start, end, model.len());
                let mut view = queue.slice(start..end);
                let expected: Vec<u16> = model.range(start..end).copied().collect();
                assert!(view.iter().eq(expected.iter()));

                view.push(value);
                if !view.is_empty() {
                    view.set(0, value);
                }
                assert_eq!(view.len(), end - start + 1);
                assert_eq!(view.bounds(), start..end + 1);
                assert_eq!(RandomQueue::from(view).len(), end - start + 1);
            }

            Operation::Codec => {
                let cfg = ((..).into(), ());
                let decoded: RandomQueue<u16> = Decode::decode_cfg(queue.encode(), &cfg).unwrap();
                assert_eq!(decoded, queue);
                let view: QueueView<u16> = Decode::decode_cfg(queue.encode(), &cfg).unwrap();
                assert_eq!(view.len(), queue.len());
            }
        }

        check(&queue, &model);
    }

    // Writes after a snapshot never leak into it
    for (snapshot, expected) in &snapshots {
        check(snapshot, expected);
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
