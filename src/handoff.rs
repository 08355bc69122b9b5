// SnapshotHandoff - single-writer/single-reader transfer of channel snapshots
//
// Hosts that acquire tracker data on a separate thread (sensor callback,
// network receiver) push snapshots into a lock-free SPSC ring. The frame loop
// drains the ring once per tick and keeps only the newest snapshot.
//
// Producer side never blocks: when the ring is full the snapshot is dropped
// and counted. Consumer side holds the last snapshot it saw, so every tick
// after the first arrival has something to classify.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::channel::{ChannelFrame, SnapshotSource};

/// Default ring capacity: a few frames of slack at typical tracker rates
pub const DEFAULT_HANDOFF_CAPACITY: usize = 8;

/// Constructor for a connected producer/consumer pair
pub struct SnapshotHandoff;

impl SnapshotHandoff {
    /// Create a producer/consumer pair over a ring of `capacity` snapshots
    ///
    /// # Arguments
    /// * `capacity` - Ring size; a capacity of 0 is raised to 1
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity: usize) -> (SnapshotProducer, SnapshotConsumer) {
        let (producer, consumer) = RingBuffer::new(capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));

        (
            SnapshotProducer {
                producer,
                dropped: Arc::clone(&dropped),
            },
            SnapshotConsumer {
                consumer,
                dropped,
                latest: None,
            },
        )
    }
}

/// Acquisition-thread end of the handoff
pub struct SnapshotProducer {
    producer: Producer<ChannelFrame>,
    dropped: Arc<AtomicU64>,
}

impl SnapshotProducer {
    /// Offer a snapshot to the frame loop
    ///
    /// # Returns
    /// `true` if queued, `false` if the ring was full and the snapshot dropped
    pub fn push(&mut self, snapshot: ChannelFrame) -> bool {
        match self.producer.push(snapshot) {
            Ok(()) => true,
            Err(PushError::Full(_)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if total.is_power_of_two() {
                    log::warn!(
                        "[SnapshotHandoff] Frame loop is behind, {} snapshots dropped",
                        total
                    );
                }
                false
            }
        }
    }

    /// Snapshots dropped because the ring was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// True once the consumer has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.producer.is_abandoned()
    }
}

/// Frame-loop end of the handoff
pub struct SnapshotConsumer {
    consumer: Consumer<ChannelFrame>,
    dropped: Arc<AtomicU64>,
    latest: Option<ChannelFrame>,
}

impl SnapshotConsumer {
    /// Drain everything queued and return the newest snapshot seen so far
    pub fn latest(&mut self) -> Option<ChannelFrame> {
        while let Ok(snapshot) = self.consumer.pop() {
            self.latest = Some(snapshot);
        }
        self.latest
    }

    /// Snapshots waiting in the ring
    pub fn pending(&self) -> usize {
        self.consumer.slots()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// True once the producer has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.consumer.is_abandoned()
    }
}

impl SnapshotSource for SnapshotConsumer {
    fn next_snapshot(&mut self) -> Option<ChannelFrame> {
        self.latest()
    }
}
