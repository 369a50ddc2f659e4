/// In-memory datagram link between a server connection and one client.
/// Loss and delay are decided per packet from a seeded rng, so every run of a
/// test sees the same packet fates.
use std::collections::VecDeque;

use wraith_shared::PacketIndex;

#[derive(Clone, Debug, PartialEq)]
pub struct Datagram {
    /// Set for server packets, whose fate is reported back to the server
    pub packet_index: Option<PacketIndex>,
    pub bytes: Vec<u8>,
}

impl Datagram {
    pub fn new(packet_index: Option<PacketIndex>, bytes: Vec<u8>) -> Self {
        Self {
            packet_index,
            bytes,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    Delivered(Datagram),
    Lost(Datagram),
}

struct InFlight {
    ready_at: u64,
    lost: bool,
    datagram: Datagram,
}

pub struct LossyLink {
    rng: fastrand::Rng,
    loss_rate: f32,
    delay_steps: u64,
    forced_losses: usize,
    clock: u64,
    in_flight: VecDeque<InFlight>,
    sent: u64,
    lost: u64,
}

impl LossyLink {
    pub fn new(seed: u64, loss_rate: f32) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            loss_rate: loss_rate.clamp(0.0, 1.0),
            delay_steps: 0,
            forced_losses: 0,
            clock: 0,
            in_flight: VecDeque::new(),
            sent: 0,
            lost: 0,
        }
    }

    pub fn reliable() -> Self {
        Self::new(0, 0.0)
    }

    /// Packets arrive this many extra `deliver` calls after being sent
    pub fn with_delay(mut self, steps: u64) -> Self {
        self.delay_steps = steps;
        self
    }

    pub fn set_loss_rate(&mut self, loss_rate: f32) {
        self.loss_rate = loss_rate.clamp(0.0, 1.0);
    }

    /// Loses the next `count` packets regardless of the loss rate
    pub fn drop_next(&mut self, count: usize) {
        self.forced_losses += count;
    }

    pub fn send(&mut self, datagram: Datagram) {
        let lost = if self.forced_losses > 0 {
            self.forced_losses -= 1;
            true
        } else {
            self.loss_rate > 0.0 && self.rng.f32() < self.loss_rate
        };
        self.sent += 1;
        if lost {
            self.lost += 1;
        }
        self.in_flight.push_back(InFlight {
            ready_at: self.clock + 1 + self.delay_steps,
            lost,
            datagram,
        });
    }

    /// Advances the link by one step and returns the fate of every packet due
    /// by now, in send order
    pub fn deliver(&mut self) -> Vec<Delivery> {
        self.clock += 1;
        let mut due = Vec::new();
        while let Some(next) = self.in_flight.front() {
            if next.ready_at > self.clock {
                break;
            }
            let Some(next) = self.in_flight.pop_front() else {
                break;
            };
            due.push(if next.lost {
                Delivery::Lost(next.datagram)
            } else {
                Delivery::Delivered(next.datagram)
            });
        }
        due
    }

    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    pub fn lost_count(&self) -> u64 {
        self.lost
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_losses_come_first() {
        let mut link = LossyLink::reliable();
        link.drop_next(1);
        link.send(Datagram::new(Some(0), vec![1]));
        link.send(Datagram::new(Some(1), vec![2]));
        let fates = link.deliver();
        assert!(matches!(fates[0], Delivery::Lost(_)));
        assert!(matches!(fates[1], Delivery::Delivered(_)));
        assert_eq!(link.lost_count(), 1);
    }

    #[test]
    fn delay_holds_packets_back() {
        let mut link = LossyLink::reliable().with_delay(2);
        link.send(Datagram::new(None, vec![7]));
        assert!(link.deliver().is_empty());
        assert!(link.deliver().is_empty());
        assert_eq!(link.deliver().len(), 1);
    }

    #[test]
    fn same_seed_same_fates() {
        let fates = |seed| {
            let mut link = LossyLink::new(seed, 0.5);
            for index in 0..32 {
                link.send(Datagram::new(Some(index), Vec::new()));
            }
            link.deliver()
                .into_iter()
                .map(|delivery| matches!(delivery, Delivery::Lost(_)))
                .collect::<Vec<_>>()
        };
        assert_eq!(fates(7), fates(7));
    }
}
