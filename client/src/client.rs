use std::collections::HashMap;

use glam::Vec2;
use log::{debug, info, warn};

use wraith_shared::{
    GhostIndex, MotionState, MovePacket, PacketHeader, Replica, ReplicationError, Tick,
    TriggerFlags,
};

use crate::{
    client_config::ClientConfig,
    error::ClientError,
    ghost_events::{GhostEvent, GhostEvents},
    interpolation::Interpolator,
    prediction::{Correction, PredictionEngine},
    world::ghost_reader::{GhostReader, ReceivedPacket},
};

/// Local input sampled once per client tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveInput {
    /// Desired direction, each component in `[-1, 1]`
    pub thrust: Vec2,
    pub triggers: TriggerFlags,
    /// Heading in radians
    pub facing: f32,
}

/// Client-side end of a replication connection: keeps a proxy for every
/// ghost the server sent, predicts the controlled ship and smooths the rest.
pub struct ReplicationClient {
    config: ClientConfig,
    reader: GhostReader,
    interpolators: HashMap<GhostIndex, Interpolator>,
    prediction: PredictionEngine,
    control: Option<GhostIndex>,
    server_tick: Option<Tick>,
    events: GhostEvents,
    poisoned: bool,
}

impl ReplicationClient {
    pub fn new(config: ClientConfig) -> Self {
        let prediction = PredictionEngine::new(config.prediction.clone(), config.dynamics.clone());
        Self {
            config,
            reader: GhostReader::new(),
            interpolators: HashMap::new(),
            prediction,
            control: None,
            server_tick: None,
            events: GhostEvents::new(),
            poisoned: false,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // Incoming

    /// Reads one packet from the server.
    ///
    /// A codec mismatch poisons the client: every later packet is refused with
    /// [`ReplicationError::ConnectionPoisoned`] until [`ReplicationClient::reset`]
    /// is called.
    pub fn receive_packet(&mut self, bytes: &[u8]) -> Result<(), ClientError> {
        if self.poisoned {
            return Err(ReplicationError::ConnectionPoisoned.into());
        }

        let received = match self
            .reader
            .read_packet(bytes, &self.config.protocol, &mut self.events)
        {
            Ok(Some(received)) => received,
            Ok(None) => return Ok(()),
            Err(error) => {
                if error.is_fatal() {
                    warn!("{}, client needs a reset", error);
                    self.poisoned = true;
                }
                return Err(error.into());
            }
        };

        self.apply(received);
        Ok(())
    }

    fn apply(&mut self, received: ReceivedPacket) {
        let ReceivedPacket {
            header,
            updates,
            destroyed,
            ..
        } = received;
        self.server_tick = Some(header.tick);

        for ghost in destroyed {
            self.interpolators.remove(&ghost);
            if self.control == Some(ghost) {
                self.lose_control();
            }
        }

        for update in updates {
            let Some(replica) = self.reader.ghost(&update.ghost) else {
                continue;
            };
            if update.created {
                self.interpolators.remove(&update.ghost);
            }
            let mut moved = replica.motion_groups();
            if moved.is_clear() {
                continue;
            }
            moved.and(&update.groups);
            if !update.created && moved.is_clear() {
                continue;
            }
            let (Some(motion), epoch) = (replica.motion(), replica.teleport_epoch()) else {
                continue;
            };

            if Some(update.ghost) == self.control && self.prediction.is_active() {
                if let Some(correction) =
                    self.prediction
                        .reconcile(motion, epoch, header.last_processed_move)
                {
                    self.push_correction(update.ghost, correction);
                }
                continue;
            }

            match self.interpolators.get_mut(&update.ghost) {
                Some(interpolator) => {
                    interpolator.on_update(motion, epoch, &self.config.interpolation);
                }
                None => {
                    self.interpolators
                        .insert(update.ghost, Interpolator::new(motion, epoch));
                }
            }
        }

        self.update_control(&header);
    }

    fn update_control(&mut self, header: &PacketHeader) {
        if header.control == self.control {
            return;
        }
        match header.control {
            Some(ghost) => {
                let Some(replica) = self.reader.ghost(&ghost) else {
                    debug!("control of {} announced before its spawn record", ghost);
                    return;
                };
                let Some(motion) = replica.motion() else {
                    warn!("{} is a {} and cannot be predicted", ghost, replica.kind().name());
                    return;
                };
                info!("now controlling {}", ghost);
                self.prediction.begin(motion, replica.teleport_epoch());
                self.interpolators.remove(&ghost);
                self.control = Some(ghost);
            }
            None => self.lose_control(),
        }
    }

    fn lose_control(&mut self) {
        if let Some(ghost) = self.control.take() {
            info!("no longer controlling {}", ghost);
            self.prediction.end();
            if let Some(motion) = self.reader.ghost(&ghost).and_then(Replica::motion) {
                let epoch = self.reader.ghost(&ghost).map_or(0, Replica::teleport_epoch);
                self.interpolators
                    .insert(ghost, Interpolator::new(motion, epoch));
            }
        }
    }

    fn push_correction(&mut self, ghost: GhostIndex, correction: Correction) {
        if correction.distance > 0.0 || correction.warped {
            self.events.push(GhostEvent::Corrected {
                ghost,
                distance: correction.distance,
                warped: correction.warped,
            });
        }
    }

    // Outgoing

    /// Predicts one tick of local input and returns the move packet to send,
    /// carrying every unconfirmed move up to the protocol's per-packet limit.
    pub fn tick(&mut self, input: &MoveInput) -> Result<Vec<u8>, ClientError> {
        let duration_ms = self
            .config
            .protocol
            .tick_interval
            .as_millis()
            .min(u128::from(u16::MAX)) as u16;
        if self
            .prediction
            .predict(input.thrust, input.triggers, input.facing, duration_ms)
            .is_none()
        {
            return Err(ClientError::NoControlledEntity);
        }
        let moves = self
            .prediction
            .outgoing_moves(usize::from(self.config.protocol.max_moves_per_packet));
        Ok(MovePacket::new(moves).to_bytes())
    }

    // Rendering

    /// Advances rendering by one frame
    pub fn advance_frame(&mut self, seconds: f32) {
        self.prediction.advance_frame(seconds);
        for interpolator in self.interpolators.values_mut() {
            interpolator.advance(seconds, &self.config.interpolation);
        }
    }

    /// State to draw for `ghost` this frame
    pub fn rendered_state(&self, ghost: &GhostIndex) -> Option<MotionState> {
        if Some(*ghost) == self.control {
            return self.control_rendered_state();
        }
        self.interpolators
            .get(ghost)
            .map(|interpolator| *interpolator.rendered())
    }

    /// State to draw for the locally controlled ship this frame
    pub fn control_rendered_state(&self) -> Option<MotionState> {
        self.prediction
            .control_state()
            .map(|state| state.rendered)
    }

    pub fn ghost(&self, ghost: &GhostIndex) -> Option<&Replica> {
        self.reader.ghost(ghost)
    }

    pub fn ghosts(&self) -> impl Iterator<Item = (&GhostIndex, &Replica)> {
        self.reader.ghosts()
    }

    pub fn ghost_count(&self) -> usize {
        self.reader.len()
    }

    pub fn control(&self) -> Option<GhostIndex> {
        self.control
    }

    pub fn prediction(&self) -> &PredictionEngine {
        &self.prediction
    }

    pub fn server_tick(&self) -> Option<Tick> {
        self.server_tick
    }

    pub fn events(&mut self) -> &mut GhostEvents {
        &mut self.events
    }

    pub fn take_events(&mut self) -> Vec<GhostEvent> {
        self.events.drain()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Forgets every ghost and starts over, as after a reconnect
    pub fn reset(&mut self) {
        info!("client reset");
        self.reader.clear();
        self.interpolators.clear();
        self.prediction.end();
        self.control = None;
        self.server_tick = None;
        self.events.clear();
        self.poisoned = false;
    }
}
